use super::fft_size::FFTSize;

/// Fill buffer that collects samples until a full analysis block is available.
///
/// The write index cycles through `[0, len)`. Writing the last sample of a block wraps it back to
/// zero and raises the block-ready flag, at which point `buf` holds exactly one complete block in
/// time order. The flag stays up until the block is taken.
pub struct SampleAccumulator {
    buf: Box<[f32]>,
    write_idx: usize,
    block_ready: bool,
}

impl SampleAccumulator {
    pub fn new(size: FFTSize) -> Self {
        Self {
            buf: vec![0f32; size.len()].into_boxed_slice(),
            write_idx: 0,
            block_ready: false,
        }
    }

    /// Appends one sample. Returns `true` when this sample completed a block.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.buf[self.write_idx] = sample;
        self.write_idx += 1;
        if self.write_idx == self.buf.len() {
            self.write_idx = 0;
            self.block_ready = true;
            return true;
        }

        false
    }

    /// Hands out the completed block once. Returns `None` if no block has completed since the
    /// last call.
    pub fn take_ready_block(&mut self) -> Option<&[f32]> {
        if !self.block_ready {
            return None;
        }
        self.block_ready = false;
        Some(&self.buf)
    }

    pub fn is_block_ready(&self) -> bool {
        self.block_ready
    }

    pub fn write_index(&self) -> usize {
        self.write_idx
    }

    pub fn block_size(&self) -> usize {
        self.buf.len()
    }

    /// Starts a fresh block. Samples already in the buffer are overwritten as new ones arrive.
    pub fn reset(&mut self) {
        self.write_idx = 0;
        self.block_ready = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn ready_exactly_on_last_sample_of_block() {
        let mut fifo = SampleAccumulator::new(FFTSize::_256);
        for i in 0..255 {
            assert!(!fifo.push(i as f32));
            assert_eq!(fifo.write_index(), i + 1);
        }
        assert!(!fifo.is_block_ready());

        assert!(fifo.push(255.0));
        assert_eq!(fifo.write_index(), 0);
        assert!(fifo.is_block_ready());
    }

    #[test]
    fn ready_block_is_in_time_order() {
        let mut fifo = SampleAccumulator::new(FFTSize::_256);
        for i in 0..256 {
            fifo.push(i as f32);
        }

        let block = fifo.take_ready_block().unwrap();
        assert_eq!(block.len(), 256);
        assert_eq!(block[0], 0.0);
        assert_eq!(block[255], 255.0);
    }

    #[test]
    fn block_is_taken_once() {
        let mut fifo = SampleAccumulator::new(FFTSize::_256);
        assert!(fifo.take_ready_block().is_none());
        for _ in 0..256 {
            fifo.push(1.0);
        }
        assert!(fifo.take_ready_block().is_some());
        assert!(fifo.take_ready_block().is_none());
        assert!(!fifo.is_block_ready());
    }

    #[test]
    fn fires_once_per_block_for_any_split() {
        let mut rng = StdRng::seed_from_u64(0xBA7);
        let size = FFTSize::_512;

        for _ in 0..20 {
            let mut fifo = SampleAccumulator::new(size);
            let total = rng.gen_range(0..(size.len() * 9));
            let mut pushed = 0usize;
            let mut fired = 0usize;

            while pushed < total {
                // host block lengths vary from call to call
                let chunk = rng.gen_range(1..=1500).min(total - pushed);
                for _ in 0..chunk {
                    pushed += 1;
                    if fifo.push(0.5) {
                        fired += 1;
                        assert_eq!(pushed % size.len(), 0);
                    }
                }
            }

            assert_eq!(fired, total / size.len());
            assert_eq!(fifo.write_index(), total % size.len());
        }
    }

    #[test]
    fn reset_rewinds_index_and_drops_ready_flag() {
        let mut fifo = SampleAccumulator::new(FFTSize::_256);
        for _ in 0..256 + 10 {
            fifo.push(1.0);
        }
        assert!(fifo.is_block_ready());
        assert_eq!(fifo.write_index(), 10);

        fifo.reset();
        assert_eq!(fifo.write_index(), 0);
        assert!(!fifo.is_block_ready());
    }
}

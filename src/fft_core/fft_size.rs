/// Analysis block sizes. Only powers of two can be expressed, so every size handed to the
/// accumulator and the FFT plan is valid by construction.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum FFTSize {
    _256 = 256,
    _512 = 512,
    _1024 = 1024,
    _2048 = 2048,
    #[default]
    _4096 = 4096,
    _8192 = 8192,
}

impl FFTSize {
    #[inline]
    pub fn len(&self) -> usize {
        *self as usize
    }

    /// Number of bins kept after a magnitude-only forward transform. The Nyquist bin is dropped.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.len() / 2
    }

    pub fn order(&self) -> u32 {
        self.len().trailing_zeros()
    }
}

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, TryLockError,
};

use nih_plug::prelude::AtomicF32;
use triple_buffer::TripleBuffer;

use crate::{errors::FeedError, fft_core::fft_size::FFTSize, utils};

/// One completed block's worth of analysis. Published and read as a unit, so a spectrum is never
/// seen next to the average of another block.
#[derive(Debug, Clone)]
pub struct AnalysisFrame {
    pub spectrum: Vec<f32>,
    pub avg_amplitude: f32,
    /// Number of blocks published so far, 0 before the first one.
    pub block_index: u64,
}

impl AnalysisFrame {
    pub fn new(num_bins: usize) -> Self {
        Self {
            spectrum: vec![0.0f32; num_bins],
            avg_amplitude: 0.0,
            block_index: 0,
        }
    }
}

/// Scalars that change independently of the frame. Each one is its own atomic.
pub struct TransportFlags {
    sample_rate: AtomicF32,
    playing: AtomicBool,
    input_connected: AtomicBool,
}

impl TransportFlags {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate: AtomicF32::new(sample_rate),
            playing: AtomicBool::new(false),
            input_connected: AtomicBool::new(false),
        }
    }
}

/// Creates the two halves of the snapshot slot.
pub fn snapshot_channel(fft_size: FFTSize, sample_rate: f32) -> (SnapshotPublisher, SnapshotReader) {
    let (input, output) = TripleBuffer::new(&AnalysisFrame::new(fft_size.num_bins())).split();
    let flags = Arc::new(TransportFlags::new(sample_rate));

    (
        SnapshotPublisher {
            input,
            flags: flags.clone(),
            block_index: 0,
        },
        SnapshotReader {
            output: Arc::new(Mutex::new(output)),
            flags,
            fft_size,
        },
    )
}

/// Audio-thread half. Never blocks and never allocates.
pub struct SnapshotPublisher {
    input: triple_buffer::Input<AnalysisFrame>,
    flags: Arc<TransportFlags>,
    block_index: u64,
}

impl SnapshotPublisher {
    /// Copies a finished block's spectrum and average into the back buffer and swaps it in.
    pub fn publish(&mut self, spectrum: &[f32], avg_amplitude: f32) {
        self.block_index += 1;

        let frame = self.input.input_buffer();
        let len = frame.spectrum.len().min(spectrum.len());
        frame.spectrum[..len].copy_from_slice(&spectrum[..len]);
        frame.spectrum[len..].fill(0.0);
        frame.avg_amplitude = avg_amplitude;
        frame.block_index = self.block_index;

        self.input.publish();
    }

    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.flags.sample_rate.store(sample_rate, Ordering::Relaxed);
    }

    pub fn set_transport(&self, playing: bool, input_connected: bool) {
        self.flags.playing.store(playing, Ordering::Relaxed);
        self.flags
            .input_connected
            .store(input_connected, Ordering::Relaxed);
    }
}

/// Consumer half. Cloning shares the same slot, and the mutex is only ever taken by consumers, so
/// the audio thread never waits on it.
#[derive(Clone)]
pub struct SnapshotReader {
    output: Arc<Mutex<triple_buffer::Output<AnalysisFrame>>>,
    flags: Arc<TransportFlags>,
    fft_size: FFTSize,
}

impl SnapshotReader {
    /// Runs `f` against the latest complete snapshot. Fails fast instead of blocking when another
    /// consumer holds the slot.
    pub fn read<R>(&self, f: impl FnOnce(AnalysisSnapshot<'_>) -> R) -> Result<R, FeedError> {
        let mut output = self.lock_output()?;
        let frame = output.read();

        Ok(f(AnalysisSnapshot {
            frame,
            fft_size: self.fft_size,
            sample_rate: self.flags.sample_rate.load(Ordering::Relaxed),
            playing: self.flags.playing.load(Ordering::Relaxed),
            input_connected: self.flags.input_connected.load(Ordering::Relaxed),
        }))
    }

    /// Whether a frame was published since the last `read`.
    #[cfg(test)]
    pub(crate) fn has_update(&self) -> Result<bool, FeedError> {
        let output = self.lock_output()?;
        Ok(output.updated())
    }

    fn lock_output(&self) -> Result<MutexGuard<'_, triple_buffer::Output<AnalysisFrame>>, FeedError> {
        match self.output.try_lock() {
            Ok(output) => Ok(output),
            // a panicking consumer cannot leave the output half-read, the frame is still whole
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(FeedError::LockFailed),
        }
    }
}

/// Read-only view of the latest published state.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisSnapshot<'a> {
    frame: &'a AnalysisFrame,
    fft_size: FFTSize,
    sample_rate: f32,
    playing: bool,
    input_connected: bool,
}

impl<'a> AnalysisSnapshot<'a> {
    pub fn spectrum(&self) -> &'a [f32] {
        &self.frame.spectrum
    }

    pub fn avg_amplitude(&self) -> f32 {
        self.frame.avg_amplitude
    }

    pub fn block_index(&self) -> u64 {
        self.frame.block_index
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_input_connected(&self) -> bool {
        self.input_connected
    }

    /// Center frequency of `bin` at the current sample rate.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        utils::bin_to_freq(bin, self.fft_size.len(), self.sample_rate)
    }
}

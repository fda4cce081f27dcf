use std::sync::Arc;

use realfft::{
    num_complex::Complex,
    num_traits::Zero,
    RealFftPlanner, RealToComplex,
};

use super::{fft_size::FFTSize, fifo::SampleAccumulator};
use crate::utils;

/// Result of one analysis pass, borrowed from the analyzer's buffers.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisResult<'a> {
    pub spectrum: &'a [f32],
    pub avg_amplitude: f32,
}

/// Windowed, magnitude-only forward FFT over completed fill-buffer blocks.
///
/// Every buffer is allocated here, in `new`. `analyze` only touches preallocated memory and is
/// safe to call from the audio thread.
pub struct SpectralAnalyzer {
    fft_size: FFTSize,
    r2c: Arc<dyn RealToComplex<f32>>,

    // symmetric hann table scaled to a mean of 1, never written after construction
    window: Box<[f32]>,

    fft_in: Vec<f32>,
    fft_out: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,

    spectrum: Vec<f32>,
    avg_amplitude: f32,
}

impl SpectralAnalyzer {
    pub fn new(fft_size: FFTSize) -> Self {
        let hann = apodize::hanning_iter(fft_size.len()).collect::<Vec<f64>>();
        let gain = fft_size.len() as f64 / hann.iter().sum::<f64>();
        let window = hann
            .iter()
            .map(|x| (x * gain) as f32)
            .collect::<Vec<f32>>()
            .into_boxed_slice();

        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(fft_size.len());
        let fft_in = r2c.make_input_vec();
        let fft_out = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            window,
            fft_in,
            fft_out,
            scratch,
            spectrum: vec![0f32; fft_size.num_bins()],
            avg_amplitude: 0.0,
        }
    }

    /// Analyzes the block the accumulator has ready. Without a ready block this is a no-op and
    /// returns `None`; whatever was published last stays valid.
    pub fn analyze(&mut self, fifo: &mut SampleAccumulator) -> Option<AnalysisResult<'_>> {
        let block = fifo.take_ready_block()?;
        if block.len() != self.fft_in.len() {
            return None;
        }

        // window a copy so the fill buffer keeps the raw samples
        self.fft_in.copy_from_slice(block);
        utils::multiply_vectors_in_place(&mut self.fft_in, &self.window);

        self.fft_out.fill(Complex::zero());
        if self
            .r2c
            .process_with_scratch(&mut self.fft_in, &mut self.fft_out, &mut self.scratch)
            .is_err()
        {
            return None;
        }

        for (mag, bin) in self.spectrum.iter_mut().zip(self.fft_out.iter()) {
            *mag = bin.norm();
        }
        self.avg_amplitude = utils::mean(&self.spectrum);

        Some(self.last_result())
    }

    /// The most recent analysis, or an all-zero spectrum before the first block completes.
    pub fn last_result(&self) -> AnalysisResult<'_> {
        AnalysisResult {
            spectrum: &self.spectrum,
            avg_amplitude: self.avg_amplitude,
        }
    }

    pub fn fft_size(&self) -> FFTSize {
        self.fft_size
    }
}

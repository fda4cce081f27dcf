use crate::{
    analysis_data::SnapshotPublisher,
    transport::{HostTransport, TransportMonitor, TransportState},
};

use super::{fft_size::FFTSize, fifo::SampleAccumulator, spectral_analyzer::SpectralAnalyzer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The host handed us something inconsistent; nothing was touched this cycle.
    Skipped,
    Processed {
        blocks_published: usize,
        state: TransportState,
    },
}

/// Audio-thread side of the analyzer: accumulates channel 0, analyzes every completed block and
/// publishes it, and mirrors the transport once per cycle.
pub struct AnalysisProcessor {
    fifo: SampleAccumulator,
    analyzer: SpectralAnalyzer,
    transport: TransportMonitor,
    publisher: SnapshotPublisher,
}

impl AnalysisProcessor {
    pub fn new(fft_size: FFTSize, publisher: SnapshotPublisher) -> Self {
        Self {
            fifo: SampleAccumulator::new(fft_size),
            analyzer: SpectralAnalyzer::new(fft_size),
            transport: TransportMonitor::new(),
            publisher,
        }
    }

    pub fn process_cycle<C: AsRef<[f32]>>(
        &mut self,
        channels: &[C],
        input_channels: usize,
        transport: Option<&impl HostTransport>,
    ) -> CycleOutcome {
        if input_channels > channels.len() {
            return CycleOutcome::Skipped;
        }
        if let Some((first, rest)) = channels.split_first() {
            let len = first.as_ref().len();
            if rest.iter().any(|c| c.as_ref().len() != len) {
                return CycleOutcome::Skipped;
            }
        }

        let state = self.transport.refresh(transport, input_channels, &self.publisher);

        let mut blocks_published = 0;
        // analysis is single-channel, only the first input is accumulated
        if input_channels > 0 {
            for sample in channels[0].as_ref() {
                if self.fifo.push(*sample) && self.analyze_and_publish() {
                    blocks_published += 1;
                }
            }
        }

        CycleOutcome::Processed {
            blocks_published,
            state,
        }
    }

    /// Analyzes and publishes the ready block, if any. Returns whether anything was published.
    pub fn analyze_and_publish(&mut self) -> bool {
        match self.analyzer.analyze(&mut self.fifo) {
            Some(result) => {
                self.publisher.publish(result.spectrum, result.avg_amplitude);
                true
            }
            None => false,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.publisher.set_sample_rate(sample_rate);
    }

    pub fn reset(&mut self) {
        self.fifo.reset();
    }

    pub fn fft_size(&self) -> FFTSize {
        self.analyzer.fft_size()
    }

    pub fn fifo(&self) -> &SampleAccumulator {
        &self.fifo
    }
}

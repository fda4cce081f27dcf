use analysis_data::{snapshot_channel, SnapshotReader};
use fft_core::{analysis_processor::AnalysisProcessor, fft_size::FFTSize};
use nih_plug::prelude::*;
use std::sync::Arc;

pub mod analysis_data;
pub mod errors;
pub mod feed;
pub mod fft_core;
pub mod transport;
mod utils;

pub const DEFAULT_FFT_SIZE: FFTSize = FFTSize::_4096;
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

pub struct BaryonAnalyzer {
    processor: AnalysisProcessor,
    params: Arc<PluginParams>,
    snapshot_reader: SnapshotReader,
    // from the active layout, 0 when the host gave us no main input
    input_channels: usize,
}

/// The analyzer exposes nothing to automate and keeps no state.
#[derive(Params, Default)]
pub struct PluginParams {}

impl Default for BaryonAnalyzer {
    fn default() -> Self {
        let (publisher, snapshot_reader) = snapshot_channel(DEFAULT_FFT_SIZE, DEFAULT_SAMPLE_RATE);

        Self {
            processor: AnalysisProcessor::new(DEFAULT_FFT_SIZE, publisher),
            params: Arc::new(PluginParams::default()),
            snapshot_reader,
            input_channels: 0,
        }
    }
}

impl BaryonAnalyzer {
    /// Consumer half of the analysis snapshot, for an editor or a `feed::SnapshotFeed`.
    pub fn snapshot_reader(&self) -> SnapshotReader {
        self.snapshot_reader.clone()
    }
}

impl Plugin for BaryonAnalyzer {
    const NAME: &'static str = "Baryon Analyzer";
    const VENDOR: &'static str = "";
    const URL: &'static str = env!("CARGO_PKG_HOMEPAGE");
    const EMAIL: &'static str = "";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The first audio IO layout is used as the default. The output-only layout is what hosts pick
    // when nothing is routed into the plugin.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: None,
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const MIDI_OUTPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.input_channels = audio_io_layout
            .main_input_channels
            .map(NonZeroU32::get)
            .unwrap_or(0) as usize;
        self.processor.set_sample_rate(buffer_config.sample_rate);

        nih_log!(
            "analyzer initialized: {} input channel(s), {} Hz, {}-point fft",
            self.input_channels,
            buffer_config.sample_rate,
            self.processor.fft_size().len()
        );
        true
    }

    fn reset(&mut self) {
        // Called from the audio thread, must not allocate.
        self.processor.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let channels = buffer.as_slice();

        // input passes through untouched, outputs without a matching input are silenced
        for channel in channels.iter_mut().skip(self.input_channels) {
            channel.fill(0.0);
        }

        self.processor
            .process_cycle(&*channels, self.input_channels, Some(context.transport()));

        ProcessStatus::Normal
    }
}

impl ClapPlugin for BaryonAnalyzer {
    const CLAP_ID: &'static str = "baryon_analyzer";
    const CLAP_DESCRIPTION: Option<&'static str> = Some("spectrum analyzer feeding the baryon display");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;

    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Analyzer,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for BaryonAnalyzer {
    const VST3_CLASS_ID: [u8; 16] = *b"baryon_analyzer_";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Analyzer];
}

nih_export_clap!(BaryonAnalyzer);
nih_export_vst3!(BaryonAnalyzer);

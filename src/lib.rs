use atomic_float::AtomicF32;
use nih_plug::prelude::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub mod bypass;
pub mod coefficients;
mod editor;
pub mod mixer;
pub mod mode;
pub mod params;
pub mod processor;
pub mod svf;

pub use mode::FilterMode;
pub use params::FilterParams;
pub use processor::{FilterProcessor, ParameterSet, ProcessorConfig};

/// The time it takes for the peak meter to decay by 12 dB after switching to complete silence.
const PEAK_METER_DECAY_MS: f64 = 150.0;

/// Multi-mode state variable filter with a dry/wet mix.
pub struct SvfFilter {
    params: Arc<FilterParams>,
    processor: FilterProcessor,

    /// Needed to normalize the peak meter's response based on the sample rate.
    peak_meter_decay_weight: f32,
    /// Output level shown in the editor, stored as voltage gain.
    peak_meter: Arc<AtomicF32>,
}

impl Default for SvfFilter {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl SvfFilter {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            params: Arc::new(FilterParams::default()),
            processor: FilterProcessor::new(config),

            peak_meter_decay_weight: 1.0,
            peak_meter: Arc::new(AtomicF32::new(util::MINUS_INFINITY_DB)),
        }
    }

    fn update_peak_meter(&self, peak_amplitude: f32) {
        let current_peak_meter = self.peak_meter.load(Ordering::Relaxed);
        let new_peak_meter = if peak_amplitude > current_peak_meter {
            peak_amplitude
        } else {
            current_peak_meter * self.peak_meter_decay_weight
                + peak_amplitude * (1.0 - self.peak_meter_decay_weight)
        };

        self.peak_meter.store(new_peak_meter, Ordering::Relaxed);
    }
}

impl Plugin for SvfFilter {
    const NAME: &'static str = "SVF Filter";
    const VENDOR: &'static str = "Kakeru3";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

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
    ];

    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        editor::create(
            self.params.clone(),
            self.peak_meter.clone(),
            self.params.editor_state.clone(),
        )
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let Some(num_channels) = audio_io_layout.main_output_channels.map(NonZeroU32::get) else {
            nih_log!("Refusing to initialize without a main output");
            return false;
        };

        self.processor.prepare(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            num_channels as usize,
        );

        // After `PEAK_METER_DECAY_MS` milliseconds of pure silence, the peak meter's value should
        // have dropped by 12 dB
        self.peak_meter_decay_weight = 0.25f64
            .powf((buffer_config.sample_rate as f64 * PEAK_METER_DECAY_MS / 1000.0).recip())
            as f32;

        true
    }

    fn reset(&mut self) {
        self.processor.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let snapshot = self.params.snapshot();
        self.processor.process_block(buffer.as_slice(), &snapshot);

        if self.params.editor_state.is_open() {
            let peak_amplitude = buffer
                .as_slice_immutable()
                .iter()
                .flat_map(|channel| channel.iter())
                .fold(0.0f32, |peak, sample| peak.max(sample.abs()));
            self.update_peak_meter(peak_amplitude);
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for SvfFilter {
    const CLAP_ID: &'static str = "com.kakeru3.svf-filter";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Multi-mode state variable filter with dry/wet mix");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Filter,
    ];
}

impl Vst3Plugin for SvfFilter {
    const VST3_CLASS_ID: [u8; 16] = *b"SvfFilterKakeru3";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Filter];
}

nih_export_clap!(SvfFilter);
nih_export_vst3!(SvfFilter);

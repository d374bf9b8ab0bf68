use nih_plug::prelude::{nih_debug_assert, nih_debug_assert_eq, nih_log};
use std::ops::Range;

use crate::bypass::BypassGate;
use crate::coefficients::FilterCoefficients;
use crate::mixer::DryWetMixer;
use crate::mode::FilterMode;
use crate::svf::FilterState;

pub const CUTOFF_MIN_HZ: f32 = 20.0;
pub const CUTOFF_MAX_HZ: f32 = 20_000.0;
pub const RESONANCE_MIN: f32 = 0.707_107;
pub const RESONANCE_MAX: f32 = 100.0;

pub const DEFAULT_CUTOFF_HZ: f32 = 632.455;
pub const DEFAULT_RESONANCE: f32 = 1.0;
pub const DEFAULT_MIX: f32 = 1.0;

/// The parameter values a block is processed with, read once at the top of the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub cutoff_hz: f32,
    pub resonance_q: f32,
    pub mode: FilterMode,
    /// `0.0` is fully dry, `1.0` fully wet.
    pub mix: f32,
    pub bypass: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            resonance_q: DEFAULT_RESONANCE,
            mode: FilterMode::default(),
            mix: DEFAULT_MIX,
            bypass: false,
        }
    }
}

impl ParameterSet {
    /// Clamps every value into its declared range. Non-finite values fall back to the defaults.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, fallback: f32, min: f32, max: f32| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };

        Self {
            cutoff_hz: clamp(self.cutoff_hz, defaults.cutoff_hz, CUTOFF_MIN_HZ, CUTOFF_MAX_HZ),
            resonance_q: clamp(self.resonance_q, defaults.resonance_q, RESONANCE_MIN, RESONANCE_MAX),
            mix: clamp(self.mix, defaults.mix, 0.0, 1.0),
            ..self
        }
    }
}

/// How the processor handles parameter jumps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorConfig {
    /// Crossfade time when toggling bypass. `0.0` switches at the block boundary.
    pub bypass_fade_ms: f32,
    /// Ramp mix ratio changes across the block instead of stepping.
    pub smooth_mix: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            bypass_fade_ms: 5.0,
            smooth_mix: true,
        }
    }
}

impl ProcessorConfig {
    /// Switches bypass and mix at block boundaries without any smoothing.
    pub fn instantaneous() -> Self {
        Self {
            bypass_fade_ms: 0.0,
            smooth_mix: false,
        }
    }
}

/// The filter effect for a fixed set of channels. Channels are processed identically and
/// independently, each with its own [`FilterState`].
#[derive(Debug, Clone)]
pub struct FilterProcessor {
    config: ProcessorConfig,
    sample_rate: f32,
    max_block_size: usize,

    states: Vec<FilterState>,
    mixer: DryWetMixer,
    bypass: BypassGate,
}

impl FilterProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            sample_rate: 44_100.0,
            max_block_size: 0,

            states: Vec::new(),
            mixer: DryWetMixer::new(config.smooth_mix),
            bypass: BypassGate::new(),
        }
    }

    /// (Re)allocates all per-channel state. Must be called before processing and whenever the
    /// sample rate, block size or channel count changes.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        nih_log!(
            "Preparing filter for {} channel(s) at {} Hz, up to {} samples per block",
            num_channels,
            sample_rate,
            max_block_size
        );
        nih_debug_assert!(sample_rate > 0.0);

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.states = vec![FilterState::new(); num_channels];
        self.mixer.prepare(num_channels, max_block_size);
        self.bypass.prepare(sample_rate, self.config.bypass_fade_ms);
    }

    /// Clears the filter memory without reallocating.
    pub fn reset(&mut self) {
        self.states.iter_mut().for_each(FilterState::reset);
        self.mixer.reset();
        self.bypass.reset();
    }

    pub fn num_channels(&self) -> usize {
        self.states.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Filters `channels` in place. Blocks longer than the prepared size are processed in
    /// prepared-size segments.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], params: &ParameterSet) {
        let num_samples = channels.iter().map(|channel| channel.len()).min().unwrap_or(0);
        if num_samples == 0 || self.max_block_size == 0 {
            return;
        }
        nih_debug_assert_eq!(channels.len(), self.states.len());

        let params = params.clamped();
        let coefficients =
            FilterCoefficients::solve(params.cutoff_hz, params.resonance_q, self.sample_rate);
        self.mixer.set_mix(params.mix);
        self.bypass.set_bypass(params.bypass);

        let mut start = 0;
        while start < num_samples {
            let end = (start + self.max_block_size).min(num_samples);
            self.process_segment(channels, start..end, &coefficients, params.mode);
            start = end;
        }

        nih_debug_assert!(self.states.iter().all(FilterState::is_finite));
    }

    fn process_segment(
        &mut self,
        channels: &mut [&mut [f32]],
        range: Range<usize>,
        coefficients: &FilterCoefficients,
        mode: FilterMode,
    ) {
        let len = range.len();

        if !self.bypass.is_bypassed() {
            for (channel_idx, (channel, state)) in
                channels.iter_mut().zip(self.states.iter_mut()).enumerate()
            {
                let block = &mut channel[range.clone()];
                self.mixer.push_dry(channel_idx, block);

                for sample in block.iter_mut() {
                    let responses = state.process_sample(*sample, coefficients);
                    *sample = mode.select(&responses, coefficients.damping);
                }

                self.mixer.mix_wet(channel_idx, block);
                self.bypass.apply(self.mixer.dry(channel_idx, len), block);
            }
        }

        self.mixer.finish_block();
        self.bypass.advance(len);
    }
}

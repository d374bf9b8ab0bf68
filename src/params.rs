use nih_plug::prelude::*;
use nih_plug_iced::IcedState;
use std::sync::Arc;

use crate::editor;
use crate::mode::FilterMode;
use crate::processor::{
    ParameterSet, CUTOFF_MAX_HZ, CUTOFF_MIN_HZ, DEFAULT_CUTOFF_HZ, DEFAULT_MIX, DEFAULT_RESONANCE,
    RESONANCE_MAX, RESONANCE_MIN,
};

#[derive(Params)]
pub struct FilterParams {
    /// The editor state, saved together with the parameter state so the custom scaling can be
    /// restored.
    #[persist = "editor-state"]
    pub editor_state: Arc<IcedState>,

    #[id = "cutoff"]
    pub cutoff: FloatParam,

    #[id = "resonance"]
    pub resonance: FloatParam,

    #[id = "type"]
    pub mode: EnumParam<FilterMode>,

    #[id = "mix"]
    pub mix: FloatParam,

    #[id = "bypass"]
    pub bypass: BoolParam,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            editor_state: editor::default_state(),

            // The skew puts the default at the centre of the knob
            cutoff: FloatParam::new(
                "Cutoff",
                DEFAULT_CUTOFF_HZ,
                FloatRange::Skewed {
                    min: CUTOFF_MIN_HZ,
                    max: CUTOFF_MAX_HZ,
                    factor: 0.198_894,
                },
            )
            .with_unit(" Hz")
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            resonance: FloatParam::new(
                "Resonance",
                DEFAULT_RESONANCE,
                FloatRange::Skewed {
                    min: RESONANCE_MIN,
                    max: RESONANCE_MAX,
                    factor: 0.271_119,
                },
            )
            .with_value_to_string(formatters::v2s_f32_rounded(2)),

            mode: EnumParam::new("Type", FilterMode::default()),

            mix: FloatParam::new(
                "Mix",
                DEFAULT_MIX,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 1.0,
                    factor: 0.5,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            bypass: BoolParam::new("Bypass", false).make_bypass(),
        }
    }
}

impl FilterParams {
    /// Reads every parameter once. Each read is a single atomic load, so this never blocks the
    /// thread that writes the parameters.
    pub fn snapshot(&self) -> ParameterSet {
        ParameterSet {
            cutoff_hz: self.cutoff.value(),
            resonance_q: self.resonance.value(),
            mode: self.mode.value(),
            mix: self.mix.value(),
            bypass: self.bypass.value(),
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_snapshot_to_stored_defaults() {
        let params = FilterParams::default();
        assert_eq!(params.snapshot(), ParameterSet::default());
    }

    #[test]
    fn ids_are_stable() {
        let params = FilterParams::default();
        let ids: Vec<String> = params.param_map().into_iter().map(|(id, _, _)| id).collect();

        for id in ["cutoff", "resonance", "type", "mix", "bypass"] {
            assert!(ids.iter().any(|known| known == id), "missing {id} in {ids:?}");
        }
    }

    #[test]
    fn ranges_cover_the_declared_bounds() {
        let params = FilterParams::default();

        assert_eq!(params.cutoff.preview_plain(0.0), CUTOFF_MIN_HZ);
        assert_eq!(params.cutoff.preview_plain(1.0), CUTOFF_MAX_HZ);
        assert!((params.resonance.preview_plain(1.0) - RESONANCE_MAX).abs() < 1e-3);
        assert_eq!(params.mix.preview_plain(0.0), 0.0);
    }
}

use nih_plug::prelude::Enum;
use std::f32::consts::FRAC_1_SQRT_2;

use crate::svf::Responses;

/// Filter responses, in the order the `type` parameter has always stored them.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    #[id = "lp2"]
    #[name = "Lowpass 12dB"]
    Lp2,
    #[id = "lp1"]
    #[name = "Lowpass 6dB"]
    Lp1,
    #[id = "lp2n"]
    #[name = "Lowpass 12dB (n)"]
    Lp2n,
    #[id = "hp2"]
    #[name = "Highpass 12dB"]
    Hp2,
    #[id = "hp1"]
    #[name = "Highpass 6dB"]
    Hp1,
    #[id = "hp2n"]
    #[name = "Highpass 12dB (n)"]
    Hp2n,
    #[id = "bp2"]
    #[name = "Bandpass 12dB"]
    Bp2,
    #[id = "bp2n"]
    #[name = "Bandpass 12dB (n)"]
    Bp2n,
    #[id = "ap2"]
    #[name = "Allpass"]
    Ap2,
    #[id = "p2"]
    #[name = "Peak"]
    P2,
    #[id = "n2"]
    #[name = "Notch"]
    N2,
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::Lp2
    }
}

impl FilterMode {
    pub const ALL: [FilterMode; 11] = [
        Self::Lp2,
        Self::Lp1,
        Self::Lp2n,
        Self::Hp2,
        Self::Hp1,
        Self::Hp2n,
        Self::Bp2,
        Self::Bp2n,
        Self::Ap2,
        Self::P2,
        Self::N2,
    ];

    /// Maps a stored choice index to a mode. Unknown indices fall back to the two-pole low-pass.
    pub fn from_raw(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Combines the base responses into this mode's output. Holds no state of its own.
    #[inline]
    pub fn select(self, responses: &Responses, damping: f32) -> f32 {
        let Responses {
            lowpass,
            highpass,
            bandpass,
            lowpass_1p,
            highpass_1p,
        } = *responses;

        match self {
            Self::Lp2 => lowpass,
            Self::Lp1 => lowpass_1p,
            Self::Lp2n => lowpass * peak_normalization(damping),
            Self::Hp2 => highpass,
            Self::Hp1 => highpass_1p,
            Self::Hp2n => highpass * peak_normalization(damping),
            Self::Bp2 => bandpass,
            Self::Bp2n => bandpass * 2.0 * damping,
            Self::Ap2 => lowpass + highpass - 2.0 * damping * bandpass,
            Self::P2 => lowpass - highpass,
            Self::N2 => lowpass + highpass,
        }
    }
}

/// Reciprocal of the resonant peak gain of a two-pole low-pass or high-pass. Damping at or above
/// `1 / sqrt(2)` has no peak above unity.
#[inline]
fn peak_normalization(damping: f32) -> f32 {
    if damping < FRAC_1_SQRT_2 {
        2.0 * damping * (1.0 - damping * damping).sqrt()
    } else {
        1.0
    }
}

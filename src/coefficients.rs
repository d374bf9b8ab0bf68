use nih_plug::prelude::nih_debug_assert;
use std::f64::consts::PI;

/// Lowest resonance the solver accepts. Anything lower approaches infinite damping.
pub const MIN_RESONANCE: f32 = 0.1;
/// Cutoff is kept below this fraction of the sample rate so `tan()` stays finite.
const MAX_CUTOFF_RATIO: f64 = 0.49;
const MIN_CUTOFF_HZ: f64 = 1.0;
/// Last resort ceiling for the pre-warped cutoff.
const MAX_G: f64 = 1.0e4;

/// Per-block integration coefficients for the state variable filter.
///
/// These are a pure function of cutoff, resonance and sample rate. They are recomputed at the
/// start of every block and never updated incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    /// Pre-warped cutoff, `tan(pi * fc / fs)`.
    pub g: f32,
    /// `1 / (2 * Q)`. Higher resonance means less damping.
    pub damping: f32,
    /// Zero-delay feedback normalization, `1 / (1 + 2 * damping * g + g^2)`.
    pub h: f32,
    /// Integrator gain of the one-pole path, `g / (1 + g)`.
    pub one_pole_g: f32,
}

impl FilterCoefficients {
    pub fn solve(cutoff_hz: f32, resonance_q: f32, sample_rate: f32) -> Self {
        nih_debug_assert!(sample_rate > 0.0, "sample rate must be positive");

        let sample_rate = f64::from(sample_rate).max(1.0);
        let nyquist_limit = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
        let cutoff_hz = sanitize(f64::from(cutoff_hz), MIN_CUTOFF_HZ).clamp(MIN_CUTOFF_HZ, nyquist_limit);
        let resonance_q = sanitize(f64::from(resonance_q), f64::from(MIN_RESONANCE))
            .max(f64::from(MIN_RESONANCE));

        // The trig and the divisions happen in double precision, the filter itself runs in f32
        let g = (PI * cutoff_hz / sample_rate).tan().clamp(0.0, MAX_G);
        let damping = 0.5 / resonance_q;
        let h = (1.0 + 2.0 * damping * g + g * g).recip();
        let one_pole_g = g / (1.0 + g);

        let coefficients = Self {
            g: g as f32,
            damping: damping as f32,
            h: h as f32,
            one_pole_g: one_pole_g as f32,
        };
        nih_debug_assert!(coefficients.is_finite());

        coefficients
    }

    /// `1 / Q`, the feedback gain of the band-pass output.
    #[inline]
    pub fn k(&self) -> f32 {
        2.0 * self.damping
    }

    pub fn is_finite(&self) -> bool {
        self.g.is_finite() && self.damping.is_finite() && self.h.is_finite() && self.one_pole_g.is_finite()
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_closed_form() {
        let coefficients = FilterCoefficients::solve(1000.0, 0.707, 48_000.0);
        let g = (std::f32::consts::PI * 1000.0 / 48_000.0).tan();
        let damping = 1.0 / (2.0 * 0.707);

        assert!((coefficients.g - g).abs() < 1e-6);
        assert!((coefficients.damping - damping).abs() < 1e-6);
        assert!((coefficients.h - 1.0 / (1.0 + 2.0 * damping * g + g * g)).abs() < 1e-6);
        assert!((coefficients.one_pole_g - g / (1.0 + g)).abs() < 1e-6);
    }

    #[test]
    fn is_deterministic() {
        let a = FilterCoefficients::solve(632.455, 1.0, 44_100.0);
        let b = FilterCoefficients::solve(632.455, 1.0, 44_100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn cutoff_above_nyquist_stays_finite() {
        for sample_rate in [8_000.0, 22_050.0, 44_100.0, 48_000.0] {
            let coefficients = FilterCoefficients::solve(20_000.0, 100.0, sample_rate);
            assert!(coefficients.is_finite(), "{coefficients:?} at {sample_rate} Hz");
            assert!(coefficients.h > 0.0);
        }
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        let coefficients = FilterCoefficients::solve(f32::NAN, 0.0, 48_000.0);
        assert!(coefficients.is_finite());
        assert!((coefficients.damping - 0.5 / MIN_RESONANCE).abs() < 1e-4);

        let coefficients = FilterCoefficients::solve(f32::INFINITY, -3.0, 48_000.0);
        assert!(coefficients.is_finite());
    }

    #[test]
    fn k_is_inverse_q() {
        let coefficients = FilterCoefficients::solve(440.0, 4.0, 48_000.0);
        assert!((coefficients.k() - 0.25).abs() < 1e-6);
    }
}

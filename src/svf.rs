use crate::coefficients::FilterCoefficients;

/// The base responses produced from one shared state per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Responses {
    pub lowpass: f32,
    pub highpass: f32,
    pub bandpass: f32,
    /// Output of the parallel one-pole path.
    pub lowpass_1p: f32,
    /// `x - lowpass_1p`.
    pub highpass_1p: f32,
}

/// Per-channel filter memory. Persists across blocks, only zeroed through [`FilterState::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    integrator1: f32,
    integrator2: f32,
    one_pole: f32,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_finite(&self) -> bool {
        self.integrator1.is_finite() && self.integrator2.is_finite() && self.one_pole.is_finite()
    }

    /// Runs one sample through both the two-pole and the one-pole paths.
    #[inline]
    pub fn process_sample(&mut self, x: f32, coefficients: &FilterCoefficients) -> Responses {
        let (lowpass, highpass, bandpass) = self.process_two_pole(x, coefficients);
        let lowpass_1p = self.process_one_pole(x, coefficients);

        Responses {
            lowpass,
            highpass,
            bandpass,
            lowpass_1p,
            highpass_1p: x - lowpass_1p,
        }
    }

    /// Trapezoidal two-integrator loop with the feedback solved algebraically, so there is no
    /// extra unit delay in the loop. Returns `(lowpass, highpass, bandpass)`.
    #[inline]
    fn process_two_pole(&mut self, x: f32, coefficients: &FilterCoefficients) -> (f32, f32, f32) {
        let FilterCoefficients { g, h, .. } = *coefficients;
        let s1 = self.integrator1;
        let s2 = self.integrator2;

        let highpass = h * (x - (coefficients.k() + g) * s1 - s2);
        let v1 = highpass * g;
        let bandpass = v1 + s1;
        let v2 = bandpass * g;
        let lowpass = v2 + s2;

        self.integrator1 = s1 + 2.0 * v1;
        self.integrator2 = s2 + 2.0 * v2;

        (lowpass, highpass, bandpass)
    }

    #[inline]
    fn process_one_pole(&mut self, x: f32, coefficients: &FilterCoefficients) -> f32 {
        let v = (x - self.one_pole) * coefficients.one_pole_g;
        let lowpass = v + self.one_pole;
        self.one_pole = lowpass + v;

        lowpass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, i: usize) -> f32 {
        let phase = (i as f64 * f64::from(freq) / f64::from(SAMPLE_RATE)).fract();
        (TAU * phase as f32).sin()
    }

    fn impulse_response(coefficients: &FilterCoefficients, len: usize) -> Vec<Responses> {
        let mut state = FilterState::new();
        (0..len)
            .map(|i| state.process_sample(if i == 0 { 1.0 } else { 0.0 }, coefficients))
            .collect()
    }

    fn settle(coefficients: &FilterCoefficients, input: f32, len: usize) -> Responses {
        let mut state = FilterState::new();
        let mut last = Responses::default();
        for _ in 0..len {
            last = state.process_sample(input, coefficients);
        }
        last
    }

    #[test]
    fn lowpass_matches_cookbook_biquad() {
        for (cutoff, q) in [(1000.0, 0.707), (250.0, 4.0), (8000.0, 1.0)] {
            let coefficients = FilterCoefficients::solve(cutoff, q, SAMPLE_RATE);
            let reference =
                Coefficients::<f32>::from_params(Type::LowPass, SAMPLE_RATE.hz(), cutoff.hz(), q)
                    .unwrap();
            let mut reference = DirectForm2Transposed::<f32>::new(reference);

            for (i, responses) in impulse_response(&coefficients, 512).iter().enumerate() {
                let expected = reference.run(if i == 0 { 1.0 } else { 0.0 });
                assert!(
                    (responses.lowpass - expected).abs() < 1e-4,
                    "sample {i}: {} vs {expected} ({cutoff} Hz, Q {q})",
                    responses.lowpass
                );
            }
        }
    }

    #[test]
    fn dc_settles() {
        for (cutoff, q) in [(20.0, 0.707), (1000.0, 10.0), (5000.0, 100.0)] {
            let coefficients = FilterCoefficients::solve(cutoff, q, SAMPLE_RATE);
            // Long enough for the slowest (20 Hz, 100 Q) corner to ring out
            let last = settle(&coefficients, 1.0, (SAMPLE_RATE * 20.0) as usize);

            assert!((last.lowpass - 1.0).abs() < 1e-3, "{cutoff} Hz lowpass: {}", last.lowpass);
            assert!(last.highpass.abs() < 1e-3, "{cutoff} Hz highpass: {}", last.highpass);
            assert!(last.bandpass.abs() < 1e-3, "{cutoff} Hz bandpass: {}", last.bandpass);
            assert!((last.lowpass_1p - 1.0).abs() < 1e-3);
            assert!(last.highpass_1p.abs() < 1e-3);
        }
    }

    #[test]
    fn butterworth_impulse_response_decays_without_ringing() {
        let coefficients = FilterCoefficients::solve(1000.0, 0.707, SAMPLE_RATE);
        let response: Vec<f32> =
            impulse_response(&coefficients, 4800).iter().map(|r| r.lowpass).collect();

        let peak = response.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
        assert!(peak > 0.0 && peak < 0.5);
        // A Butterworth low-pass undershoots by a few percent at most
        let undershoot = response.iter().fold(0.0f32, |acc, &x| acc.min(x));
        assert!(undershoot > -0.05 * peak);
        assert!(response[4000..].iter().all(|x| x.abs() < 1e-6));

        let sum: f32 = response.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "dc gain was {sum}");
    }

    #[test]
    fn one_pole_response_decays() {
        let coefficients = FilterCoefficients::solve(1000.0, 0.707, SAMPLE_RATE);
        let response: Vec<f32> =
            impulse_response(&coefficients, 256).iter().map(|r| r.lowpass_1p).collect();

        // The bilinear zero at Nyquist makes the second sample the largest one
        assert!(response[1] > response[0]);
        assert!(response[1..].windows(2).all(|w| w[1] <= w[0]));
        assert!(response.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn state_is_continuous_and_resettable() {
        let coefficients = FilterCoefficients::solve(2000.0, 3.0, SAMPLE_RATE);
        let mut state = FilterState::new();
        for i in 0..1000 {
            state.process_sample((TAU * i as f32 / 37.0).sin(), &coefficients);
        }
        assert_ne!(state, FilterState::new());

        state.reset();
        assert_eq!(state, FilterState::new());
    }

    #[test]
    fn bandpass_has_q_gain_at_cutoff() {
        let q = 5.0;
        let cutoff = 1000.0;
        let coefficients = FilterCoefficients::solve(cutoff, q, SAMPLE_RATE);
        let mut state = FilterState::new();

        let mut peak = 0.0f32;
        for i in 0..(SAMPLE_RATE as usize) {
            let x = sine(cutoff, i);
            let responses = state.process_sample(x, &coefficients);
            if i > SAMPLE_RATE as usize / 2 {
                peak = peak.max(responses.bandpass.abs());
            }
        }

        assert!((peak - q).abs() < 0.05, "bandpass peak was {peak}");
    }
}

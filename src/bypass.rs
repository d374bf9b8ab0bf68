//! Bypass switching with an optional crossfade.
//!
//! With a zero fade time the switch is instantaneous at the block boundary. Otherwise the output
//! fades between the processed and the dry signal to avoid clicks.

/// Routes either the processed or the dry signal to the output.
#[derive(Debug, Clone)]
pub struct BypassGate {
    /// `1.0` passes the processed signal, `0.0` the dry one.
    gain: f32,
    target: f32,
    /// Gain change per sample while fading.
    step: f32,
    /// The first request after a reset is applied immediately, there's nothing to fade from.
    primed: bool,
}

impl Default for BypassGate {
    fn default() -> Self {
        Self::new()
    }
}

impl BypassGate {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            target: 1.0,
            step: 1.0,
            primed: false,
        }
    }

    /// Sets the fade length. Anything shorter than a sample switches instantly.
    pub fn prepare(&mut self, sample_rate: f32, fade_ms: f32) {
        let length = sample_rate * fade_ms / 1000.0;
        self.step = if length > 1.0 { length.recip() } else { 1.0 };
        self.reset();
    }

    pub fn reset(&mut self) {
        self.primed = false;
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.target = if bypass { 0.0 } else { 1.0 };

        if !self.primed {
            self.gain = self.target;
            self.primed = true;
        }
    }

    /// Fully bypassed, so the processed path doesn't need to run at all.
    pub fn is_bypassed(&self) -> bool {
        self.target == 0.0 && self.gain == 0.0
    }

    pub fn is_fading(&self) -> bool {
        self.gain != self.target
    }

    /// Overwrites `processed` with the gated output. While fading, every call starts from the
    /// same gain so all channels of a block see the same curve.
    pub fn apply(&self, dry: &[f32], processed: &mut [f32]) {
        if !self.is_fading() {
            if self.target == 0.0 {
                let len = dry.len().min(processed.len());
                processed[..len].copy_from_slice(&dry[..len]);
            }
            return;
        }

        let mut gain = self.gain;
        for (out, &dry) in processed.iter_mut().zip(dry) {
            gain = self.next_gain(gain);
            *out = dry + (*out - dry) * gain;
        }
    }

    /// Moves the fade forward by a block of `num_samples`.
    pub fn advance(&mut self, num_samples: usize) {
        if !self.is_fading() {
            return;
        }

        let delta = self.step * num_samples as f32;
        self.gain = if self.target > self.gain {
            (self.gain + delta).min(self.target)
        } else {
            (self.gain - delta).max(self.target)
        };
    }

    #[inline]
    fn next_gain(&self, gain: f32) -> f32 {
        if self.target > gain {
            (gain + self.step).min(self.target)
        } else {
            (gain - self.step).max(self.target)
        }
    }
}

use nih_plug::prelude::nih_debug_assert;

/// Keeps an unprocessed copy of each channel and blends it back against the processed signal.
///
/// The snapshot buffers are allocated in [`prepare()`][Self::prepare()] so the audio thread never
/// allocates. When the mix ratio changes between blocks, the ratio is ramped linearly across the
/// next block instead of stepping at the boundary.
#[derive(Debug, Clone, Default)]
pub struct DryWetMixer {
    dry: Vec<Vec<f32>>,
    smooth: bool,

    /// Ratio reached at the end of the last block. `None` until the first block after a reset.
    current: Option<f32>,
    start: f32,
    target: f32,
}

impl DryWetMixer {
    pub fn new(smooth: bool) -> Self {
        Self {
            smooth,
            ..Self::default()
        }
    }

    pub fn prepare(&mut self, num_channels: usize, max_block_size: usize) {
        self.dry = vec![vec![0.0; max_block_size]; num_channels];
        self.reset();
    }

    pub fn reset(&mut self) {
        for channel in &mut self.dry {
            channel.fill(0.0);
        }
        self.current = None;
    }

    /// Number of samples per channel the snapshot can hold.
    pub fn capacity(&self) -> usize {
        self.dry.first().map_or(0, Vec::len)
    }

    /// Sets the ratio for the next block. `0.0` is fully dry, `1.0` fully wet.
    pub fn set_mix(&mut self, ratio: f32) {
        let ratio = ratio.clamp(0.0, 1.0);

        self.start = match self.current {
            Some(current) if self.smooth => current,
            _ => ratio,
        };
        self.target = ratio;
    }

    /// Copies `samples` into the snapshot for `channel`. This has to happen before the samples are
    /// processed in place.
    pub fn push_dry(&mut self, channel: usize, samples: &[f32]) {
        let Some(dry) = self.dry.get_mut(channel) else {
            return;
        };
        nih_debug_assert!(samples.len() <= dry.len());

        let len = samples.len().min(dry.len());
        dry[..len].copy_from_slice(&samples[..len]);
    }

    /// The snapshot taken for `channel`, truncated to `len` samples.
    pub fn dry(&self, channel: usize, len: usize) -> &[f32] {
        match self.dry.get(channel) {
            Some(dry) => &dry[..len.min(dry.len())],
            None => &[],
        }
    }

    /// Replaces `wet` with `dry * (1 - mix) + wet * mix`.
    pub fn mix_wet(&self, channel: usize, wet: &mut [f32]) {
        let dry = self.dry(channel, wet.len());
        let len = dry.len();
        let wet = &mut wet[..len];

        if self.start == self.target {
            let ratio = self.target;
            if ratio == 1.0 {
                return;
            }

            for (wet, &dry) in wet.iter_mut().zip(dry) {
                *wet = dry * (1.0 - ratio) + *wet * ratio;
            }
        } else {
            let step = (self.target - self.start) / len as f32;
            for (i, (wet, &dry)) in wet.iter_mut().zip(dry).enumerate() {
                let ratio = if i + 1 == len {
                    self.target
                } else {
                    self.start + step * (i + 1) as f32
                };
                *wet = dry * (1.0 - ratio) + *wet * ratio;
            }
        }
    }

    /// Called once all channels of a block have been mixed.
    pub fn finish_block(&mut self) {
        self.current = Some(self.target);
        self.start = self.target;
    }
}

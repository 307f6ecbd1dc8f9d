//! Per-channel state of the trigger

/// Number of segments in the tone sweep
pub const TONE_SEGMENTS: usize = 3;

/// Status counter wraps at this value
pub const TRIGGER_COUNT_MODULUS: u32 = 101;

/// One piece of the piecewise-linear tone sweep
///
/// Evaluated against the remaining sample count `n`:
/// amplitude is `amp_slope * n + amp_offset`, phase is
/// `(freq_slope * n + freq_offset) * n + phase_offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToneSegment {
    /// Remaining samples, counts down to zero
    pub length: f64,
    pub amp_slope: f64,
    pub amp_offset: f64,
    pub freq_slope: f64,
    pub freq_offset: f64,
    pub phase_offset: f64,
}

impl ToneSegment {
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.length <= 0.0
    }

    #[inline]
    pub fn amplitude(&self, n: f64) -> f64 {
        self.amp_slope * n + self.amp_offset
    }

    #[inline]
    pub fn phase(&self, n: f64) -> f64 {
        (self.freq_slope * n + self.freq_offset) * n + self.phase_offset
    }
}

/// Mutable state of one audio channel
///
/// Zeroed on every activation and touched once per sample while running.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelState {
    pub triggered: bool,
    /// Below-release time accumulated while triggered, in samples
    pub release_accum: f32,
    pub click_attack_remaining: f32,
    pub click_release_remaining: f32,
    /// Read position in the noise table
    pub click_frame: f32,
    /// Multiplier applied to the input before it reaches the output
    pub smoothed_gain: f32,
    pub block_accum: f32,
    pub block_count: f32,
    /// Most recent block-averaged amplitude
    pub level_estimate: f32,
    pub tone_segments: [ToneSegment; TONE_SEGMENTS],
    pub trigger_count: u32,
    /// Onsets since activation, not wrapped
    pub onsets: u64,
    pub last_trigger_ratio: f32,
    pub last_release_ratio: f32,
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the activation state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn click_active(&self) -> bool {
        self.click_attack_remaining > 0.0 || self.click_release_remaining > 0.0
    }

    pub fn tone_active(&self) -> bool {
        self.tone_segments.iter().any(|segment| !segment.is_exhausted())
    }

    pub fn status(&self) -> ChannelStatus {
        ChannelStatus {
            gain: self.smoothed_gain,
            trigger_ratio: self.last_trigger_ratio,
            release_ratio: self.last_release_ratio,
            trigger_count: self.trigger_count,
        }
    }
}

/// Monitoring values reported to the host after each block
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelStatus {
    /// Current smoothed input gain
    pub gain: f32,
    /// Last non-zero level estimate over the trigger threshold
    pub trigger_ratio: f32,
    /// Last non-zero level estimate over the release threshold
    pub release_ratio: f32,
    /// Onsets seen so far, modulo 101
    pub trigger_count: u32,
}

//! Control values of one channel and the settings derived from them per block

use crate::trigger::gate::{MIN_STEP, RELEASE_SCALE, TRIGGER_SCALE};

/// Number of control input ports per channel
pub const CONTROL_COUNT: usize = 19;

/// Guard for divisors that may legitimately be zero
pub const DIVISOR_EPSILON: f32 = 1e-9;

/// Samples per unit of `input_trigger_release` for a full standby/triggered swing
pub const RAMP_SAMPLES_PER_UNIT: f32 = 4096.0;

/// Samples per unit of `release_delay`
pub const RELEASE_DELAY_SAMPLES: f32 = 256.0;

/// Samples per unit of `click_delay`
pub const CLICK_ATTACK_SAMPLES: f32 = 64.0;

/// Samples per unit of `click_release`
pub const CLICK_RELEASE_SAMPLES: f32 = 512.0;

/// Fixed gain correction applied after mixing
pub const OUTPUT_TRIM: f32 = 0.25;

/// Per-channel control values, constant for the duration of one block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerParams {
    pub trigger_threshold: f32,     // Linear amplitude that opens the gate
    pub release_threshold: f32,     // Fraction of the scaled trigger threshold
    pub release_delay: f32,         // x256 samples below release before closing
    pub click_level: f32,           // Click burst level
    pub click_delay: f32,           // x64 samples of attack click
    pub click_release: f32,         // x512 samples of decaying release click
    pub triggered_level: f32,       // Input gain while triggered
    pub standby_level: f32,         // Input gain while in standby
    pub input_trigger_release: f32, // Gain ramp time, x4096 samples per full swing
    pub block_size: f32,            // Envelope averaging window in samples
    pub synth_amplitude: f32,       // Tone peak amplitude, 0 disables the tone
    pub synth_gain: f32,            // Tone body level as a fraction of the amplitude
    pub synth_freq_start: f32,      // Hz at onset
    pub synth_freq_body: f32,       // Hz at the end of the attack segment
    pub synth_freq_tail: f32,       // Hz for the rest of the tone
    pub synth_time_attack: f32,     // ms
    pub synth_time_body: f32,       // ms
    pub synth_time_tail: f32,       // ms
    pub output_gain: f32,           // Scales the 0.25 output trim
}

impl TriggerParams {
    pub fn default() -> Self {
        Self {
            trigger_threshold: 0.5,
            release_threshold: 1.0,
            release_delay: 1.0,
            click_level: 1.0,
            click_delay: 1.0,
            click_release: 1.0,
            triggered_level: 1.0,
            standby_level: 0.0,
            input_trigger_release: 1.0,
            block_size: 1.0,
            synth_amplitude: 0.0,
            synth_gain: 0.5,
            synth_freq_start: 180.0,
            synth_freq_body: 80.0,
            synth_freq_tail: 50.0,
            synth_time_attack: 5.0,
            synth_time_body: 60.0,
            synth_time_tail: 200.0,
            output_gain: 4.0,
        }
    }

    /// Short release and a wider averaging window for busy material
    pub fn tight() -> Self {
        Self {
            release_delay: 0.25,
            click_release: 0.5,
            input_trigger_release: 0.25,
            block_size: 32.0,
            ..Self::default()
        }
    }

    /// Tone body enabled with a long tail
    pub fn boomy() -> Self {
        Self {
            release_delay: 4.0,
            click_level: 0.5,
            synth_amplitude: 0.8,
            synth_gain: 0.6,
            synth_freq_start: 150.0,
            synth_freq_body: 60.0,
            synth_freq_tail: 42.0,
            synth_time_attack: 8.0,
            synth_time_body: 120.0,
            synth_time_tail: 400.0,
            block_size: 16.0,
            ..Self::default()
        }
    }

    /// Output equals input: gate levels match, no click, no tone
    pub fn passthrough() -> Self {
        Self {
            triggered_level: 1.0,
            standby_level: 1.0,
            click_level: 0.0,
            synth_amplitude: 0.0,
            output_gain: 1.0 / OUTPUT_TRIM,
            ..Self::default()
        }
    }

    /// Build from control port values in port order
    pub fn from_controls(controls: &[f32; CONTROL_COUNT]) -> Self {
        Self {
            trigger_threshold: controls[0],
            release_threshold: controls[1],
            release_delay: controls[2],
            click_level: controls[3],
            click_delay: controls[4],
            click_release: controls[5],
            triggered_level: controls[6],
            standby_level: controls[7],
            input_trigger_release: controls[8],
            block_size: controls[9],
            synth_amplitude: controls[10],
            synth_gain: controls[11],
            synth_freq_start: controls[12],
            synth_freq_body: controls[13],
            synth_freq_tail: controls[14],
            synth_time_attack: controls[15],
            synth_time_body: controls[16],
            synth_time_tail: controls[17],
            output_gain: controls[18],
        }
    }

    /// Control port values in port order
    pub fn to_controls(&self) -> [f32; CONTROL_COUNT] {
        [
            self.trigger_threshold,
            self.release_threshold,
            self.release_delay,
            self.click_level,
            self.click_delay,
            self.click_release,
            self.triggered_level,
            self.standby_level,
            self.input_trigger_release,
            self.block_size,
            self.synth_amplitude,
            self.synth_gain,
            self.synth_freq_start,
            self.synth_freq_body,
            self.synth_freq_tail,
            self.synth_time_attack,
            self.synth_time_body,
            self.synth_time_tail,
            self.output_gain,
        ]
    }

    /// Whether the tone synthesizer takes part
    pub fn tone_enabled(&self) -> bool {
        self.synth_amplitude > 0.0
    }
}

impl Default for TriggerParams {
    fn default() -> Self {
        TriggerParams::default()
    }
}

/// Values derived from [`TriggerParams`] once per block so the sample loop
/// only does arithmetic
#[derive(Clone, Copy, Debug)]
pub struct BlockSettings {
    pub block_size: f32,
    pub trigger_level: f32,
    pub release_level: f32,
    pub release_time: f32,
    pub standby_level: f32,
    pub triggered_level: f32,
    pub gain_step: f32,
    pub click_attack_len: f32,
    pub click_release_len: f32,
    pub click_attack_gain: f32,
    pub click_factor: f32,
    pub output_scale: f32,
}

impl BlockSettings {
    pub fn from_params(params: &TriggerParams) -> Self {
        let block_size = params.block_size.max(1.0).floor();
        let trigger_level = TRIGGER_SCALE * params.trigger_threshold;
        let release_level = params.release_threshold * trigger_level * RELEASE_SCALE;

        let ramp_len = (RAMP_SAMPLES_PER_UNIT * params.input_trigger_release).max(DIVISOR_EPSILON);
        let gain_step =
            ((params.standby_level - params.triggered_level).abs() / ramp_len).max(MIN_STEP);

        let click_divisor = (params.click_release * 1024.0).max(DIVISOR_EPSILON);

        Self {
            block_size,
            trigger_level,
            release_level,
            release_time: params.release_delay * RELEASE_DELAY_SAMPLES,
            standby_level: params.standby_level,
            triggered_level: params.triggered_level,
            gain_step,
            click_attack_len: (params.click_delay * CLICK_ATTACK_SAMPLES).max(0.0).floor(),
            click_release_len: (params.click_release * CLICK_RELEASE_SAMPLES).max(0.0).floor(),
            click_attack_gain: params.click_level * 0.4,
            click_factor: params.click_level / click_divisor,
            output_scale: OUTPUT_TRIM * params.output_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_round_trip_preserves_order() {
        let mut params = TriggerParams::boomy();
        params.trigger_threshold = 0.123;
        params.output_gain = 2.5;
        let controls = params.to_controls();
        assert_eq!(controls[0], 0.123);
        assert_eq!(controls[18], 2.5);
        assert_eq!(TriggerParams::from_controls(&controls), params);
    }

    #[test]
    fn test_block_size_floored_at_one() {
        let mut params = TriggerParams::default();
        params.block_size = 0.0;
        assert_eq!(BlockSettings::from_params(&params).block_size, 1.0);
        params.block_size = 16.7;
        assert_eq!(BlockSettings::from_params(&params).block_size, 16.0);
    }

    #[test]
    fn test_gain_step_floored_when_levels_match() {
        let params = TriggerParams::passthrough();
        let settings = BlockSettings::from_params(&params);
        assert_eq!(settings.gain_step, MIN_STEP);
    }

    #[test]
    fn test_gain_step_survives_zero_ramp_time() {
        let mut params = TriggerParams::default();
        params.input_trigger_release = 0.0;
        let settings = BlockSettings::from_params(&params);
        assert!(settings.gain_step.is_finite());
        assert!(settings.gain_step >= 1.0);
    }

    #[test]
    fn test_thresholds_use_tuning_constants() {
        let mut params = TriggerParams::default();
        params.trigger_threshold = 1.0;
        params.release_threshold = 0.5;
        let settings = BlockSettings::from_params(&params);
        assert!((settings.trigger_level - 0.9).abs() < 1e-6);
        assert!((settings.release_level - 0.5 * 0.9 * 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_passthrough_output_scale_is_unity() {
        let settings = BlockSettings::from_params(&TriggerParams::passthrough());
        assert!((settings.output_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_tone_enabled_only_for_positive_amplitude() {
        assert!(!TriggerParams::default().tone_enabled());
        assert!(TriggerParams::boomy().tone_enabled());
    }
}

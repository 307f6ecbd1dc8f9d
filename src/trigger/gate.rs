//! Envelope follower with a hysteresis gate
//!
//! The input amplitude is averaged over blocks of `block_size` samples. At each
//! block boundary the average is compared against the trigger threshold (while
//! in standby) or the lower release threshold (while triggered). Between the
//! two states the input gain ramps linearly from one level to the other.

use crate::trigger::channel::{ChannelState, TRIGGER_COUNT_MODULUS};
use crate::trigger::params::{BlockSettings, DIVISOR_EPSILON};

/// Scale from the trigger threshold parameter to the level that opens the gate
pub const TRIGGER_SCALE: f32 = 0.9;

/// Scale from the scaled trigger threshold to the level that closes it
pub const RELEASE_SCALE: f32 = 0.4;

/// Smallest gain ramp step; keeps the ramp moving when levels nearly match
pub const MIN_STEP: f32 = 1e-6;

/// What the gate did on this sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateEvent {
    None,
    /// Standby -> triggered
    Onset,
    /// Triggered -> standby
    Release,
}

/// Advance the gate by one input sample
#[inline]
pub fn tick(state: &mut ChannelState, sample: f32, settings: &BlockSettings) -> GateEvent {
    // A window left over from a larger block size starts again
    if state.block_count >= settings.block_size {
        state.block_accum = 0.0;
        state.block_count = 0.0;
    }

    state.block_accum += sample.abs();
    state.block_count += 1.0;

    let boundary = state.block_count >= settings.block_size;
    if boundary {
        state.level_estimate = state.block_accum / settings.block_size;
        state.block_accum = 0.0;
        state.block_count = 0.0;

        if state.level_estimate > 0.0 {
            state.last_trigger_ratio =
                state.level_estimate / settings.trigger_level.max(DIVISOR_EPSILON);
            state.last_release_ratio =
                state.level_estimate / settings.release_level.max(DIVISOR_EPSILON);
        }
    }

    smooth_gain(state, settings);

    if !boundary {
        return GateEvent::None;
    }

    if !state.triggered {
        if state.level_estimate >= settings.trigger_level {
            state.triggered = true;
            state.release_accum = 0.0;
            state.smoothed_gain = settings.triggered_level;
            state.trigger_count = (state.trigger_count + 1) % TRIGGER_COUNT_MODULUS;
            state.onsets += 1;
            return GateEvent::Onset;
        }
        return GateEvent::None;
    }

    if state.level_estimate < settings.release_level {
        state.release_accum += settings.block_size;
        if state.release_accum >= settings.release_time {
            state.triggered = false;
            state.release_accum = 0.0;
            return GateEvent::Release;
        }
    } else {
        state.release_accum = 0.0;
    }

    GateEvent::None
}

/// Move the gain one step toward the level of the current gate state
///
/// The gain is first pulled into the span between the two levels, so a fresh
/// channel or a level change from the host never leaves it outside.
#[inline]
fn smooth_gain(state: &mut ChannelState, settings: &BlockSettings) {
    let (lo, hi) = if settings.standby_level <= settings.triggered_level {
        (settings.standby_level, settings.triggered_level)
    } else {
        (settings.triggered_level, settings.standby_level)
    };
    state.smoothed_gain = state.smoothed_gain.max(lo).min(hi);

    let target = if state.triggered {
        settings.triggered_level
    } else {
        settings.standby_level
    };

    let diff = target - state.smoothed_gain;
    if diff.abs() <= settings.gain_step {
        state.smoothed_gain = target;
    } else {
        state.smoothed_gain += settings.gain_step.copysign(diff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::params::TriggerParams;

    fn settings_with(f: impl FnOnce(&mut TriggerParams)) -> BlockSettings {
        let mut params = TriggerParams::default();
        f(&mut params);
        BlockSettings::from_params(&params)
    }

    #[test]
    fn test_triggers_on_exact_sample() {
        let settings = settings_with(|_| {});
        let mut state = ChannelState::new();
        assert_eq!(tick(&mut state, 0.6, &settings), GateEvent::Onset);
        assert!(state.triggered);
        assert_eq!(state.smoothed_gain, 1.0);
        assert_eq!(state.trigger_count, 1);
    }

    #[test]
    fn test_below_threshold_stays_in_standby() {
        let settings = settings_with(|_| {});
        let mut state = ChannelState::new();
        for _ in 0..1000 {
            assert_eq!(tick(&mut state, 0.44, &settings), GateEvent::None);
        }
        assert!(!state.triggered);
    }

    #[test]
    fn test_block_average_decides_trigger() {
        let settings = settings_with(|p| p.block_size = 4.0);
        let mut state = ChannelState::new();
        // Average of 0.9, 0, 0, 0 is 0.225, below 0.45
        for &sample in &[0.9, 0.0, 0.0, 0.0] {
            assert_eq!(tick(&mut state, sample, &settings), GateEvent::None);
        }
        // Average 0.5 only known on the fourth sample
        let events: Vec<_> = [0.5, -0.5, 0.5, -0.5]
            .iter()
            .map(|&s| tick(&mut state, s, &settings))
            .collect();
        assert_eq!(
            events,
            vec![GateEvent::None, GateEvent::None, GateEvent::None, GateEvent::Onset]
        );
        assert_eq!(state.block_count, 0.0);
    }

    #[test]
    fn test_block_count_never_exceeds_block_size() {
        let settings = settings_with(|p| p.block_size = 5.0);
        let mut state = ChannelState::new();
        for i in 0..97 {
            tick(&mut state, (i as f32 * 0.1).sin(), &settings);
            assert!(state.block_count < settings.block_size);
        }
    }

    #[test]
    fn test_shrinking_block_discards_stale_window() {
        let wide = settings_with(|p| p.block_size = 48.0);
        let narrow = settings_with(|p| p.block_size = 8.0);
        let mut state = ChannelState::new();
        for _ in 0..40 {
            tick(&mut state, 0.1, &wide);
        }

        for _ in 0..64 {
            assert_eq!(tick(&mut state, 0.1, &narrow), GateEvent::None);
            assert!(state.block_count < narrow.block_size);
        }
        assert!(!state.triggered);
        assert!((state.level_estimate - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_release_waits_for_delay() {
        // release_delay 1 -> 256 samples of below-release time
        let settings = settings_with(|_| {});
        let mut state = ChannelState::new();
        tick(&mut state, 1.0, &settings);

        for i in 1..256 {
            assert_eq!(tick(&mut state, 0.0, &settings), GateEvent::None, "sample {}", i);
            assert!(state.triggered);
        }
        assert_eq!(tick(&mut state, 0.0, &settings), GateEvent::Release);
        assert!(!state.triggered);
        assert_eq!(state.release_accum, 0.0);
    }

    #[test]
    fn test_loud_block_resets_release_accumulator() {
        let settings = settings_with(|_| {});
        let mut state = ChannelState::new();
        tick(&mut state, 1.0, &settings);

        for _ in 0..200 {
            tick(&mut state, 0.0, &settings);
        }
        assert_eq!(state.release_accum, 200.0);

        // Release level is 0.18; 0.2 is above it
        tick(&mut state, 0.2, &settings);
        assert_eq!(state.release_accum, 0.0);

        for _ in 0..255 {
            tick(&mut state, 0.0, &settings);
        }
        assert!(state.triggered);
        assert_eq!(tick(&mut state, 0.0, &settings), GateEvent::Release);
    }

    #[test]
    fn test_release_accumulates_whole_blocks() {
        let settings = settings_with(|p| p.block_size = 64.0);
        let mut state = ChannelState::new();
        for _ in 0..64 {
            tick(&mut state, 1.0, &settings);
        }
        assert!(state.triggered);
        // Four quiet blocks reach 256 samples
        let mut released_at = None;
        for i in 0..(64 * 4) {
            if tick(&mut state, 0.0, &settings) == GateEvent::Release {
                released_at = Some(i);
            }
        }
        assert_eq!(released_at, Some(64 * 4 - 1));
    }

    #[test]
    fn test_gain_ramps_to_standby_without_overshoot() {
        let settings = settings_with(|p| {
            p.standby_level = 0.2;
            p.triggered_level = 1.0;
            p.input_trigger_release = 0.01;
        });
        let mut state = ChannelState::new();
        tick(&mut state, 1.0, &settings);
        assert_eq!(state.smoothed_gain, 1.0);

        // Release after 256 quiet samples, then ramp down
        let mut previous = state.smoothed_gain;
        for _ in 0..2000 {
            tick(&mut state, 0.0, &settings);
            if !state.triggered {
                assert!(state.smoothed_gain <= previous);
                assert!(state.smoothed_gain >= 0.2);
            }
            previous = state.smoothed_gain;
        }
        assert_eq!(state.smoothed_gain, 0.2);
    }

    #[test]
    fn test_ramp_step_size() {
        let settings = settings_with(|p| {
            p.standby_level = 0.0;
            p.triggered_level = 1.0;
            p.input_trigger_release = 1.0;
        });
        let mut state = ChannelState::new();
        state.smoothed_gain = 1.0;
        tick(&mut state, 0.0, &settings);
        assert!((state.smoothed_gain - (1.0 - 1.0 / 4096.0)).abs() < 1e-7);
    }

    #[test]
    fn test_fresh_gain_is_pulled_into_level_span() {
        let settings = settings_with(|p| {
            p.standby_level = 1.0;
            p.triggered_level = 1.0;
        });
        let mut state = ChannelState::new();
        assert_eq!(state.smoothed_gain, 0.0);
        tick(&mut state, 0.1, &settings);
        assert_eq!(state.smoothed_gain, 1.0);
    }

    #[test]
    fn test_trigger_count_wraps_at_101() {
        let settings = settings_with(|p| p.release_delay = 0.0);
        let mut state = ChannelState::new();
        for _ in 0..101 {
            assert_eq!(tick(&mut state, 1.0, &settings), GateEvent::Onset);
            assert_eq!(tick(&mut state, 0.0, &settings), GateEvent::Release);
        }
        assert_eq!(state.trigger_count, 0);
        assert_eq!(state.onsets, 101);
    }

    #[test]
    fn test_ratios_track_level() {
        let settings = settings_with(|_| {});
        let mut state = ChannelState::new();
        tick(&mut state, 0.225, &settings);
        assert!((state.last_trigger_ratio - 0.5).abs() < 1e-6);
        assert!((state.last_release_ratio - 1.25).abs() < 1e-6);

        // Silence leaves the last ratios in place
        tick(&mut state, 0.0, &settings);
        assert!((state.last_trigger_ratio - 0.5).abs() < 1e-6);
    }
}

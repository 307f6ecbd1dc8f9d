//! Two-stage click burst
//!
//! An onset schedules an attack phase at constant level followed by a
//! release phase whose level falls linearly to zero. Both phases read
//! successive noise table entries.

use crate::gen::noise_table::NoiseTable;
use crate::trigger::channel::ChannelState;
use crate::trigger::params::BlockSettings;

/// Schedule a fresh click; called on the onset sample
#[inline]
pub fn start(state: &mut ChannelState, settings: &BlockSettings) {
    state.click_attack_remaining = settings.click_attack_len;
    state.click_release_remaining = settings.click_release_len;
    state.click_frame = 0.0;
}

/// Click contribution for this sample
#[inline]
pub fn tick(state: &mut ChannelState, settings: &BlockSettings, table: &NoiseTable) -> f32 {
    let level = if state.click_attack_remaining > 0.0 {
        state.click_attack_remaining = (state.click_attack_remaining - 1.0).max(0.0);
        settings.click_attack_gain
    } else if state.click_release_remaining > 0.0 {
        let level = state.click_release_remaining * settings.click_factor * 0.4;
        state.click_release_remaining = (state.click_release_remaining - 1.0).max(0.0);
        level
    } else {
        return 0.0;
    };

    let sample = table.at_frame(state.click_frame) * level;
    state.click_frame += 1.0;
    if state.click_frame >= table.len() as f32 {
        state.click_frame -= table.len() as f32;
    }
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::params::TriggerParams;

    fn settings(click_level: f32, click_delay: f32, click_release: f32) -> BlockSettings {
        let params = TriggerParams {
            click_level,
            click_delay,
            click_release,
            ..TriggerParams::default()
        };
        BlockSettings::from_params(&params)
    }

    #[test]
    fn test_silent_before_first_onset() {
        let settings = settings(1.0, 1.0, 1.0);
        let mut state = ChannelState::new();
        for _ in 0..100 {
            assert_eq!(tick(&mut state, &settings, NoiseTable::global()), 0.0);
        }
    }

    #[test]
    fn test_attack_then_release_lengths() {
        let settings = settings(1.0, 1.0, 1.0);
        let table = NoiseTable::global();
        let mut state = ChannelState::new();
        start(&mut state, &settings);

        for i in 0..64 {
            assert!(state.click_attack_remaining > 0.0, "attack ended early at {}", i);
            let sample = tick(&mut state, &settings, table);
            assert!((sample - table.get(i) * 0.4).abs() < 1e-6);
            // Release never runs during the attack
            assert_eq!(state.click_release_remaining, 512.0);
        }
        assert_eq!(state.click_attack_remaining, 0.0);

        for _ in 0..512 {
            assert!(state.click_release_remaining > 0.0);
            tick(&mut state, &settings, table);
        }
        assert!(!state.click_active());
        assert_eq!(tick(&mut state, &settings, table), 0.0);
    }

    #[test]
    fn test_release_level_decays_linearly() {
        let settings = settings(1.0, 0.0, 1.0);
        let table = NoiseTable::global();
        let mut state = ChannelState::new();
        start(&mut state, &settings);

        // clickFactor = 1 / 1024, starting level 512 / 1024 * 0.4
        let first = tick(&mut state, &settings, table);
        assert!((first - table.get(0) * 0.2).abs() < 1e-6);

        for i in 1..512 {
            let sample = tick(&mut state, &settings, table);
            let expected_level = (512 - i) as f32 / 1024.0 * 0.4;
            assert!((sample - table.get(i) * expected_level).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fractional_lengths_are_floored() {
        let settings = settings(1.0, 0.3, 0.01);
        let mut state = ChannelState::new();
        start(&mut state, &settings);
        assert_eq!(state.click_attack_remaining, 19.0);
        assert_eq!(state.click_release_remaining, 5.0);

        let mut active = 0;
        while state.click_active() {
            tick(&mut state, &settings, NoiseTable::global());
            active += 1;
        }
        assert_eq!(active, 24);
    }

    #[test]
    fn test_retrigger_restarts_from_table_head() {
        let settings = settings(1.0, 1.0, 1.0);
        let table = NoiseTable::global();
        let mut state = ChannelState::new();
        start(&mut state, &settings);
        for _ in 0..30 {
            tick(&mut state, &settings, table);
        }
        start(&mut state, &settings);
        let sample = tick(&mut state, &settings, table);
        assert!((sample - table.get(0) * 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_frame_wraps_over_long_release() {
        let settings = settings(1.0, 0.0, 4.0);
        let mut state = ChannelState::new();
        start(&mut state, &settings);
        for _ in 0..2048 {
            tick(&mut state, &settings, NoiseTable::global());
            assert!(state.click_frame < 1024.0);
        }
    }
}

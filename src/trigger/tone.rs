//! Tone body synthesizer
//!
//! On each onset three chirp segments are solved so that amplitude and phase
//! carry over from one segment into the next:
//!
//! 1. attack: full amplitude, pitch falls from the start to the body frequency
//! 2. body: amplitude falls to `synth_gain`, pitch falls to the tail frequency
//! 3. tail: amplitude falls to zero at the tail frequency
//!
//! Each segment is evaluated against its remaining sample count, so a segment
//! ends exactly where the next one begins.

use std::f64::consts::TAU;

use crate::trigger::channel::{ChannelState, ToneSegment, TONE_SEGMENTS};
use crate::trigger::params::TriggerParams;

/// Segment length in samples for a time in milliseconds, at least one sample
#[inline]
pub fn segment_length(time_ms: f32, sample_rate: f32) -> f64 {
    (time_ms as f64 * sample_rate as f64 / 1000.0).floor().max(1.0)
}

/// Angular frequency in radians per sample
#[inline]
fn angular(frequency_hz: f32, sample_rate: f32) -> f64 {
    TAU * frequency_hz as f64 / sample_rate as f64
}

/// Solve the three sweep segments for a new onset
///
/// Any sweep still sounding from the previous onset is dropped; nothing new
/// is scheduled when the tone is disabled.
pub fn start(state: &mut ChannelState, params: &TriggerParams, sample_rate: f32) {
    state.tone_segments = Default::default();
    if !params.tone_enabled() {
        return;
    }

    let peak = params.synth_amplitude as f64;
    let amplitudes = [peak, peak, peak * params.synth_gain as f64, 0.0];
    let frequencies = [
        angular(params.synth_freq_start, sample_rate),
        angular(params.synth_freq_body, sample_rate),
        angular(params.synth_freq_tail, sample_rate),
        angular(params.synth_freq_tail, sample_rate),
    ];
    let times = [
        params.synth_time_attack,
        params.synth_time_body,
        params.synth_time_tail,
    ];

    let mut start_phase = 0.0;
    for k in 0..TONE_SEGMENTS {
        let length = segment_length(times[k], sample_rate);
        let segment = solve_segment(
            length,
            (amplitudes[k], amplitudes[k + 1]),
            (frequencies[k], frequencies[k + 1]),
            start_phase,
        );
        start_phase = segment.phase(0.0).rem_euclid(TAU);
        state.tone_segments[k] = segment;
    }
}

/// Linear amplitude and linear frequency over `length` samples
fn solve_segment(
    length: f64,
    (amp_start, amp_end): (f64, f64),
    (freq_start, freq_end): (f64, f64),
    start_phase: f64,
) -> ToneSegment {
    ToneSegment {
        length,
        amp_slope: (amp_start - amp_end) / length,
        amp_offset: amp_end,
        freq_slope: (freq_end - freq_start) / (2.0 * length),
        freq_offset: -freq_end,
        phase_offset: start_phase + length * (freq_start + freq_end) * 0.5,
    }
}

/// Tone contribution for this sample
///
/// A disabled tone also cancels the running sweep, so it never resumes
/// without a fresh onset.
#[inline]
pub fn tick(state: &mut ChannelState, enabled: bool) -> f32 {
    if !enabled {
        state.tone_segments = Default::default();
        return 0.0;
    }

    match state.tone_segments.iter_mut().find(|s| !s.is_exhausted()) {
        Some(segment) => {
            let n = segment.length;
            let sample = segment.amplitude(n) * segment.phase(n).sin();
            segment.length -= 1.0;
            sample as f32
        }
        None => 0.0,
    }
}

//! Multi-channel trigger instance driving gate, click and tone per sample

use crate::error::TriggerError;
use crate::gen::noise_table::NoiseTable;
use crate::trigger::channel::{ChannelState, ChannelStatus};
use crate::trigger::gate::{self, GateEvent};
use crate::trigger::params::{BlockSettings, TriggerParams};
use crate::trigger::{click, tone};

/// A kick trigger instance with `N` independent channels
///
/// The host calls [`KickTrigger::activate`] before processing and then one
/// [`KickTrigger::process`] per channel per block. Nothing on the processing
/// path allocates or fails.
pub struct KickTrigger {
    sample_rate: f32,
    channels: Vec<ChannelState>,
    table: &'static NoiseTable,
}

impl KickTrigger {
    pub fn new(sample_rate: f32, channel_count: usize) -> Result<Self, TriggerError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(TriggerError::InvalidSampleRate(sample_rate));
        }
        if channel_count == 0 {
            return Err(TriggerError::InvalidChannelCount(channel_count));
        }

        log::debug!(
            "kick trigger instance: {} channel(s) at {} Hz",
            channel_count,
            sample_rate
        );

        Ok(Self {
            sample_rate,
            channels: vec![ChannelState::new(); channel_count],
            table: NoiseTable::global(),
        })
    }

    /// Zero the state of every channel
    pub fn activate(&mut self) {
        log::debug!("activating {} channel(s)", self.channels.len());
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelState> {
        self.channels.get(index)
    }

    /// Status of a channel after the last processed block
    pub fn status(&self, index: usize) -> Option<ChannelStatus> {
        self.channels.get(index).map(ChannelState::status)
    }

    /// Process one block of one channel
    ///
    /// Processes `min(input.len(), output.len())` samples. An unknown channel
    /// leaves the output silent.
    pub fn process(
        &mut self,
        channel: usize,
        params: &TriggerParams,
        input: &[f32],
        output: &mut [f32],
    ) -> ChannelStatus {
        let sample_rate = self.sample_rate;
        let table = self.table;
        let Some(state) = self.channels.get_mut(channel) else {
            output.fill(0.0);
            return ChannelStatus::default();
        };

        let settings = BlockSettings::from_params(params);
        let tone_enabled = params.tone_enabled();

        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = process_sample(state, &settings, params, sample_rate, tone_enabled, table, *x);
        }

        state.status()
    }

    /// Process one block of one channel, replacing the input with the output
    pub fn process_in_place(
        &mut self,
        channel: usize,
        params: &TriggerParams,
        buffer: &mut [f32],
    ) -> ChannelStatus {
        let sample_rate = self.sample_rate;
        let table = self.table;
        let Some(state) = self.channels.get_mut(channel) else {
            buffer.fill(0.0);
            return ChannelStatus::default();
        };

        let settings = BlockSettings::from_params(params);
        let tone_enabled = params.tone_enabled();

        for sample in buffer.iter_mut() {
            *sample =
                process_sample(state, &settings, params, sample_rate, tone_enabled, table, *sample);
        }

        state.status()
    }
}

/// Gate, then click, then tone, then output scaling
#[inline]
fn process_sample(
    state: &mut ChannelState,
    settings: &BlockSettings,
    params: &TriggerParams,
    sample_rate: f32,
    tone_enabled: bool,
    table: &NoiseTable,
    input: f32,
) -> f32 {
    if gate::tick(state, input, settings) == GateEvent::Onset {
        click::start(state, settings);
        tone::start(state, params, sample_rate);
    }

    let mut output = state.smoothed_gain * input;
    output += click::tick(state, settings, table);
    output += tone::tick(state, tone_enabled);
    output * settings.output_scale
}

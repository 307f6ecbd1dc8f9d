//! Platform abstraction for live audio input
//!
//! Drives a kick trigger from a platform capture stream and shares its
//! parameters and status with the control thread.

use crate::error::TriggerError;
use crate::trigger::{ChannelStatus, KickTrigger, TriggerParams};
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for platform-specific audio input implementations
pub trait AudioInput {
    /// Open the capture device; `sample_rate` is the preferred rate
    fn initialize(&mut self, sample_rate: f32) -> Result<(), anyhow::Error>;

    /// Start the capture stream
    fn start(&mut self) -> Result<(), anyhow::Error>;

    /// Stop the capture stream
    fn stop(&mut self) -> Result<(), anyhow::Error>;

    /// Get the device sample rate
    fn sample_rate(&self) -> f32;

    /// Check if the stream is running
    fn is_active(&self) -> bool;
}

/// Reusable de-interleaving buffers for the audio callback
pub struct InterleavedScratch {
    input: Vec<f32>,
    output: Vec<f32>,
}

impl InterleavedScratch {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            input: vec![0.0; frames],
            output: vec![0.0; frames],
        }
    }

    /// Grow to `frames`; a no-op within the reserved capacity
    fn ensure(&mut self, frames: usize) {
        if self.input.len() < frames {
            self.input.resize(frames, 0.0);
            self.output.resize(frames, 0.0);
        }
    }
}

/// Kick trigger shared between the audio callback and the control thread
#[derive(Clone)]
pub struct TriggerEngine {
    trigger: Arc<Mutex<KickTrigger>>,
    params: Arc<Mutex<TriggerParams>>,
    status: Arc<Mutex<Vec<ChannelStatus>>>,
}

impl TriggerEngine {
    pub fn new(sample_rate: f32, channels: usize, params: TriggerParams) -> Result<Self, TriggerError> {
        let mut trigger = KickTrigger::new(sample_rate, channels)?;
        trigger.activate();
        Ok(Self {
            trigger: Arc::new(Mutex::new(trigger)),
            params: Arc::new(Mutex::new(params)),
            status: Arc::new(Mutex::new(vec![ChannelStatus::default(); channels])),
        })
    }

    pub fn channel_count(&self) -> usize {
        self.lock_trigger().channel_count()
    }

    /// Replace the parameters used from the next block on
    pub fn set_params(&self, params: TriggerParams) {
        *self.params.lock().unwrap_or_else(|e| e.into_inner()) = params;
    }

    pub fn params(&self) -> TriggerParams {
        *self.params.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Status of every channel after the latest block
    pub fn status(&self) -> Vec<ChannelStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Onsets since activation, per channel
    pub fn onsets(&self) -> Vec<u64> {
        let trigger = self.lock_trigger();
        (0..trigger.channel_count())
            .map(|c| trigger.channel(c).map_or(0, |state| state.onsets))
            .collect()
    }

    /// Reset every channel
    pub fn activate(&self) {
        self.lock_trigger().activate();
    }

    /// Run one interleaved buffer through the trigger
    ///
    /// `output`, when given, receives the interleaved result. Extra device
    /// channels beyond the trigger's channel count are ignored.
    pub fn process_interleaved(
        &self,
        input: &[f32],
        device_channels: usize,
        mut output: Option<&mut [f32]>,
        scratch: &mut InterleavedScratch,
    ) {
        if device_channels == 0 {
            return;
        }
        let frames = input.len() / device_channels;
        scratch.ensure(frames);

        let params = self.params();
        let mut trigger = self.lock_trigger();
        let mut shared = self.status.lock().unwrap_or_else(|e| e.into_inner());
        let channels = trigger.channel_count().min(device_channels);

        for channel in 0..channels {
            for (frame, slot) in scratch.input[..frames].iter_mut().enumerate() {
                *slot = input[frame * device_channels + channel];
            }
            let status = trigger.process(
                channel,
                &params,
                &scratch.input[..frames],
                &mut scratch.output[..frames],
            );
            if let Some(slot) = shared.get_mut(channel) {
                *slot = status;
            }
            if let Some(out) = output.as_deref_mut() {
                for (frame, sample) in scratch.output[..frames].iter().enumerate() {
                    if let Some(dst) = out.get_mut(frame * device_channels + channel) {
                        *dst = *sample;
                    }
                }
            }
        }
    }

    fn lock_trigger(&self) -> MutexGuard<'_, KickTrigger> {
        self.trigger.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Platform-specific implementations
#[cfg(feature = "native")]
pub mod cpal_input;

#[cfg(feature = "native")]
pub use self::cpal_input::CpalInput;

//! C FFI bindings for the kick trigger
//!
//! Thin host adapter around [`KickTrigger`]: instantiate, bind ports to
//! host-owned memory, activate, run, clean up. Port locations are kept per
//! channel and read once per `run` call.

use crate::error::TriggerError;
use crate::plugin::{self, ChannelPort, StatusPort, STATUS_COUNT};
use crate::trigger::{KickTrigger, TriggerParams, CONTROL_COUNT};
use std::ptr;
use std::slice;

/// Host memory bound to one channel's ports
#[derive(Clone, Copy)]
struct ChannelPorts {
    controls: [*const f32; CONTROL_COUNT],
    status: [*mut f32; STATUS_COUNT],
    input: *const f32,
    output: *mut f32,
}

impl ChannelPorts {
    fn unbound() -> Self {
        Self {
            controls: [ptr::null(); CONTROL_COUNT],
            status: [ptr::null_mut(); STATUS_COUNT],
            input: ptr::null(),
            output: ptr::null_mut(),
        }
    }
}

/// Opaque plugin instance handed to the host
pub struct KickTriggerInstance {
    trigger: KickTrigger,
    ports: Vec<ChannelPorts>,
    defaults: [f32; CONTROL_COUNT],
}

impl KickTriggerInstance {
    fn new(sample_rate: f32, channels: usize) -> Option<Self> {
        match KickTrigger::new(sample_rate, channels) {
            Ok(trigger) => Some(Self {
                trigger,
                ports: vec![ChannelPorts::unbound(); channels],
                defaults: TriggerParams::default().to_controls(),
            }),
            Err(err) => {
                log::error!("cannot instantiate kick trigger: {}", err);
                None
            }
        }
    }

    fn connect_port(&mut self, port: usize, location: *mut f32) {
        let (channel, role) = match plugin::locate_port(self.ports.len(), port) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("ignoring port connection: {}", err);
                return;
            }
        };

        let ports = &mut self.ports[channel];
        match role {
            ChannelPort::Control(index) => ports.controls[index] = location,
            ChannelPort::Status(status) => ports.status[status.index()] = location,
            ChannelPort::AudioInput => ports.input = location,
            ChannelPort::AudioOutput => ports.output = location,
        }
    }

    /// # Safety
    /// Every non-null bound location must be valid for the access `run` makes:
    /// one read per control, one write per status, `sample_count` samples of audio.
    unsafe fn run(&mut self, sample_count: usize) {
        for (channel, ports) in self.ports.iter().enumerate() {
            let mut controls = self.defaults;
            for (value, location) in controls.iter_mut().zip(ports.controls.iter()) {
                if let Some(bound) = location.as_ref() {
                    *value = *bound;
                }
            }
            let params = TriggerParams::from_controls(&controls);

            if ports.input.is_null() || ports.output.is_null() {
                continue;
            }

            let status = if ports.input == ports.output as *const f32 {
                let buffer = slice::from_raw_parts_mut(ports.output, sample_count);
                self.trigger.process_in_place(channel, &params, buffer)
            } else {
                let input = slice::from_raw_parts(ports.input, sample_count);
                let output = slice::from_raw_parts_mut(ports.output, sample_count);
                self.trigger.process(channel, &params, input, output)
            };

            for (port, location) in StatusPort::ALL.iter().zip(ports.status.iter()) {
                if let Some(slot) = location.as_mut() {
                    *slot = port.value(&status);
                }
            }
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Number of plugin variants in this library
#[no_mangle]
pub extern "C" fn kicktrigger_descriptor_count() -> u32 {
    plugin::descriptors().len() as u32
}

/// Unique id of the plugin variant at `index`, or 0 if there is none
#[no_mangle]
pub extern "C" fn kicktrigger_unique_id(index: u32) -> u32 {
    plugin::descriptor(index as usize).map_or(0, |d| d.unique_id)
}

/// Channel count of the plugin variant at `index`, or 0 if there is none
#[no_mangle]
pub extern "C" fn kicktrigger_channel_count(index: u32) -> u32 {
    plugin::descriptor(index as usize).map_or(0, |d| d.channels as u32)
}

/// Port count of the plugin variant at `index`, or 0 if there is none
#[no_mangle]
pub extern "C" fn kicktrigger_port_count(index: u32) -> u32 {
    plugin::descriptor(index as usize).map_or(0, |d| d.port_count() as u32)
}

// =============================================================================
// Instance lifecycle
// =============================================================================

/// Create an instance of the plugin variant at `index`
///
/// # Returns
/// Pointer to a new instance, or null if `index` is unknown or the sample
/// rate is invalid. Must be freed with `kicktrigger_cleanup`.
#[no_mangle]
pub extern "C" fn kicktrigger_instantiate(index: u32, sample_rate: u32) -> *mut KickTriggerInstance {
    let descriptor = match plugin::descriptor(index as usize)
        .ok_or(TriggerError::UnknownDescriptor(index as usize))
    {
        Ok(descriptor) => descriptor,
        Err(err) => {
            log::error!("cannot instantiate kick trigger: {}", err);
            return ptr::null_mut();
        }
    };

    match KickTriggerInstance::new(sample_rate as f32, descriptor.channels) {
        Some(instance) => Box::into_raw(Box::new(instance)),
        None => ptr::null_mut(),
    }
}

/// Create an instance with an arbitrary channel count
///
/// Ports follow the same per-channel layout as the registered variants.
/// Returns null on an invalid sample rate or a channel count of zero.
#[no_mangle]
pub extern "C" fn kicktrigger_new(sample_rate: f32, channels: u32) -> *mut KickTriggerInstance {
    match KickTriggerInstance::new(sample_rate, channels as usize) {
        Some(instance) => Box::into_raw(Box::new(instance)),
        None => ptr::null_mut(),
    }
}

/// Bind a port to host memory
///
/// Out-of-range ports are ignored.
///
/// # Safety
/// `instance` must be a valid pointer returned by `kicktrigger_instantiate` or
/// `kicktrigger_new`. `location` must stay valid until it is rebound or the
/// instance is cleaned up.
#[no_mangle]
pub unsafe extern "C" fn kicktrigger_connect_port(
    instance: *mut KickTriggerInstance,
    port: u32,
    location: *mut f32,
) {
    if let Some(instance) = instance.as_mut() {
        instance.connect_port(port as usize, location);
    }
}

/// Reset all per-channel state
///
/// # Safety
/// `instance` must be a valid instance pointer.
#[no_mangle]
pub unsafe extern "C" fn kicktrigger_activate(instance: *mut KickTriggerInstance) {
    if let Some(instance) = instance.as_mut() {
        instance.trigger.activate();
    }
}

/// Process `sample_count` samples on every channel
///
/// Unbound control ports read their default value. A channel whose audio
/// input or output is unbound is skipped. Input and output may share memory.
///
/// # Safety
/// - `instance` must be a valid instance pointer
/// - every bound audio location must hold at least `sample_count` floats
#[no_mangle]
pub unsafe extern "C" fn kicktrigger_run(instance: *mut KickTriggerInstance, sample_count: u32) {
    if let Some(instance) = instance.as_mut() {
        instance.run(sample_count as usize);
    }
}

/// Free an instance
///
/// # Safety
/// `instance` must be a valid instance pointer, or null. It is invalid after
/// this call.
#[no_mangle]
pub unsafe extern "C" fn kicktrigger_cleanup(instance: *mut KickTriggerInstance) {
    if !instance.is_null() {
        let instance = Box::from_raw(instance);
        log::debug!(
            "releasing kick trigger instance with {} channel(s)",
            instance.trigger.channel_count()
        );
    }
}

//! Kick trigger: detects percussive transients in an input signal and
//! re-synthesizes them as a gated, click-accented trigger signal

pub mod error;
pub mod gen;
pub mod plugin;
pub mod trigger;
pub mod utils;

// Platform abstraction layer
pub mod platform;

// C FFI bindings for audio hosts
pub mod ffi;

#[cfg(feature = "bounce")]
pub mod bounce;

pub use error::TriggerError;
pub use trigger::{ChannelState, ChannelStatus, KickTrigger, TriggerParams};

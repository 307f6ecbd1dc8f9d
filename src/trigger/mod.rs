//! The per-channel kick trigger: envelope gate, click burst, tone body

pub mod channel;
pub mod click;
pub mod gate;
pub mod params;
pub mod processor;
pub mod tone;

pub use self::channel::{ChannelState, ChannelStatus, ToneSegment};
pub use self::gate::GateEvent;
pub use self::params::{BlockSettings, TriggerParams, CONTROL_COUNT};
pub use self::processor::KickTrigger;

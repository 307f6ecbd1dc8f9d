//! Plugin metadata: descriptors and the per-channel port layout
//!
//! Ports are laid out channel-major. Each channel owns, in order, the
//! [`CONTROL_COUNT`] control inputs, the [`STATUS_COUNT`] status outputs, one
//! audio input and one audio output.

use once_cell::sync::Lazy;

use crate::error::TriggerError;
use crate::trigger::{ChannelStatus, TriggerParams, CONTROL_COUNT};

/// Status output ports per channel
pub const STATUS_COUNT: usize = 4;

/// All ports per channel
pub const PORTS_PER_CHANNEL: usize = CONTROL_COUNT + STATUS_COUNT + 2;

const MAKER: &str = "Immanuel Albrecht";
const COPYRIGHT: &str = "(c) 2012, GPLv3";

/// (name, lower bound, upper bound, logarithmic) in control port order
const CONTROL_PORTS: [(&str, f32, Option<f32>, bool); CONTROL_COUNT] = [
    ("Trigger Threshold", 0.0, None, true),
    ("Release Threshold", 0.0, None, true),
    ("Release Delay", 0.0, None, true),
    ("Click Level", 0.0, None, true),
    ("Click Delay", 0.0, None, true),
    ("Click Release", 0.0, None, true),
    ("Triggered Input Level", 0.0, None, false),
    ("Standby Input Level", 0.0, None, false),
    ("Input Trigger Release", 0.0, None, true),
    ("Block Size", 1.0, Some(4096.0), true),
    ("Synth Amplitude", 0.0, None, false),
    ("Synth Gain", 0.0, Some(1.0), false),
    ("Synth Start Frequency", 1.0, Some(2000.0), true),
    ("Synth Body Frequency", 1.0, Some(2000.0), true),
    ("Synth Tail Frequency", 1.0, Some(2000.0), true),
    ("Synth Attack Time", 0.0, Some(1000.0), true),
    ("Synth Body Time", 0.0, Some(5000.0), true),
    ("Synth Tail Time", 0.0, Some(5000.0), true),
    ("Output Gain", 0.0, None, true),
];

/// Status outputs, in port order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusPort {
    Gain,
    TriggerRatio,
    ReleaseRatio,
    TriggerCount,
}

impl StatusPort {
    pub const ALL: [StatusPort; STATUS_COUNT] = [
        StatusPort::Gain,
        StatusPort::TriggerRatio,
        StatusPort::ReleaseRatio,
        StatusPort::TriggerCount,
    ];

    /// Position among the channel's status ports
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusPort::Gain => "Input Gain",
            StatusPort::TriggerRatio => "Peak / Trigger Threshold",
            StatusPort::ReleaseRatio => "Peak / Release Threshold",
            StatusPort::TriggerCount => "Trigger Count",
        }
    }

    /// The value this port reports for a channel
    pub fn value(self, status: &ChannelStatus) -> f32 {
        match self {
            StatusPort::Gain => status.gain,
            StatusPort::TriggerRatio => status.trigger_ratio,
            StatusPort::ReleaseRatio => status.release_ratio,
            StatusPort::TriggerCount => status.trigger_count as f32,
        }
    }
}

/// Role of a port within its channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelPort {
    Control(usize),
    Status(StatusPort),
    AudioInput,
    AudioOutput,
}

impl ChannelPort {
    /// Role of the port at `offset` within a channel's block of ports
    pub fn from_offset(offset: usize) -> Option<Self> {
        match offset {
            o if o < CONTROL_COUNT => Some(ChannelPort::Control(o)),
            o if o < CONTROL_COUNT + STATUS_COUNT => {
                Some(ChannelPort::Status(StatusPort::ALL[o - CONTROL_COUNT]))
            }
            o if o == CONTROL_COUNT + STATUS_COUNT => Some(ChannelPort::AudioInput),
            o if o == CONTROL_COUNT + STATUS_COUNT + 1 => Some(ChannelPort::AudioOutput),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortKind {
    Control,
    Audio,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RangeHint {
    pub lower: Option<f32>,
    pub upper: Option<f32>,
    pub default: Option<f32>,
    pub logarithmic: bool,
    pub integer: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortInfo {
    pub name: String,
    pub direction: PortDirection,
    pub kind: PortKind,
    pub hint: RangeHint,
}

/// Metadata for one plugin variant
#[derive(Clone, Debug, PartialEq)]
pub struct PluginDescriptor {
    pub unique_id: u32,
    pub label: String,
    pub name: String,
    pub maker: &'static str,
    pub copyright: &'static str,
    pub hard_rt_capable: bool,
    pub channels: usize,
    pub ports: Vec<PortInfo>,
}

impl PluginDescriptor {
    pub fn new(channels: usize, unique_id: u32) -> Self {
        let defaults = TriggerParams::default().to_controls();
        let mut ports = Vec::with_capacity(channels * PORTS_PER_CHANNEL);

        for channel in 0..channels {
            for (i, &(name, lower, upper, logarithmic)) in CONTROL_PORTS.iter().enumerate() {
                ports.push(PortInfo {
                    name: format!("{} ({})", name, channel),
                    direction: PortDirection::Input,
                    kind: PortKind::Control,
                    hint: RangeHint {
                        lower: Some(lower),
                        upper,
                        default: Some(defaults[i]),
                        logarithmic,
                        integer: i == 9,
                    },
                });
            }

            for status in StatusPort::ALL {
                ports.push(PortInfo {
                    name: format!("{} ({})", status.name(), channel),
                    direction: PortDirection::Output,
                    kind: PortKind::Control,
                    hint: RangeHint {
                        lower: Some(0.0),
                        upper: (status == StatusPort::TriggerCount).then_some(100.0),
                        integer: status == StatusPort::TriggerCount,
                        ..RangeHint::default()
                    },
                });
            }

            ports.push(PortInfo {
                name: format!("Input {}", channel),
                direction: PortDirection::Input,
                kind: PortKind::Audio,
                hint: RangeHint::default(),
            });
            ports.push(PortInfo {
                name: format!("Output {}", channel),
                direction: PortDirection::Output,
                kind: PortKind::Audio,
                hint: RangeHint::default(),
            });
        }

        Self {
            unique_id,
            label: format!("kicktrigger_x{}", channels),
            name: format!("Kick Trigger {} Channels", channels),
            maker: MAKER,
            copyright: COPYRIGHT,
            hard_rt_capable: true,
            channels,
            ports,
        }
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Channel and role of a flat port index
    pub fn locate_port(&self, port: usize) -> Result<(usize, ChannelPort), TriggerError> {
        locate_port(self.channels, port)
    }
}

/// Channel and role of a flat port index for a plugin with `channels` channels
pub fn locate_port(channels: usize, port: usize) -> Result<(usize, ChannelPort), TriggerError> {
    let port_count = channels * PORTS_PER_CHANNEL;
    if port >= port_count {
        return Err(TriggerError::PortOutOfRange { port, port_count });
    }
    let channel = port / PORTS_PER_CHANNEL;
    ChannelPort::from_offset(port % PORTS_PER_CHANNEL)
        .map(|role| (channel, role))
        .ok_or(TriggerError::PortOutOfRange { port, port_count })
}

static DESCRIPTORS: Lazy<Vec<PluginDescriptor>> = Lazy::new(|| {
    vec![
        PluginDescriptor::new(1, 1_668_666),
        PluginDescriptor::new(2, 1_668_667),
    ]
});

/// Every plugin variant this library provides
pub fn descriptors() -> &'static [PluginDescriptor] {
    &DESCRIPTORS
}

/// Descriptor at `index`, or `None` past the end
pub fn descriptor(index: usize) -> Option<&'static PluginDescriptor> {
    DESCRIPTORS.get(index)
}

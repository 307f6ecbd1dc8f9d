use thiserror::Error;

/// Errors raised while setting up a trigger instance
///
/// Processing itself never fails; these only come from construction and
/// port binding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriggerError {
    #[error("channel count must be at least 1, got {0}")]
    InvalidChannelCount(usize),

    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("no plugin descriptor at index {0}")]
    UnknownDescriptor(usize),

    #[error("port {port} out of range for a plugin with {port_count} ports")]
    PortOutOfRange { port: usize, port_count: usize },
}

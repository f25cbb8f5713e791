//! Error types for notify-relay.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
///
/// These never cross the engine boundary: `Channel::send` converts every
/// variant into a failed `DeliveryOutcome` whose provider status is the
/// variant's failure class.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} is not configured")]
    NotConfigured { name: String },

    #[error("Recipient has no usable address for channel {name}")]
    MissingAddress { name: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Provider rejected send on channel {name}: {reason}")]
    ProviderRejected { name: String, reason: String },

    #[error("Channel {name} timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    #[error("Invalid message for channel {name}: {reason}")]
    InvalidMessage { name: String, reason: String },
}

impl ChannelError {
    /// Failure class recorded as the provider status of a failed outcome.
    pub fn status_class(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "not_configured",
            Self::MissingAddress { .. } => "missing_address",
            Self::SendFailed { .. } | Self::Timeout { .. } => "network_error",
            Self::ProviderRejected { .. } => "provider_rejected",
            Self::InvalidMessage { .. } => "invalid_message",
        }
    }
}

//! Configuration and construction errors.
//!
//! Only recoverable, start-up time failures are represented here. Queue
//! exhaustion is reported through [`QueueFull`](crate::dram::controller::QueueFull)
//! and topology mismatches during simulation are fatal assertions.

use thiserror::Error;

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text was not valid JSON for the config schema.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds a value the simulator cannot run with.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field (e.g. `memory.writeq_max`).
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for building an [`ConfigError::Invalid`].
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

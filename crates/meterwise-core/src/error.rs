//! Shared error type across meterwise crates.
//!
//! Every variant describes a configuration or setup failure. Recording
//! operations (increment, record, start/end) never produce errors.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and runtime.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("invalid match pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("unknown metrics category: {0}")]
    UnknownCategory(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeterError {
    /// True for errors a user can fix by editing the configuration.
    pub fn is_config(&self) -> bool {
        !matches!(self, MeterError::Internal(_))
    }
}

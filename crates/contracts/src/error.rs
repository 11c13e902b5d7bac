//! Error types shared across the workspace
//!
//! Protocol states (`Retry`, `Abort`, `Timeout`) are not errors; this type
//! covers real failures: bad configuration and broken stream plumbing.

use thiserror::Error;

/// Unified error type for the capture workspace.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration field failed validation.
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Configuration could not be parsed.
    #[error("config parse error: {message}")]
    ConfigParse { message: String },

    /// A stream channel closed while data was still expected.
    #[error("stream '{stream}' channel closed")]
    ChannelClosed { stream: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a config validation error.
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a config parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    /// Create a closed-channel error.
    pub fn channel_closed(stream: impl Into<String>) -> Self {
        Self::ChannelClosed {
            stream: stream.into(),
        }
    }
}

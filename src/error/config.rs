//! Configuration error types.

use thiserror::Error;

/// Errors raised while building or validating a client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The reconnect interval must be a positive duration.
    #[error("Reconnect interval must be greater than zero")]
    ZeroReconnectInterval,

    /// The base URL is empty.
    #[error("Base URL must not be empty")]
    EmptyBaseUrl,

    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value '{value}' for {var}: {message}")]
    InvalidEnv {
        var: String,
        value: String,
        message: String,
    },
}

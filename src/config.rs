//! Client configuration.
//!
//! [`ClientConfig`] is built once with the builder methods below and handed
//! to [`crate::StreamClient`], which never mutates it.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use ssewire::ClientConfig;
//!
//! let config = ClientConfig::new("http://localhost:8000")
//!     .with_reconnect_interval(Duration::from_secs(2))
//!     .with_max_reconnect_attempts(3)
//!     .with_on_message(|payload| println!("{}", payload));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ConfigError, TransportError};

/// Fixed path of the event stream, joined to the base URL.
pub const SSE_PATH: &str = "/sse";

/// Default origin when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default delay between reconnect attempts (5 seconds).
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(5000);

/// Default number of automatic reconnect attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

pub const ENV_BASE_URL: &str = "SSEWIRE_BASE_URL";
pub const ENV_RECONNECT_INTERVAL_MS: &str = "SSEWIRE_RECONNECT_INTERVAL_MS";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "SSEWIRE_MAX_RECONNECT_ATTEMPTS";
pub const ENV_AUTO_RECONNECT: &str = "SSEWIRE_AUTO_RECONNECT";

/// Callback invoked for each delivered message.
pub type MessageCallback = Arc<dyn Fn(&Value) + Send + Sync>;
/// Callback invoked when the transport reports open.
pub type ConnectCallback = Arc<dyn Fn() + Send + Sync>;
/// Callback invoked on every transport error.
pub type ErrorCallback = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Configuration for [`crate::StreamClient`].
///
/// Callbacks left unset fall back to writing to the client's diagnostic sink.
#[derive(Clone)]
pub struct ClientConfig {
    /// Origin the `/sse` path is joined to
    pub base_url: String,
    /// Extra request headers sent on every connection attempt
    pub headers: Vec<(String, String)>,
    /// Reconnect automatically after a transport error (default: true)
    pub auto_reconnect: bool,
    /// Delay before each automatic reconnect (default: 5s)
    pub reconnect_interval: Duration,
    /// Automatic reconnects allowed between successful opens (default: 10)
    pub max_reconnect_attempts: u32,
    pub on_message: Option<MessageCallback>,
    pub on_connect: Option<ConnectCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: Vec::new(),
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            on_message: None,
            on_connect: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("auto_reconnect", &self.auto_reconnect)
            .field("reconnect_interval", &self.reconnect_interval)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("on_message", &self.on_message.is_some())
            .field("on_connect", &self.on_connect.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default values for the given origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Set the origin the `/sse` path is joined to.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Add a request header sent on every connection attempt.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Enable or disable automatic reconnection.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the delay between reconnect attempts.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Set the number of automatic reconnects allowed between successful opens.
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the message callback.
    pub fn with_on_message<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_message = Some(Arc::new(callback));
        self
    }

    /// Set the connect callback.
    pub fn with_on_connect<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_connect = Some(Arc::new(callback));
        self
    }

    /// Set the error callback.
    pub fn with_on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Full URL of the event stream.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SSE_PATH)
    }

    /// Check the invariants the client relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.reconnect_interval.is_zero() {
            return Err(ConfigError::ZeroReconnectInterval);
        }
        Ok(())
    }

    /// Create config from the `SSEWIRE_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an
    /// error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_RECONNECT_INTERVAL_MS) {
            let ms: u64 = parse_env(ENV_RECONNECT_INTERVAL_MS, &raw)?;
            config.reconnect_interval = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(ENV_MAX_RECONNECT_ATTEMPTS) {
            config.max_reconnect_attempts = parse_env(ENV_MAX_RECONNECT_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_RECONNECT) {
            config.auto_reconnect = parse_bool_env(ENV_AUTO_RECONNECT, &raw)?;
        }

        Ok(config)
    }
}

fn parse_env<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool_env(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}

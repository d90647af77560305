//! Command-line argument parsing for ssewire.
//!
//! Flags override whatever [`ClientConfig::from_env`] produced; anything not
//! given on the command line keeps its environment or default value.

use std::time::Duration;

use clap::Parser;

use crate::config::ClientConfig;

/// Stream server-sent events and print each JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ssewire")]
#[command(about = "Reconnecting SSE client that prints JSON messages", version)]
pub struct Cli {
    /// Base URL of the server (the stream is read from {base_url}/sse)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fixed delay between reconnect attempts, in milliseconds
    #[arg(long)]
    pub reconnect_interval_ms: Option<u64>,

    /// Reconnects allowed before giving up
    #[arg(long)]
    pub max_reconnect_attempts: Option<u32>,

    /// Do not reconnect after a connection error
    #[arg(long)]
    pub no_reconnect: bool,

    /// Extra request header (format: "Name: value"), may be repeated
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(ms) = self.reconnect_interval_ms {
            config = config.with_reconnect_interval(Duration::from_millis(ms));
        }
        if let Some(attempts) = self.max_reconnect_attempts {
            config = config.with_max_reconnect_attempts(attempts);
        }
        if self.no_reconnect {
            config = config.with_auto_reconnect(false);
        }
        for (name, value) in &self.headers {
            config = config.with_header(name.clone(), value.clone());
        }
        config
    }
}

/// Parse a `Name: value` header argument.
///
/// # Examples
///
/// ```
/// use ssewire::cli::args::parse_header;
///
/// let header = parse_header("Authorization: Bearer abc").unwrap();
/// assert_eq!(header, ("Authorization".to_string(), "Bearer abc".to_string()));
/// ```
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", raw));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

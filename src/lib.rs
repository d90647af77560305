//! ssewire - a reconnecting server-sent events client
//!
//! Connects to `{base_url}/sse`, parses every message as JSON, drops
//! `{"type":"ping"}` keep-alives and hands the rest to a callback. Transport
//! errors trigger fixed-interval reconnects up to a configurable budget.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod sse;
pub mod traits;

pub use client::{ConnectionState, StreamClient};
pub use config::ClientConfig;
pub use error::{ConfigError, TransportError};

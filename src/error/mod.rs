//! Error types for ssewire.
//!
//! - [`TransportError`] - failures of the push channel, handed to the
//!   user's error callback
//! - [`ConfigError`] - invalid client configuration
//!
//! SSE framing errors live with the decoder in [`crate::sse::SseParseError`].
//!
//! No error escapes a running [`crate::StreamClient`]: transport errors end in
//! the error callback, everything recovered locally ends in the diagnostic
//! sink.

mod config;
mod transport;

pub use config::ConfigError;
pub use transport::{classify_reqwest_error, TransportError};

//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestConnectionFactory`] - SSE over HTTP using reqwest
//! - [`TracingSink`] - diagnostics forwarded to `tracing`
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockConnectionFactory`] - scripted transport events
//! - [`mock::RecordingSink`] - in-memory diagnostics

mod close_signal;
pub mod mock;
pub mod reqwest_sse;
pub mod tracing_sink;

pub use mock::{MockConnection, MockConnectionFactory, RecordingSink};
pub use reqwest_sse::{ReqwestConnectionFactory, ReqwestSseConnection, EVENT_STREAM_MIME};
pub use tracing_sink::TracingSink;

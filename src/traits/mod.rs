//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`ConnectionFactory`] / [`EventSourceConnection`] - the push transport
//! - [`DiagnosticSink`] - destination for locally recovered errors

pub mod connection;
pub mod diagnostics;

pub use connection::{ConnectionFactory, EventSourceConnection, TransportEvent};
pub use diagnostics::{DiagnosticLevel, DiagnosticSink};

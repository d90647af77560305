//! Mock implementations for testing.
//!
//! These mocks let the client be exercised without a network: tests inject
//! transport events and inspect what was logged.
//!
//! # Available Mocks
//!
//! - [`MockConnectionFactory`] / [`MockConnection`] - scripted transport
//! - [`RecordingSink`] - in-memory diagnostic sink

pub mod connection;
pub mod diagnostics;

pub use connection::{MockConnection, MockConnectionFactory};
pub use diagnostics::{DiagnosticEntry, RecordingSink};

//! Diagnostic sink backed by `tracing`.

use tracing::{debug, error, info, warn};

use crate::traits::{DiagnosticLevel, DiagnosticSink};

/// Forwards diagnostics to the `tracing` macros under the `ssewire` target.
///
/// This is the sink [`crate::StreamClient::new`] installs. Output goes
/// wherever the application's subscriber sends it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for TracingSink {
    fn log(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Debug => debug!(target: "ssewire", "{}", message),
            DiagnosticLevel::Info => info!(target: "ssewire", "{}", message),
            DiagnosticLevel::Warn => warn!(target: "ssewire", "{}", message),
            DiagnosticLevel::Error => error!(target: "ssewire", "{}", message),
        }
    }
}

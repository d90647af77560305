//! Diagnostic sink trait abstraction.
//!
//! Everything the client recovers from locally (bad payloads, construction
//! failures, an exhausted retry budget) and every default callback ends up
//! here instead of in a global output stream.

use std::fmt;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl DiagnosticLevel {
    /// Returns a short label suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Debug => "debug",
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Warn => "warn",
            DiagnosticLevel::Error => "error",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DiagnosticLevel> for tracing::Level {
    fn from(level: DiagnosticLevel) -> Self {
        match level {
            DiagnosticLevel::Debug => tracing::Level::DEBUG,
            DiagnosticLevel::Info => tracing::Level::INFO,
            DiagnosticLevel::Warn => tracing::Level::WARN,
            DiagnosticLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Destination for locally recovered errors and default callback output.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic entry.
    fn log(&self, level: DiagnosticLevel, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(DiagnosticLevel::Debug < DiagnosticLevel::Info);
        assert!(DiagnosticLevel::Warn < DiagnosticLevel::Error);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(DiagnosticLevel::Warn.to_string(), "warn");
        assert_eq!(DiagnosticLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_level_into_tracing() {
        assert_eq!(tracing::Level::from(DiagnosticLevel::Info), tracing::Level::INFO);
        assert_eq!(tracing::Level::from(DiagnosticLevel::Error), tracing::Level::ERROR);
    }
}

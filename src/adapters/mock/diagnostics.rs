//! Recording diagnostic sink for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{DiagnosticLevel, DiagnosticSink};

/// One recorded diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Diagnostic sink that keeps every entry in memory.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<DiagnosticEntry>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries recorded so far.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries recorded at exactly `level`.
    pub fn entries_at(&self, level: DiagnosticLevel) -> Vec<DiagnosticEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    /// Number of entries whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .count()
    }

    /// Forget all recorded entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn log(&self, level: DiagnosticLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DiagnosticEntry {
                level,
                message: message.to_string(),
            });
    }
}

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

/// Log records collected during the current request, shown on debug error pages.
pub trait DebugLogger: Send + Sync {
    fn logs(&self) -> Vec<LogEntry>;

    fn count_errors(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, level: Level, message: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level: level.to_string(),
                message: message.into(),
            });
    }
}

impl DebugLogger for MemoryLogger {
    fn logs(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count_errors(&self) -> usize {
        let error = Level::ERROR.to_string();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.level == error)
            .count()
    }
}

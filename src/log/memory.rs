use std::sync::{Mutex, PoisonError};

use super::{ErrorLogger, LogEvent};

/// Keeps every recorded event in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<LogEvent> {
        self.lock().last().cloned()
    }

    /// Events of kind error or exception.
    pub fn errors(&self) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.kind.is_error())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorLogger for MemoryLogger {
    fn record(&self, event: LogEvent) {
        self.lock().push(event);
    }
}

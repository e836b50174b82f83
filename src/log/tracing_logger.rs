use std::sync::{Mutex, PoisonError};

use super::{ErrorLogger, LogEvent, LogKind};

/// Forwards events to the `tracing` facade.
///
/// Events are emitted under the `meta_commons::log` target at a level
/// matching their kind. An optional grep code prefixes every message as
/// `[code] message`; a temporary code applies to the next event only and then
/// the previous code is restored.
#[derive(Debug, Default)]
pub struct TracingLogger {
    grep: Mutex<GrepCode>,
}

#[derive(Debug, Default)]
struct GrepCode {
    current: Option<String>,
    restore: Option<Option<String>>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_grep_code(&self, code: impl Into<String>) {
        let mut grep = self.grep.lock().unwrap_or_else(PoisonError::into_inner);
        grep.current = Some(code.into());
        grep.restore = None;
    }

    /// Sets a grep code for the next event only.
    pub fn set_temporary_grep_code(&self, code: impl Into<String>) {
        let mut grep = self.grep.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = grep.current.replace(code.into());
        if grep.restore.is_none() {
            grep.restore = Some(previous);
        }
    }

    pub fn clear_grep_code(&self) {
        let mut grep = self.grep.lock().unwrap_or_else(PoisonError::into_inner);
        grep.current = None;
        grep.restore = None;
    }

    pub fn grep_code(&self) -> Option<String> {
        let grep = self.grep.lock().unwrap_or_else(PoisonError::into_inner);
        grep.current.clone()
    }

    /// Message as it will be emitted, with the grep code prefix applied.
    fn prefixed(&self, message: &str) -> String {
        let mut grep = self.grep.lock().unwrap_or_else(PoisonError::into_inner);
        let line = match &grep.current {
            Some(code) => format!("[{code}] {message}"),
            None => message.to_string(),
        };
        if let Some(previous) = grep.restore.take() {
            grep.current = previous;
        }
        line
    }
}

impl ErrorLogger for TracingLogger {
    fn record(&self, event: LogEvent) {
        let message = self.prefixed(&event.message);
        let kind = event.kind.as_str();
        let data = event.data.as_ref().map(|d| d.to_string());
        let data = data.as_deref().unwrap_or("");

        match event.kind {
            LogKind::Error | LogKind::Exception => {
                tracing::error!(target: "meta_commons::log", kind, data, "{message}")
            }
            LogKind::Warning => {
                tracing::warn!(target: "meta_commons::log", kind, data, "{message}")
            }
            LogKind::Data => {
                tracing::debug!(target: "meta_commons::log", kind, data, "{message}")
            }
            LogKind::General | LogKind::Notice => {
                tracing::info!(target: "meta_commons::log", kind, data, "{message}")
            }
        }
    }
}

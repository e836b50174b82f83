//! Error logging collaborators.
//!
//! Components that report problems take an [`ErrorLogger`] explicitly; there
//! is no process-wide logger. [`TracingLogger`] forwards to `tracing`,
//! [`MemoryLogger`] keeps events for later inspection.

mod memory;
mod tracing_logger;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

pub use memory::MemoryLogger;
pub use tracing_logger::TracingLogger;

/// Sink for [`LogEvent`]s.
pub trait ErrorLogger: Send + Sync + fmt::Debug {
    fn record(&self, event: LogEvent);
}

impl<L: ErrorLogger + ?Sized> ErrorLogger for Arc<L> {
    fn record(&self, event: LogEvent) {
        (**self).record(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    General,
    Notice,
    Warning,
    Error,
    Exception,
    Data,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::General => "general",
            LogKind::Notice => "notice",
            LogKind::Warning => "warning",
            LogKind::Error => "error",
            LogKind::Exception => "exception",
            LogKind::Data => "data",
        }
    }

    /// True for kinds that report a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, LogKind::Error | LogKind::Exception)
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event: a message plus an optional structured payload.
///
/// `Display` renders the message followed by an indented dump of the
/// payload:
///
/// ```text
/// order rejected
/// id => 7
/// lines => Array (
///     sku => A1
/// )
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub kind: LogKind,
    pub message: String,
    pub data: Option<Value>,
}

impl LogEvent {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(LogKind::General, message)
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(LogKind::Notice, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogKind::Error, message)
    }

    /// A named data dump.
    pub fn data(name: impl Into<String>, data: impl Into<Value>) -> Self {
        Self::new(LogKind::Data, name).with_data(data)
    }

    /// Captures an error and its chain of sources.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(Value::String(cause.to_string()));
            source = cause.source();
        }

        Self::new(LogKind::Exception, err.to_string()).with_data(json!({
            "error": err.to_string(),
            "caused_by": causes,
        }))
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        match &self.data {
            None => Ok(()),
            Some(container @ (Value::Object(_) | Value::Array(_))) => {
                f.write_str(&dump_entries(container, 0))
            }
            Some(scalar) => writeln!(f, "{}", scalar_text(scalar)),
        }
    }
}

fn dump_entries(value: &Value, level: usize) -> String {
    let indent = " ".repeat(level * 4);
    let mut out = String::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                out.push_str(&format!("{indent}{key} => "));
                out.push_str(&dump_value(child, level));
            }
        }
        Value::Array(items) => {
            for child in items {
                out.push_str(&indent);
                out.push_str(&dump_value(child, level));
            }
        }
        _ => {}
    }
    out
}

fn dump_value(value: &Value, level: usize) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => format!(
            "Array (\n{}{})\n",
            dump_entries(value, level + 1),
            " ".repeat(level * 4)
        ),
        scalar => format!("{}\n", scalar_text(scalar)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_display_dumps_nested_data() {
        let event = LogEvent::data(
            "order rejected",
            json!({"id": 7, "lines": [{"sku": "A1"}, "note"]}),
        );
        let expected = "\
order rejected
id => 7
lines => Array (
    Array (
        sku => A1
    )
    note
)
";
        assert_eq!(event.to_string(), expected);
    }

    #[test]
    fn test_display_without_data() {
        assert_eq!(LogEvent::warning("careful").to_string(), "careful\n");
        assert_eq!(
            LogEvent::general("count").with_data(3).to_string(),
            "count\n3\n"
        );
    }

    #[test]
    fn test_from_error_captures_chain() {
        let err = Error::from(crate::config::ConfigError::ReadError {
            path: "app.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let event = LogEvent::from_error(&err);
        assert_eq!(event.kind, LogKind::Exception);
        assert!(event.message.starts_with("configuration error"));
        let causes = event.data.as_ref().unwrap()["caused_by"].as_array().unwrap();
        assert_eq!(causes.len(), 2);
        assert_eq!(causes[1], json!("denied"));
    }

    #[test]
    fn test_error_kinds() {
        assert!(LogKind::Error.is_error());
        assert!(LogKind::Exception.is_error());
        assert!(!LogKind::Notice.is_error());
    }
}

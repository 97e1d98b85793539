use super::log_level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stack frame captured with a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl TraceFrame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Frame without source location, e.g. an internal function call.
    pub fn internal() -> Self {
        Self {
            file: None,
            line: None,
        }
    }
}

/// A buffered log record handed over by the host logger on flush.
///
/// The level is kept numeric: hosts may emit severities this crate has no
/// name for, and those still have to be shipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub level: u32,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub trace: Vec<TraceFrame>,
}

impl LogRecord {
    pub fn new(
        message: impl Into<String>,
        level: Level,
        category: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            level: level.severity(),
            category: category.into(),
            timestamp,
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<TraceFrame>) -> Self {
        self.trace = trace;
        self
    }
}

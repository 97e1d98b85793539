use serde::{Deserialize, Serialize};

/// Severity of a buffered log record.
///
/// The numeric values are the bit flags used by the host logger, so a record
/// arriving as a bare `u32` can be resolved back to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Error,
    Warning,
    Info,
    Trace,
    Profile,
    ProfileBegin,
    ProfileEnd,
}

impl Level {
    pub const fn severity(self) -> u32 {
        match self {
            Level::Error => 0x01,
            Level::Warning => 0x02,
            Level::Info => 0x04,
            Level::Trace => 0x08,
            Level::Profile => 0x40,
            Level::ProfileBegin => 0x50,
            Level::ProfileEnd => 0x60,
        }
    }

    pub const fn from_severity(severity: u32) -> Option<Self> {
        match severity {
            0x01 => Some(Level::Error),
            0x02 => Some(Level::Warning),
            0x04 => Some(Level::Info),
            0x08 => Some(Level::Trace),
            0x40 => Some(Level::Profile),
            0x50 => Some(Level::ProfileBegin),
            0x60 => Some(Level::ProfileEnd),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Trace => "trace",
            Level::Profile => "profile",
            Level::ProfileBegin => "profile begin",
            Level::ProfileEnd => "profile end",
        }
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.severity()
    }
}

/// Canonical name for a numeric severity, `"unknown"` when unmapped.
pub fn level_name(severity: u32) -> &'static str {
    Level::from_severity(severity).map_or("unknown", Level::name)
}

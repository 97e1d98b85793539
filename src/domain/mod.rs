//! Domain layer for loggly-target.
//!
//! Contains the types handed over by the host logger:
//! - `LogRecord`: one buffered log line with its optional stack frames
//! - `Level`: the host's numeric severities and their canonical names

pub mod log_level;
pub mod log_record;

pub use log_level::{Level, level_name};
pub use log_record::{LogRecord, TraceFrame};

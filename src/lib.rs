#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Durations in millis fit in u64
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod app;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod formatter;
pub mod sender;
pub mod target;

pub use config::{ConfigError, TargetConfig, TargetSettings};
pub use domain::{Level, LogRecord, TraceFrame};
pub use endpoint::build_url;
pub use formatter::{FormattedEntry, MessageFormatter, RequestContext};
pub use sender::{DeliveryError, HttpTransport, Transport};
pub use target::{ExportReport, LogglyTarget, RequestFinisher};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

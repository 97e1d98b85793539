pub mod cli;
pub mod logging;

pub use cli::Cli;
pub use logging::{LogLevel, LoggingError, build_filter_string, init_tracing};

use crate::domain::LogRecord;
use crate::formatter::RequestContext;
use crate::target::{ExportReport, LogglyTarget};
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, Read};
use std::process;
use tracing::{error, info};

/// Reads whitespace or newline separated JSON records.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<LogRecord>, serde_json::Error> {
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<LogRecord>()
        .collect()
}

pub fn run(cli: &Cli) -> anyhow::Result<ExportReport> {
    let config = cli.target_config()?;
    let target = LogglyTarget::new(config).context("Invalid Loggly target configuration")?;

    let records = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            read_records(BufReader::new(file))
        }
        None => read_records(std::io::stdin().lock()),
    }
    .context("Failed to parse log records")?;

    info!(
        "Shipping {} records to {} (bulk: {})",
        records.len(),
        target.settings().base_url,
        target.settings().bulk
    );

    let context = RequestContext {
        remote_addr: cli.remote_addr,
    };
    let report = target.export(&records, &context);

    info!(
        "Export finished: {} entries, {} requests, {} failed",
        report.entries, report.requests, report.failed
    );
    Ok(report)
}

pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;

    let report = run(&cli)?;
    if !report.is_complete() {
        error!("{} of the export requests failed", report.failed);
        process::exit(1);
    }

    Ok(())
}

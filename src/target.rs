//! Export orchestration: format every buffered record and ship the batch to
//! Loggly, one request per record or a single bulk request.
//!
//! Delivery is best effort. `export` never fails; problems are logged,
//! counted in the returned [`ExportReport`] and handed to the optional error
//! hook.

use crate::config::{ConfigError, TargetConfig, TargetSettings};
use crate::domain::LogRecord;
use crate::formatter::{FormattedEntry, MessageFormatter, RequestContext};
use crate::sender::{
    DeliveryError, DeliveryStats, HttpTransport, StatsSnapshot, Transport, bulk_payload,
    entry_payload,
};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

type Connector =
    dyn Fn(&TargetSettings) -> Result<Box<dyn Transport>, DeliveryError> + Send + Sync;
type ErrorHook = dyn Fn(&DeliveryError) + Send + Sync;

/// Host capability that lets the current request complete before logs are
/// shipped, e.g. by flushing the response and releasing the client.
pub trait RequestFinisher: Send + Sync {
    fn finish_request(&self);
}

impl<F> RequestFinisher for F
where
    F: Fn() + Send + Sync,
{
    fn finish_request(&self) {
        self();
    }
}

/// Outcome of one export call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Records formatted for this flush.
    pub entries: usize,
    /// Requests that received an HTTP response.
    pub requests: usize,
    /// Requests that failed or could not be attempted.
    pub failed: usize,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

pub struct LogglyTarget {
    settings: TargetSettings,
    formatter: MessageFormatter,
    connector: Box<Connector>,
    connection: Mutex<Option<Box<dyn Transport>>>,
    finisher: Option<Box<dyn RequestFinisher>>,
    error_hook: Option<Box<ErrorHook>>,
    stats: DeliveryStats,
}

impl LogglyTarget {
    /// Validates `config` and prepares an exporter shipping over HTTPS.
    /// No connection is opened until the first export.
    pub fn new(config: TargetConfig) -> Result<Self, ConfigError> {
        Self::with_connector(config, |settings| {
            Ok(Box::new(HttpTransport::connect(settings)?) as Box<dyn Transport>)
        })
    }

    /// Like [`LogglyTarget::new`], with a custom transport factory.
    pub fn with_connector<F>(config: TargetConfig, connector: F) -> Result<Self, ConfigError>
    where
        F: Fn(&TargetSettings) -> Result<Box<dyn Transport>, DeliveryError>
            + Send
            + Sync
            + 'static,
    {
        let settings = config.validate()?;
        let formatter = MessageFormatter::new(&settings);

        debug!(
            "Loggly target ready (bulk: {}, tags: {:?})",
            settings.bulk, settings.tags
        );

        Ok(Self {
            settings,
            formatter,
            connector: Box::new(connector),
            connection: Mutex::new(None),
            finisher: None,
            error_hook: None,
            stats: DeliveryStats::new(),
        })
    }

    pub fn with_request_finisher(mut self, finisher: impl RequestFinisher + 'static) -> Self {
        self.finisher = Some(Box::new(finisher));
        self
    }

    /// Registers a callback invoked for every delivery failure.
    pub fn on_delivery_error(
        mut self,
        hook: impl Fn(&DeliveryError) + Send + Sync + 'static,
    ) -> Self {
        self.error_hook = Some(Box::new(hook));
        self
    }

    pub fn settings(&self) -> &TargetSettings {
        &self.settings
    }

    pub fn url(&self) -> &str {
        self.settings.url()
    }

    pub fn format_message(&self, record: &LogRecord, context: &RequestContext) -> FormattedEntry {
        self.formatter.format_message(record, context)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Ships `messages` in buffering order. Blocks until every request has
    /// completed or timed out.
    pub fn export(&self, messages: &[LogRecord], context: &RequestContext) -> ExportReport {
        if messages.is_empty() {
            return ExportReport::default();
        }

        if self.settings.finish_request
            && let Some(finisher) = &self.finisher
        {
            finisher.finish_request();
        }

        let entries: Vec<FormattedEntry> = messages
            .iter()
            .map(|message| self.formatter.format_message(message, context))
            .collect();
        let planned_requests = if self.settings.bulk { 1 } else { entries.len() };

        let mut failures = Vec::new();
        let mut connection = self.connection.lock();
        let report = match self.connect_if_needed(&mut connection) {
            Ok(transport) => {
                if self.settings.bulk {
                    self.send_bulk(transport, &entries, &mut failures)
                } else {
                    self.send_each(transport, &entries, &mut failures)
                }
            }
            Err(error) => {
                failures.push(error);
                ExportReport {
                    entries: entries.len(),
                    requests: 0,
                    failed: planned_requests,
                }
            }
        };
        drop(connection);

        // Hooks may call back into the target
        for error in &failures {
            self.report_failure(error);
        }

        debug!(
            "Exported {} entries in {} requests ({} failed)",
            report.entries, report.requests, report.failed
        );
        report
    }

    /// Releases the connection. Safe to call repeatedly or before any export.
    pub fn close(&self) {
        if self.connection.lock().take().is_some() {
            debug!("Closed Loggly connection");
        }
    }

    fn connect_if_needed<'a>(
        &self,
        connection: &'a mut Option<Box<dyn Transport>>,
    ) -> Result<&'a mut dyn Transport, DeliveryError> {
        let transport = match connection.take() {
            Some(transport) => transport,
            None => (self.connector)(&self.settings)?,
        };
        Ok(&mut **connection.insert(transport))
    }

    fn send_each(
        &self,
        transport: &mut dyn Transport,
        entries: &[FormattedEntry],
        failures: &mut Vec<DeliveryError>,
    ) -> ExportReport {
        let mut report = ExportReport {
            entries: entries.len(),
            ..ExportReport::default()
        };

        for entry in entries {
            let delivered = match entry_payload(entry) {
                Ok(body) => self.post(transport, body, 1, failures),
                Err(error) => {
                    failures.push(error);
                    false
                }
            };
            if delivered {
                report.requests += 1;
            } else {
                report.failed += 1;
            }
        }

        report
    }

    fn send_bulk(
        &self,
        transport: &mut dyn Transport,
        entries: &[FormattedEntry],
        failures: &mut Vec<DeliveryError>,
    ) -> ExportReport {
        let delivered = match bulk_payload(entries) {
            Ok(body) => self.post(transport, body, entries.len(), failures),
            Err(error) => {
                failures.push(error);
                false
            }
        };

        ExportReport {
            entries: entries.len(),
            requests: usize::from(delivered),
            failed: usize::from(!delivered),
        }
    }

    /// Returns whether the request got a response. The status is recorded
    /// but does not count as a failure of the export.
    fn post(
        &self,
        transport: &mut dyn Transport,
        body: String,
        entries: usize,
        failures: &mut Vec<DeliveryError>,
    ) -> bool {
        let bytes = body.len();
        let start = Instant::now();

        match transport.post(body) {
            Ok(status) => {
                let success = (200..300).contains(&status);
                self.stats
                    .record_response(success, bytes, entries, start.elapsed());
                if success {
                    debug!(
                        "Sent {} entries ({} bytes) in {:?}",
                        entries,
                        bytes,
                        start.elapsed()
                    );
                } else {
                    warn!("Loggly answered HTTP {} for {} entries", status, entries);
                }
                true
            }
            Err(error) => {
                self.stats.record_failure();
                failures.push(error);
                false
            }
        }
    }

    fn report_failure(&self, error: &DeliveryError) {
        warn!("Failed to deliver logs to Loggly: {}", error);
        if let Some(hook) = &self.error_hook {
            hook(error);
        }
    }
}

impl Drop for LogglyTarget {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LogglyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogglyTarget")
            .field("settings", &self.settings)
            .field(
                "connected",
                &self.connection.try_lock().map(|connection| connection.is_some()),
            )
            .field("stats", &self.stats)
            .finish()
    }
}

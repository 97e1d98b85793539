use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Delivery counters kept per exporter. Diagnostics only; nothing here
/// changes how exports behave.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    responses: AtomicU64,
    bytes_sent: AtomicU64,
    entries_sent: AtomicU64,
    total_response_time: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub bytes_sent: u64,
    pub entries_sent: u64,
    pub average_response_time: Duration,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request that got an HTTP response, whatever its status.
    pub fn record_response(
        &self,
        success: bool,
        bytes: usize,
        entries: usize,
        response_time: Duration,
    ) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.responses.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
            self.entries_sent.fetch_add(entries as u64, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A request that never got a response (connect error, timeout, ...).
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let responses = self.responses.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if responses > 0 {
            Duration::from_millis(total_response_time / responses)
        } else {
            Duration::ZERO
        };

        StatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            entries_sent: self.entries_sent.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

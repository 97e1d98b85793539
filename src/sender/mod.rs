pub mod payload;
pub mod stats;
pub mod transport;

pub use payload::{bulk_payload, entry_payload};
pub use stats::{DeliveryStats, StatsSnapshot};
pub use transport::{DeliveryError, HttpTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub uptime_seconds: u64,
    pub uploads_accepted: u64,
    pub uploads_rejected: u64,
    pub store_failures: u64,
    pub publish_failures: u64,
    pub bytes_stored: u64,
    pub predictions_served: u64,
    pub prediction_failures: u64,
}

pub struct MetricsCollector {
    start_time: Instant,
    uploads_accepted: AtomicU64,
    uploads_rejected: AtomicU64,
    store_failures: AtomicU64,
    publish_failures: AtomicU64,
    bytes_stored: AtomicU64,
    predictions_served: AtomicU64,
    prediction_failures: AtomicU64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            uploads_accepted: AtomicU64::new(0),
            uploads_rejected: AtomicU64::new(0),
            store_failures: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            bytes_stored: AtomicU64::new(0),
            predictions_served: AtomicU64::new(0),
            prediction_failures: AtomicU64::new(0),
        }
    }

    pub fn record_upload(&self, bytes: u64) {
        self.uploads_accepted.fetch_add(1, Ordering::Relaxed);
        self.bytes_stored.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction_failure(&self) {
        self.prediction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_metrics(&self) -> Metrics {
        Metrics {
            uptime_seconds: self.uptime_seconds(),
            uploads_accepted: self.uploads_accepted.load(Ordering::Relaxed),
            uploads_rejected: self.uploads_rejected.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            bytes_stored: self.bytes_stored.load(Ordering::Relaxed),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            prediction_failures: self.prediction_failures.load(Ordering::Relaxed),
        }
    }
}

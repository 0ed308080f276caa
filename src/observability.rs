//! Counter metrics for the loader

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording loader activity per slot binding
#[derive(Debug, Default)]
pub struct Metrics {
    fetches_started: AtomicU64,
    fetches_superseded: AtomicU64,
    fetches_cancelled: AtomicU64,
    fetches_failed: AtomicU64,
    images_applied: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetches_started", "Metric incremented");
    }

    pub fn fetch_superseded(&self) {
        self.fetches_superseded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetches_superseded", "Metric incremented");
    }

    pub fn fetch_cancelled(&self) {
        self.fetches_cancelled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetches_cancelled", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetches_failed", "Metric incremented");
    }

    pub fn image_applied(&self) {
        self.images_applied.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "images_applied", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            fetches_superseded: self.fetches_superseded.load(Ordering::Relaxed),
            fetches_cancelled: self.fetches_cancelled.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            images_applied: self.images_applied.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub fetches_started: u64,
    pub fetches_superseded: u64,
    pub fetches_cancelled: u64,
    pub fetches_failed: u64,
    pub images_applied: u64,
}

//! Pass counters for the tile plane cache.
//!
//! Lock-free atomic counters updated from fetch completions, read through a
//! point-in-time [`PlaneMetricsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing population passes.
#[derive(Debug, Default)]
pub struct PlaneMetrics {
    passes_started: AtomicU64,
    passes_superseded: AtomicU64,
    fetches_succeeded: AtomicU64,
    fetches_failed: AtomicU64,
    projection_fallbacks: AtomicU64,
}

impl PlaneMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pass_started(&self) {
        self.passes_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn pass_superseded(&self) {
        self.passes_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch_succeeded(&self) {
        self.fetches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn projection_fallback(&self) {
        self.projection_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> PlaneMetricsSnapshot {
        PlaneMetricsSnapshot {
            passes_started: self.passes_started.load(Ordering::Relaxed),
            passes_superseded: self.passes_superseded.load(Ordering::Relaxed),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            projection_fallbacks: self.projection_fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PlaneMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaneMetricsSnapshot {
    /// Population passes begun, including superseding ones.
    pub passes_started: u64,
    /// Re-center requests that arrived while a pass was in flight.
    pub passes_superseded: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    /// Slots whose coordinate fell off the map.
    pub projection_fallbacks: u64,
}

impl PlaneMetricsSnapshot {
    /// Slots resolved to the fallback image for any reason.
    pub fn fallbacks(&self) -> u64 {
        self.fetches_failed + self.projection_fallbacks
    }
}

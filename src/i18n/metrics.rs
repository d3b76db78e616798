//! Lookup metrics and observability.
//!
//! Each registry owns its own counters so independent registries (and tests
//! running in parallel) never share state.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for lookups and producer resolutions.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Lookups answered by the active locale itself
    direct_hits: AtomicUsize,

    /// Lookups answered by a parent locale or the fallback locale
    fallback_hits: AtomicUsize,

    /// Lookups no locale could answer
    misses: AtomicUsize,

    /// Producers that yielded a tree
    resolutions: AtomicUsize,

    /// Producers that failed
    resolution_failures: AtomicUsize,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup answered by the active locale.
    pub fn record_direct_hit(&self) {
        self.direct_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup answered further down the locale chain.
    pub fn record_fallback_hit(&self) {
        self.fallback_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an unresolved lookup.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful producer run.
    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed producer run.
    pub fn record_resolution_failure(&self) {
        self.resolution_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn direct_hits(&self) -> usize {
        self.direct_hits.load(Ordering::Relaxed)
    }

    pub fn fallback_hits(&self) -> usize {
        self.fallback_hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn resolution_failures(&self) -> usize {
        self.resolution_failures.load(Ordering::Relaxed)
    }

    /// Snapshot the counters.
    pub fn report(&self) -> MetricsReport {
        let direct = self.direct_hits();
        let fallback = self.fallback_hits();
        let misses = self.misses();
        let total = direct + fallback + misses;
        let hit_rate = if total > 0 {
            ((direct + fallback) as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            direct_hits: direct,
            fallback_hits: fallback,
            misses,
            hit_rate,
            resolutions: self.resolutions(),
            resolution_failures: self.resolution_failures(),
        }
    }
}

/// Point-in-time view of a registry's metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub direct_hits: usize,
    pub fallback_hits: usize,
    pub misses: usize,

    /// Share of lookups that found a string, as a percentage (0-100)
    pub hit_rate: f64,

    pub resolutions: usize,
    pub resolution_failures: usize,
}

//! Counters for compilation and validation
//!
//! - Counters only, monotonic, reset on process start
//! - Relaxed atomics; exact totals, no ordering between counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    compilations: AtomicU64,
    compile_failures: AtomicU64,
    cache_hits: AtomicU64,
    validations_accepted: AtomicU64,
    validations_rejected: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_compilations(&self) {
        self.compilations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_compile_failures(&self) {
        self.compile_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validations_accepted(&self) {
        self.validations_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validations_rejected(&self) {
        self.validations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            compilations: self.compilations.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            validations_accepted: self.validations_accepted.load(Ordering::Relaxed),
            validations_rejected: self.validations_rejected.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub compilations: u64,
    pub compile_failures: u64,
    pub cache_hits: u64,
    pub validations_accepted: u64,
    pub validations_rejected: u64,
}

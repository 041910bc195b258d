use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared between probe tasks and whoever displays them.
#[derive(Debug, Default)]
pub struct ScanProgress {
    total: AtomicU64,
    completed: AtomicU64,
    found: AtomicU64,
    measured: AtomicU64,
}

/// A consistent-enough copy of the counters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub completed: u64,
    pub found: u64,
    pub measured: u64,
}

impl ScanProgress {
    pub fn new(total: u64) -> Self {
        let progress = Self::default();
        progress.total.store(total, Ordering::Relaxed);
        progress
    }

    pub fn record_probe(&self, found: bool) {
        if found {
            self.found.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_measurement(&self) {
        self.measured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            found: self.found.load(Ordering::Relaxed),
            measured: self.measured.load(Ordering::Relaxed),
        }
    }
}

impl ProgressSnapshot {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

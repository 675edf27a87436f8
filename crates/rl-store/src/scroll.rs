//! Infinite-scroll signalling

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives the outcome of each page load
pub trait ScrollController: Send + Sync {
    /// A page was appended; more may follow
    fn loaded(&self);

    /// No further pages exist for the current filters
    fn complete(&self);
}

/// Counts the signals it receives
#[derive(Debug, Default)]
pub struct ScrollCounter {
    loaded: AtomicUsize,
    complete: AtomicUsize,
}

impl ScrollCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn complete_count(&self) -> usize {
        self.complete.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.complete_count() > 0
    }
}

impl ScrollController for ScrollCounter {
    fn loaded(&self) {
        self.loaded.fetch_add(1, Ordering::SeqCst);
    }

    fn complete(&self) {
        self.complete.fetch_add(1, Ordering::SeqCst);
    }
}

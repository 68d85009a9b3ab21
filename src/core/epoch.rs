//! Monotonic epoch counter for cancelling stale background work.
//!
//! Work is tagged with the epoch current at scheduling time. Bumping the
//! epoch (feed refresh, window teardown) makes every earlier tag stale: the
//! job is skipped if it has not started, and its result is dropped if it has.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared epoch counter
#[derive(Debug, Clone, Default)]
pub struct Epoch {
    current: Arc<AtomicU64>,
    name: &'static str,
}

impl Epoch {
    pub fn new(name: &'static str) -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            name,
        }
    }

    /// Increment epoch and return new value
    pub fn bump(&self) -> u64 {
        let next = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("{} epoch -> {}", self.name, next);
        next
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.current() == epoch
    }

    /// Wrap a job so it only runs if `epoch` is still current when a worker
    /// picks it up.
    pub fn guard<F>(&self, epoch: u64, f: F) -> Box<dyn FnOnce() + Send + 'static>
    where
        F: FnOnce() + Send + 'static,
    {
        let current = Arc::clone(&self.current);
        Box::new(move || {
            if current.load(Ordering::Acquire) == epoch {
                f();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_bump() {
        let epoch = Epoch::new("test");
        assert_eq!(epoch.current(), 0);
        assert_eq!(epoch.bump(), 1);
        assert_eq!(epoch.bump(), 2);
        assert!(epoch.is_current(2));
        assert!(!epoch.is_current(1));
    }

    #[test]
    fn test_clone_shares_counter() {
        let epoch = Epoch::new("test");
        let other = epoch.clone();
        other.bump();
        assert_eq!(epoch.current(), 1);
    }

    #[test]
    fn test_guard_skips_stale_job() {
        let epoch = Epoch::new("test");
        let ran = Arc::new(AtomicBool::new(false));

        let r = Arc::clone(&ran);
        let job = epoch.guard(epoch.current(), move || r.store(true, Ordering::SeqCst));
        epoch.bump();
        job();
        assert!(!ran.load(Ordering::SeqCst));

        let r = Arc::clone(&ran);
        let job = epoch.guard(epoch.current(), move || r.store(true, Ordering::SeqCst));
        job();
        assert!(ran.load(Ordering::SeqCst));
    }
}

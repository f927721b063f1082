use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

/// Count of units of work completed by one logical workload.
///
/// Threads cooperating on the same job share one counter; it only ever goes up, and it never
/// goes past the limit the job was given.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    value: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.value.load(SeqCst)
    }

    pub fn reached(&self, limit: usize) -> bool {
        self.get() >= limit
    }

    /// Record one completed unit, unless `limit` units are already recorded.
    /// Returns `true` if the unit was counted.
    pub fn try_claim(&self, limit: usize) -> bool {
        self.value
            .fetch_update(SeqCst, SeqCst, |v| if v < limit { Some(v + 1) } else { None })
            .is_ok()
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the activity counters of a [`SharedArrayPool`](crate::SharedArrayPool).
///
/// **Note**: The counters are updated with relaxed atomics. A snapshot taken
/// while other threads use the pool may be slightly inconsistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful `rent` calls.
    pub rented: u64,
    /// Rentals satisfied by an idle pooled array.
    pub reused: u64,
    /// Rentals that required a fresh allocation.
    pub allocated: u64,
    /// Arrays accepted back into a bucket.
    pub returned: u64,
    /// Returned arrays that were dropped instead of pooled.
    pub discarded: u64,
}

#[derive(Default)]
pub(crate) struct StatsCounters {
    rented: AtomicU64,
    reused: AtomicU64,
    allocated: AtomicU64,
    returned: AtomicU64,
    discarded: AtomicU64,
}

impl StatsCounters {
    #[inline]
    pub fn on_reuse(&self) {
        self.rented.fetch_add(1, Ordering::Relaxed);
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_allocate(&self) {
        self.rented.fetch_add(1, Ordering::Relaxed);
        self.allocated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_empty_rent(&self) {
        self.rented.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_return(&self) {
        self.returned.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            rented: self.rented.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

//! `SharedArrayPool`: a thread-safe pool of zero-initialized arrays.
//!
//! Arrays are kept in buckets keyed by power-of-two length, starting at
//! [`MIN_ARRAY_LENGTH`]. A rent request is rounded up to the next bucket
//! length and served from that bucket if an idle array is available,
//! otherwise a fresh array of exactly the bucket length is allocated.
//! Requests longer than [`PoolConfig::max_array_length`] bypass the buckets
//! entirely.

use std::sync::{Mutex, PoisonError};

use scratch_common::{Result, error::Error};

use crate::{
    ArrayPool, PoolConfig, PoolStats,
    config::MIN_ARRAY_LENGTH,
    stats::StatsCounters,
};

/// Thread-safe pool of reusable arrays.
///
/// # Thread Safety
///
/// The pool can be shared across threads (for example behind an `Arc` or in a
/// `static`). Each length bucket is protected by its own mutex, so renters of
/// different sizes do not contend.
pub struct SharedArrayPool<T> {
    /// Idle arrays, one stack per bucket. Bucket `i` holds arrays of length
    /// `MIN_ARRAY_LENGTH << i`.
    buckets: Box<[Mutex<Vec<Vec<T>>>]>,
    config: PoolConfig,
    stats: StatsCounters,
}

impl<T> SharedArrayPool<T>
where
    T: bytemuck::Zeroable + Copy,
{
    /// Creates a new empty pool with the default configuration.
    pub fn new() -> Self {
        Self::make(PoolConfig::default())
    }

    /// Creates a new empty pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if the configuration is invalid.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::make(config))
    }

    fn make(config: PoolConfig) -> Self {
        let buckets = (0..config.bucket_count())
            .map(|_| Mutex::new(Vec::new()))
            .collect();
        SharedArrayPool {
            buckets,
            config,
            stats: StatsCounters::default(),
        }
    }

    /// Returns the configuration this pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns a snapshot of the pool activity counters.
    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot()
    }

    /// Returns the total number of idle arrays currently held by the pool.
    pub fn pooled_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Drops every idle array held by the pool.
    pub fn trim(&self) {
        for bucket in self.buckets.iter() {
            bucket
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    /// Index of the bucket serving requests of `min_len` elements, or `None`
    /// when the request is longer than the pool retains.
    #[inline]
    fn bucket_for_request(&self, min_len: usize) -> Option<usize> {
        if min_len > self.config.max_array_length {
            return None;
        }
        let len = min_len.max(MIN_ARRAY_LENGTH).next_power_of_two();
        Some((len.trailing_zeros() - MIN_ARRAY_LENGTH.trailing_zeros()) as usize)
    }

    /// Index of the bucket an array of exactly `len` elements belongs to.
    #[inline]
    fn bucket_for_array(&self, len: usize) -> Option<usize> {
        let max = self.config.max_array_length;
        if len < MIN_ARRAY_LENGTH || len > max || !len.is_power_of_two() {
            return None;
        }
        Some((len.trailing_zeros() - MIN_ARRAY_LENGTH.trailing_zeros()) as usize)
    }

    fn allocate(len: usize) -> Result<Vec<T>> {
        let mut array = Vec::new();
        array
            .try_reserve_exact(len)
            .map_err(|e| Error::allocation_failure(len, e.to_string()))?;
        array.resize(len, T::zeroed());
        Ok(array)
    }
}

impl<T> ArrayPool<T> for SharedArrayPool<T>
where
    T: bytemuck::Zeroable + Copy,
{
    fn rent(&self, min_len: usize) -> Result<Vec<T>> {
        if min_len == 0 {
            self.stats.on_empty_rent();
            return Ok(Vec::new());
        }

        let Some(index) = self.bucket_for_request(min_len) else {
            log::debug!(
                "array pool: request for {min_len} exceeds max length {}, allocating unpooled",
                self.config.max_array_length
            );
            let array = Self::allocate(min_len)?;
            self.stats.on_allocate();
            return Ok(array);
        };

        let idle = self.buckets[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match idle {
            Some(array) => {
                log::trace!(
                    "array pool: reusing array of {} for request of {min_len}",
                    array.len()
                );
                self.stats.on_reuse();
                Ok(array)
            }
            None => {
                let len = MIN_ARRAY_LENGTH << index;
                log::trace!("array pool: allocating array of {len} for request of {min_len}");
                let array = Self::allocate(len)?;
                self.stats.on_allocate();
                Ok(array)
            }
        }
    }

    fn return_array(&self, mut array: Vec<T>, clear: bool) {
        let Some(index) = self.bucket_for_array(array.len()) else {
            if !array.is_empty() {
                log::debug!(
                    "array pool: discarding returned array of foreign length {}",
                    array.len()
                );
                self.stats.on_discard();
            }
            return;
        };

        if clear {
            array.fill(T::zeroed());
        }

        let mut bucket = self.buckets[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if bucket.len() < self.config.max_arrays_per_bucket {
            bucket.push(array);
            drop(bucket);
            log::trace!("array pool: returned array to bucket {index}");
            self.stats.on_return();
        } else {
            drop(bucket);
            log::debug!("array pool: bucket {index} is full, discarding returned array");
            self.stats.on_discard();
        }
    }
}

impl<T> Default for SharedArrayPool<T>
where
    T: bytemuck::Zeroable + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SharedArrayPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedArrayPool")
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

//! Pool configuration.

use scratch_common::{Result, verify_arg};
use serde::{Deserialize, Serialize};

/// Shortest array length kept by a [`SharedArrayPool`](crate::SharedArrayPool).
/// Smaller requests are rounded up to this length.
pub const MIN_ARRAY_LENGTH: usize = 16;

/// Default upper bound on the length of pooled arrays. Longer requests are
/// served by a dedicated allocation that is dropped on return.
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 1 << 20;

/// Default number of idle arrays retained per length bucket.
pub const DEFAULT_MAX_ARRAYS_PER_BUCKET: usize = 32;

/// Configuration for [`SharedArrayPool`](crate::SharedArrayPool) construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Longest array length (in elements) the pool retains.
    /// Must be a power of two no smaller than [`MIN_ARRAY_LENGTH`].
    pub max_array_length: usize,
    /// Maximum number of idle arrays kept in each bucket.
    pub max_arrays_per_bucket: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            max_arrays_per_bucket: DEFAULT_MAX_ARRAYS_PER_BUCKET,
        }
    }
}

impl PoolConfig {
    /// Validates the configuration and returns an `InvalidArgument` error if invalid.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(
            max_array_length,
            self.max_array_length.is_power_of_two()
        );
        verify_arg!(
            max_array_length,
            self.max_array_length >= MIN_ARRAY_LENGTH
        );
        verify_arg!(max_arrays_per_bucket, self.max_arrays_per_bucket > 0);
        Ok(())
    }

    /// Number of length buckets implied by `max_array_length`.
    pub(crate) fn bucket_count(&self) -> usize {
        (self.max_array_length.trailing_zeros() - MIN_ARRAY_LENGTH.trailing_zeros()) as usize + 1
    }
}

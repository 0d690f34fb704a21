//! Threshold policy deciding where a scratch buffer should live.
//!
//! Two independent questions are answered here:
//!
//! - [`may_stack_allocate`]: is a region of `count` elements small enough to be
//!   placed on the caller's stack frame without risking overflow?
//! - [`should_rent_from_pool`]: is `count` large enough that renting from the
//!   pool pays for its fixed overhead?
//!
//! The answers are not complements of each other. Small counts may need
//! neither (a fixed inline reservation covers them), and there is a range
//! where the stack is legal but the pool is still preferred.

use scratch_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

/// Maximum number of bytes a single scratch buffer may occupy on the stack.
pub const STACK_BYTE_BUDGET: usize = 1024;

/// Maximum number of elements a single scratch buffer may hold on the stack,
/// regardless of the element size. Guards against tiny (or zero-sized)
/// element types paired with huge counts.
pub const STACK_ELEMENT_CEILING: usize = 512;

/// Element count from which renting from the pool is preferred.
pub const POOL_RENTAL_THRESHOLD: usize = 128;

/// Upper bound accepted for [`BufferPolicy::stack_byte_budget`].
pub const MAX_STACK_BYTE_BUDGET: usize = 64 * 1024;

/// Tuning constants of the threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferPolicy {
    /// Stack budget in bytes, see [`STACK_BYTE_BUDGET`].
    pub stack_byte_budget: usize,
    /// Stack budget in elements, see [`STACK_ELEMENT_CEILING`].
    pub stack_element_ceiling: usize,
    /// Pool rental threshold in elements, see [`POOL_RENTAL_THRESHOLD`].
    pub pool_rental_threshold: usize,
}

impl BufferPolicy {
    pub const DEFAULT: BufferPolicy = BufferPolicy {
        stack_byte_budget: STACK_BYTE_BUDGET,
        stack_element_ceiling: STACK_ELEMENT_CEILING,
        pool_rental_threshold: POOL_RENTAL_THRESHOLD,
    };

    /// Returns whether `count` elements of `T` fit the stack budget.
    ///
    /// Always `true` for `count == 0`. Monotonic: once `false` for some count,
    /// it is `false` for every larger count.
    #[inline]
    pub const fn may_stack_allocate<T>(&self, count: usize) -> bool {
        if count > self.stack_element_ceiling {
            return false;
        }
        match count.checked_mul(std::mem::size_of::<T>()) {
            Some(bytes) => bytes <= self.stack_byte_budget,
            None => false,
        }
    }

    /// Largest element count of `T` accepted by [`BufferPolicy::may_stack_allocate`].
    ///
    /// Callers sizing a fixed stack region can use this as its upper bound.
    #[inline]
    pub const fn max_stack_elements<T>(&self) -> usize {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return self.stack_element_ceiling;
        }
        let by_budget = self.stack_byte_budget / size;
        if by_budget < self.stack_element_ceiling {
            by_budget
        } else {
            self.stack_element_ceiling
        }
    }

    /// Returns whether a buffer of `count` elements should be rented from the pool
    /// when the caller has not reserved stack space.
    #[inline]
    pub const fn should_rent_from_pool(&self, count: usize) -> bool {
        count >= self.pool_rental_threshold
    }

    /// Same as [`BufferPolicy::may_stack_allocate`], for counts of any integer type.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if `count` is negative or does not fit `usize`.
    pub fn try_may_stack_allocate<T>(&self, count: impl TryInto<usize>) -> Result<bool> {
        Ok(self.may_stack_allocate::<T>(element_count(count)?))
    }

    /// Same as [`BufferPolicy::should_rent_from_pool`], for counts of any integer type.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if `count` is negative or does not fit `usize`.
    pub fn try_should_rent_from_pool(&self, count: impl TryInto<usize>) -> Result<bool> {
        Ok(self.should_rent_from_pool(element_count(count)?))
    }

    /// Validates the policy and returns an `InvalidArgument` error if invalid.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(
            stack_byte_budget,
            self.stack_byte_budget <= MAX_STACK_BYTE_BUDGET
        );
        verify_arg!(pool_rental_threshold, self.pool_rental_threshold > 0);
        Ok(())
    }
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`BufferPolicy::may_stack_allocate`] under the default policy.
#[inline]
pub const fn may_stack_allocate<T>(count: usize) -> bool {
    BufferPolicy::DEFAULT.may_stack_allocate::<T>(count)
}

/// [`BufferPolicy::should_rent_from_pool`] under the default policy.
#[inline]
pub const fn should_rent_from_pool(count: usize) -> bool {
    BufferPolicy::DEFAULT.should_rent_from_pool(count)
}

/// Converts a caller-supplied element count to `usize`.
///
/// Negative counts are rejected rather than clamped.
#[inline]
pub fn element_count(count: impl TryInto<usize>) -> Result<usize> {
    count
        .try_into()
        .map_err(|_| Error::invalid_arg("count", "must be a non-negative element count"))
}

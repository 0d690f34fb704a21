//! `ArrayPool`: the contract between scratch buffers and the storage they rent.

use std::sync::Arc;

use scratch_common::Result;

/// A source of reusable arrays.
///
/// Implementations must be safe to call concurrently from independent owners;
/// any internal locking or retry policy is the pool's own business.
pub trait ArrayPool<T> {
    /// Rents an array holding at least `min_len` initialized elements.
    ///
    /// The returned array may be longer than requested. Callers are expected to
    /// hand it back through [`ArrayPool::return_array`] unchanged in length.
    ///
    /// # Errors
    ///
    /// Returns an `AllocationFailure` error when the request cannot be satisfied.
    fn rent(&self, min_len: usize) -> Result<Vec<T>>;

    /// Returns a previously rented array to the pool.
    ///
    /// When `clear` is `true` the pool overwrites the contents before the array
    /// can be handed to another renter. This call never fails: arrays the pool
    /// does not want to keep are simply dropped.
    fn return_array(&self, array: Vec<T>, clear: bool);
}

impl<T, P> ArrayPool<T> for &P
where
    P: ArrayPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, min_len: usize) -> Result<Vec<T>> {
        (**self).rent(min_len)
    }

    #[inline]
    fn return_array(&self, array: Vec<T>, clear: bool) {
        (**self).return_array(array, clear)
    }
}

impl<T, P> ArrayPool<T> for Arc<P>
where
    P: ArrayPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, min_len: usize) -> Result<Vec<T>> {
        (**self).rent(min_len)
    }

    #[inline]
    fn return_array(&self, array: Vec<T>, clear: bool) {
        (**self).return_array(array, clear)
    }
}

impl<T, P> ArrayPool<T> for Box<P>
where
    P: ArrayPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, min_len: usize) -> Result<Vec<T>> {
        (**self).rent(min_len)
    }

    #[inline]
    fn return_array(&self, array: Vec<T>, clear: bool) {
        (**self).return_array(array, clear)
    }
}

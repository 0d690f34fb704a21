//! `ScratchBuffer`: exclusive owner of a temporary buffer.
//!
//! A scratch buffer either borrows a region of the caller's stack frame or
//! rents an array from an [`ArrayPool`]. In both cases the caller sees the same
//! `&mut [T]` view of exactly the requested length. Rented arrays go back to
//! their pool exactly once: on the first [`ScratchBuffer::release`] call, or
//! when the buffer is dropped.

use std::{
    borrow::{Borrow, BorrowMut},
    fmt,
    marker::PhantomData,
};

use scratch_array_pool::ArrayPool;
use scratch_common::{Result, error::Error};

use crate::policy::{BufferPolicy, element_count};

/// The storage strategy chosen for a [`ScratchBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// The buffer is a region of the caller's stack frame.
    Stack,
    /// The buffer is an array rented from a pool.
    Rented,
}

enum Storage<'a, T, P: ?Sized> {
    /// Non-owning view into caller storage, already trimmed to the buffer length.
    Stack(&'a mut [T]),
    /// Owned array rented from `pool`; may be longer than the buffer.
    Rented { array: Vec<T>, pool: &'a P },
    Released,
}

/// Exclusive owner of a fixed-length temporary buffer.
///
/// The buffer is move-only: it cannot be cloned, so a rented array is never
/// referenced by two owners. It is neither `Send` nor `Sync`.
///
/// ```compile_fail
/// use scratch_buffer::{ScratchBuffer, SharedArrayPool};
///
/// let pool = SharedArrayPool::<u32>::new();
/// let buffer = ScratchBuffer::acquire(1000, None, &pool).unwrap();
/// let copy = buffer.clone();
/// ```
///
/// ```compile_fail
/// use scratch_buffer::{ScratchBuffer, SharedArrayPool};
///
/// static POOL: std::sync::LazyLock<SharedArrayPool<u32>> =
///     std::sync::LazyLock::new(SharedArrayPool::new);
///
/// let buffer = ScratchBuffer::acquire(1000, None, &*POOL).unwrap();
/// std::thread::spawn(move || drop(buffer));
/// ```
///
/// ```compile_fail
/// use scratch_buffer::{ScratchBuffer, SharedArrayPool};
///
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<ScratchBuffer<'static, u32, SharedArrayPool<u32>>>();
/// ```
///
/// # Storage kind
///
/// A zero-length buffer needs no storage: it never calls the pool and reports
/// [`StorageKind::Stack`] over an empty slice, whether or not a region was lent.
///
/// # Lifetime
///
/// The lifetime `'a` covers both the caller's stack region (if any) and the
/// pool. The borrow checker prevents the buffer from outliving either.
pub struct ScratchBuffer<'a, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    storage: Storage<'a, T, P>,
    len: usize,
    clear_on_release: bool,
    _not_send: PhantomData<*mut ()>,
}

impl<'a, T, P> ScratchBuffer<'a, T, P>
where
    T: bytemuck::Zeroable + Copy,
    P: ArrayPool<T> + ?Sized,
{
    /// Acquires a buffer of `count` elements under the default [`BufferPolicy`].
    ///
    /// See [`ScratchBuffer::acquire_with`].
    pub fn acquire(
        count: impl TryInto<usize>,
        stack: Option<&'a mut [T]>,
        pool: &'a P,
    ) -> Result<Self> {
        Self::acquire_with(&BufferPolicy::DEFAULT, count, stack, pool)
    }

    /// Acquires a buffer of `count` elements.
    ///
    /// If `stack` is supplied, holds at least `count` elements and `policy`
    /// allows `count` elements of `T` on the stack, the buffer wraps the first
    /// `count` elements of that region. Otherwise an array is rented from
    /// `pool`. An absent or undersized region is not an error; it just forces
    /// the pool path.
    ///
    /// A zero-length buffer needs no storage, never touches the pool and
    /// reports [`StorageKind::Stack`].
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `count` is negative; the pool is not called.
    /// - `AllocationFailure` if the pool cannot supply the array.
    pub fn acquire_with(
        policy: &BufferPolicy,
        count: impl TryInto<usize>,
        stack: Option<&'a mut [T]>,
        pool: &'a P,
    ) -> Result<Self> {
        let count = element_count(count)?;
        if count == 0 {
            return Ok(Self::new(Storage::Stack(&mut []), 0));
        }
        if let Some(region) = stack {
            if count <= region.len() && policy.may_stack_allocate::<T>(count) {
                log::trace!("scratch buffer: {count} elements on the stack");
                return Ok(Self::new(Storage::Stack(&mut region[..count]), count));
            }
            log::trace!(
                "scratch buffer: stack region of {} rejected for {count} elements",
                region.len()
            );
        }
        Self::rent_exact(count, pool)
    }

    /// Acquires a buffer of `count` elements rented from `pool`.
    ///
    /// A zero count is the exception: the pool is not called and the empty
    /// buffer reports [`StorageKind::Stack`].
    ///
    /// # Errors
    ///
    /// Same as [`ScratchBuffer::acquire_with`].
    pub fn rent(count: impl TryInto<usize>, pool: &'a P) -> Result<Self> {
        let count = element_count(count)?;
        if count == 0 {
            return Ok(Self::new(Storage::Stack(&mut []), 0));
        }
        Self::rent_exact(count, pool)
    }

    fn rent_exact(count: usize, pool: &'a P) -> Result<Self> {
        let array = pool.rent(count)?;
        if array.len() < count {
            let actual = array.len();
            pool.return_array(array, false);
            log::warn!("scratch buffer: pool returned {actual} elements for a request of {count}");
            return Err(Error::allocation_failure(
                count,
                format!("pool returned an array of {actual} elements"),
            ));
        }
        log::trace!(
            "scratch buffer: {count} elements rented (array length {})",
            array.len()
        );
        Ok(Self::new(Storage::Rented { array, pool }, count))
    }
}

impl<'a, T, P> ScratchBuffer<'a, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    /// Wraps the whole of a caller-reserved region, bypassing the policy.
    pub fn from_stack(region: &'a mut [T]) -> Self {
        let len = region.len();
        Self::new(Storage::Stack(region), len)
    }

    fn new(storage: Storage<'a, T, P>, len: usize) -> Self {
        ScratchBuffer {
            storage,
            len,
            clear_on_release: false,
            _not_send: PhantomData,
        }
    }

    /// Requests that a rented array be wiped by the pool when it is returned.
    /// Has no effect on stack buffers.
    pub fn set_clear_on_release(&mut self, clear: bool) {
        self.clear_on_release = clear;
    }

    /// Builder form of [`ScratchBuffer::set_clear_on_release`].
    pub fn with_clear_on_release(mut self, clear: bool) -> Self {
        self.set_clear_on_release(clear);
        self
    }

    /// Number of usable elements; 0 once released.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The storage strategy in use, or `None` once released.
    #[inline]
    pub fn storage_kind(&self) -> Option<StorageKind> {
        match self.storage {
            Storage::Stack(_) => Some(StorageKind::Stack),
            Storage::Rented { .. } => Some(StorageKind::Rented),
            Storage::Released => None,
        }
    }

    #[inline]
    pub fn is_stack(&self) -> bool {
        matches!(self.storage, Storage::Stack(_))
    }

    #[inline]
    pub fn is_rented(&self) -> bool {
        matches!(self.storage, Storage::Rented { .. })
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    /// Returns the buffer contents.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Stack(region) => region,
            Storage::Rented { array, .. } => &array[..self.len],
            Storage::Released => &[],
        }
    }

    /// Returns the buffer contents as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Stack(region) => region,
            Storage::Rented { array, .. } => &mut array[..self.len],
            Storage::Released => &mut [],
        }
    }

    /// Mutable view of exactly [`len`](ScratchBuffer::len) elements.
    /// Empty once the buffer is released.
    #[inline]
    pub fn view(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }

    /// Releases the storage.
    ///
    /// The first call hands a rented array back to its pool and leaves the
    /// buffer empty. Later calls do nothing.
    pub fn release(&mut self) {
        let storage = std::mem::replace(&mut self.storage, Storage::Released);
        self.len = 0;
        if let Storage::Rented { array, pool } = storage {
            log::trace!(
                "scratch buffer: returning array of {} (clear: {})",
                array.len(),
                self.clear_on_release
            );
            pool.return_array(array, self.clear_on_release);
        }
    }
}

impl<T, P> Drop for ScratchBuffer<'_, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, P> AsRef<[T]> for ScratchBuffer<'_, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P> AsMut<[T]> for ScratchBuffer<'_, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, P> Borrow<[T]> for ScratchBuffer<'_, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P> BorrowMut<[T]> for ScratchBuffer<'_, T, P>
where
    P: ArrayPool<T> + ?Sized,
{
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, P, Q> PartialEq<ScratchBuffer<'_, T, Q>> for ScratchBuffer<'_, T, P>
where
    T: PartialEq,
    P: ArrayPool<T> + ?Sized,
    Q: ArrayPool<T> + ?Sized,
{
    fn eq(&self, other: &ScratchBuffer<'_, T, Q>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, P> PartialEq<[T]> for ScratchBuffer<'_, T, P>
where
    T: PartialEq,
    P: ArrayPool<T> + ?Sized,
{
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T, P> PartialEq<&[T]> for ScratchBuffer<'_, T, P>
where
    T: PartialEq,
    P: ArrayPool<T> + ?Sized,
{
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, P> fmt::Debug for ScratchBuffer<'_, T, P>
where
    T: fmt::Debug,
    P: ArrayPool<T> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("kind", &self.storage_kind())
            .field("len", &self.len)
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use scratch_array_pool::SharedArrayPool;

    use super::*;
    use crate::stack::stack_region;

    #[test]
    fn test_stack_branch() {
        let pool = SharedArrayPool::<u32>::new();
        let mut region = stack_region::<u32, 64>();
        let mut buffer = ScratchBuffer::acquire(10, Some(&mut region), &pool).unwrap();
        assert!(buffer.is_stack());
        assert_eq!(buffer.storage_kind(), Some(StorageKind::Stack));
        assert_eq!(buffer.view().len(), 10);
        buffer.view().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(buffer, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10][..]);
        drop(buffer);
        assert_eq!(&region[..3], &[1, 2, 3]);
        assert_eq!(pool.stats().rented, 0);
    }

    #[test]
    fn test_rented_branch_hides_excess() {
        let pool = SharedArrayPool::<u16>::new();
        let mut buffer = ScratchBuffer::acquire(20, None, &pool).unwrap();
        assert!(buffer.is_rented());
        assert_eq!(buffer.len(), 20);
        assert_eq!(buffer.view().len(), 20);
        assert_eq!(buffer.as_slice().len(), 20);
        drop(buffer);
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn test_undersized_region_forces_pool() {
        let pool = SharedArrayPool::<u8>::new();
        let mut region = stack_region::<u8, 8>();
        let buffer = ScratchBuffer::acquire(9, Some(&mut region), &pool).unwrap();
        assert!(buffer.is_rented());
        assert_eq!(buffer.len(), 9);
    }

    #[test]
    fn test_over_budget_region_forces_pool() {
        let pool = SharedArrayPool::<u64>::new();
        let mut region = vec![0u64; 1024];
        let buffer = ScratchBuffer::acquire(512, Some(&mut region[..]), &pool).unwrap();
        assert!(buffer.is_rented());

        let policy = BufferPolicy {
            stack_byte_budget: 8 * 1024,
            ..BufferPolicy::DEFAULT
        };
        drop(buffer);
        let buffer =
            ScratchBuffer::acquire_with(&policy, 512, Some(&mut region[..]), &pool).unwrap();
        assert!(buffer.is_stack());
    }

    #[test]
    fn test_zero_length() {
        let pool = SharedArrayPool::<u32>::new();
        let mut buffer = ScratchBuffer::acquire(0, None, &pool).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.view().is_empty());
        assert_eq!(buffer.storage_kind(), Some(StorageKind::Stack));

        let buffer = ScratchBuffer::rent(0, &pool).unwrap();
        assert!(buffer.is_stack());
        assert!(buffer.as_slice().is_empty());
        assert_eq!(pool.stats().rented, 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let pool = SharedArrayPool::<i64>::new();
        let mut buffer = ScratchBuffer::acquire(100, None, &pool).unwrap();
        buffer.view()[99] = 7;

        buffer.release();
        assert!(buffer.is_released());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.view().is_empty());
        assert_eq!(buffer.storage_kind(), None);
        assert_eq!(pool.stats().returned, 1);

        buffer.release();
        assert!(buffer.is_released());
        assert!(buffer.view().is_empty());
        assert_eq!(pool.stats().returned, 1);

        drop(buffer);
        assert_eq!(pool.stats().returned, 1);
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn test_clear_on_release() {
        let pool = SharedArrayPool::<u8>::new();
        let mut buffer = ScratchBuffer::rent(16, &pool)
            .unwrap()
            .with_clear_on_release(true);
        buffer.view().fill(0x5A);
        drop(buffer);

        let array = pool.rent(16).unwrap();
        assert!(array.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_stack() {
        let mut region = [3u8; 5];
        let buffer = ScratchBuffer::<u8, SharedArrayPool<u8>>::from_stack(&mut region);
        assert!(buffer.is_stack());
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer, [3u8; 5][..]);
    }

    #[test]
    fn test_equality_across_storage() {
        let pool = SharedArrayPool::<u32>::new();
        let mut region = stack_region::<u32, 16>();
        let mut a = ScratchBuffer::acquire(4, Some(&mut region), &pool).unwrap();
        let mut b = ScratchBuffer::acquire(4, None, &pool).unwrap();
        assert!(a.is_stack());
        assert!(b.is_rented());
        a.view().copy_from_slice(&[1, 2, 3, 4]);
        b.view().copy_from_slice(&[1, 2, 3, 4]);
        assert!(a == b);
        b.view()[0] = 0;
        assert!(a != b);

        let text = format!("{a:?}");
        assert!(text.contains("Stack"));
        assert!(text.contains("[1, 2, 3, 4]"));
    }

    #[test]
    fn test_conversions() {
        fn sum(values: impl AsRef<[u32]>) -> u32 {
            values.as_ref().iter().sum()
        }

        let pool = SharedArrayPool::<u32>::new();
        let mut buffer = ScratchBuffer::acquire(3, None, &pool).unwrap();
        buffer.as_mut().copy_from_slice(&[5, 6, 7]);
        assert_eq!(sum(&buffer), 18);
        let slice: &[u32] = buffer.borrow();
        assert_eq!(slice, &[5, 6, 7]);
    }
}

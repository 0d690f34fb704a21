//! Scoped acquisition: the buffer lives exactly as long as a closure call.

use scratch_array_pool::ArrayPool;
use scratch_common::Result;

use crate::ScratchBuffer;

/// Acquires a scratch buffer of `count` elements, passes its view to `f` and
/// releases it when `f` returns or unwinds.
///
/// # Errors
///
/// Acquisition errors as described for [`ScratchBuffer::acquire_with`];
/// `f` is not called in that case.
pub fn with_scratch<'a, T, P, R>(
    count: impl TryInto<usize>,
    stack: Option<&'a mut [T]>,
    pool: &'a P,
    f: impl FnOnce(&mut [T]) -> R,
) -> Result<R>
where
    T: bytemuck::Zeroable + Copy,
    P: ArrayPool<T> + ?Sized,
{
    let mut buffer = ScratchBuffer::acquire(count, stack, pool)?;
    let result = f(buffer.view());
    buffer.release();
    Ok(result)
}

/// Same as [`with_scratch`], for closures that can themselves fail.
/// The buffer is released before the closure's error is propagated.
pub fn try_with_scratch<'a, T, P, R>(
    count: impl TryInto<usize>,
    stack: Option<&'a mut [T]>,
    pool: &'a P,
    f: impl FnOnce(&mut [T]) -> Result<R>,
) -> Result<R>
where
    T: bytemuck::Zeroable + Copy,
    P: ArrayPool<T> + ?Sized,
{
    let mut buffer = ScratchBuffer::acquire(count, stack, pool)?;
    let result = f(buffer.view());
    buffer.release();
    result
}

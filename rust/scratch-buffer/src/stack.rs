//! Caller-side stack reservation.
//!
//! Only the caller can place storage in its own frame, so reservation is a
//! local binding at the call site:
//!
//! ```
//! use scratch_buffer::{ScratchBuffer, SharedArrayPool, stack::stack_region};
//!
//! let pool = SharedArrayPool::<u32>::new();
//! let mut region = stack_region::<u32, 64>();
//! let mut buffer = ScratchBuffer::acquire(48, Some(&mut region), &pool).unwrap();
//! assert!(buffer.is_stack());
//! buffer.view().fill(1);
//! ```

/// Returns a zeroed array of `N` elements, to be bound to a local and lent to
/// [`ScratchBuffer::acquire`](crate::ScratchBuffer::acquire).
#[inline(always)]
pub fn stack_region<T, const N: usize>() -> [T; N]
where
    T: bytemuck::Zeroable + Copy,
{
    [T::zeroed(); N]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_region_is_zeroed() {
        let region = stack_region::<u64, 32>();
        assert_eq!(region.len(), 32);
        assert!(region.iter().all(|&x| x == 0));

        let region = stack_region::<char, 4>();
        assert_eq!(region, ['\0'; 4]);
    }
}

//! Short-lived scratch buffers backed by the caller's stack or by a shared array pool.
//!
//! A [`ScratchBuffer`] is acquired for a fixed number of elements. The
//! [`policy`] decides whether a caller-reserved stack region may back it;
//! otherwise the buffer rents an array from an [`ArrayPool`]. Either way the
//! caller works through one `&mut [T]` view, and a rented array is returned to
//! its pool exactly once, on [`ScratchBuffer::release`] or on drop.
//!
//! # Modules
//!
//! - [`policy`]: Stack and pool thresholds.
//! - [`owner`]: The [`ScratchBuffer`] owner type.
//! - [`stack`]: Caller-side stack region helper.
//! - [`scope`]: Closure-scoped acquisition.

pub mod owner;
pub mod policy;
pub mod scope;
pub mod stack;

pub use owner::{ScratchBuffer, StorageKind};
pub use policy::{
    BufferPolicy, POOL_RENTAL_THRESHOLD, STACK_BYTE_BUDGET, STACK_ELEMENT_CEILING,
    may_stack_allocate, should_rent_from_pool,
};
pub use scope::{try_with_scratch, with_scratch};

pub use scratch_array_pool::{ArrayPool, PoolConfig, SharedArrayPool};

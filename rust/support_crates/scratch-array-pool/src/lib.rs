//! Reusable-array pools.
//!
//! This crate defines the [`ArrayPool`] contract used by scratch buffers to
//! rent heap storage, together with [`SharedArrayPool`], a thread-safe pool
//! that keeps returned arrays in power-of-two length buckets.
//!
//! # Modules
//!
//! - [`pool`]: The [`ArrayPool`] trait.
//! - [`shared`]: The bucketed [`SharedArrayPool`] implementation.
//! - [`config`]: [`PoolConfig`] tuning knobs.
//! - [`stats`]: Diagnostic counters reported by [`SharedArrayPool::stats`].

pub mod config;
pub mod pool;
pub mod shared;
pub mod stats;

pub use config::PoolConfig;
pub use pool::ArrayPool;
pub use shared::SharedArrayPool;
pub use stats::PoolStats;

//! Fixed-capacity object pool optimized for frame-driven game loops.
//!
//! Objects are constructed once, up front, by a factory and then handed out
//! and taken back for the lifetime of the game. A steady-state frame loop
//! never allocates:
//!
//! - **Partitioned storage**: the first `borrowed_count` entries of the
//!   ordering are borrowed, the rest are free
//! - **O(1) release**: a released entry is swapped with the last borrowed one
//! - **Generational handles**: a released handle can never reach the object
//!   again, even after the slot has been reused
//! - **Degraded growth**: borrowing from an exhausted pool grows it by one
//!   slot and logs a sizing warning instead of failing
//!
//! # Architecture
//!
//! - [`ObjectPool`]: the pool itself
//! - [`PoolHandle`]: generation-checked reference to a borrowed object
//! - [`PoolError`]: misuse reported by [`ObjectPool::release`]

pub mod error;
pub mod handle;
pub mod pool;

// Re-export core types for ergonomic API
pub use error::PoolError;
pub use handle::PoolHandle;
pub use pool::ObjectPool;

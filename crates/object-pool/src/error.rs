//! Errors reported by pool operations.

use crate::PoolHandle;

/// Misuse of a pool detected while releasing an object.
///
/// These never corrupt the pool: the offending call is rejected and the
/// partition is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("pool '{pool}' had no borrowed objects when {handle} was released")]
    NothingBorrowed {
        pool: &'static str,
        handle: PoolHandle,
    },

    #[error("pool '{pool}' did not provide {handle}")]
    UnknownHandle {
        pool: &'static str,
        handle: PoolHandle,
    },

    #[error("pool '{pool}' has no borrowed object for stale handle {handle}")]
    StaleHandle {
        pool: &'static str,
        handle: PoolHandle,
    },
}

impl PoolError {
    /// Returns the name of the pool that reported the error.
    pub fn pool(&self) -> &'static str {
        match self {
            Self::NothingBorrowed { pool, .. }
            | Self::UnknownHandle { pool, .. }
            | Self::StaleHandle { pool, .. } => pool,
        }
    }
}

//! Common error infrastructure for game-core.
//!
//! This module provides the shared classification used across all error
//! types in game-core. Domain-specific errors (e.g., `BattleError`,
//! `EngineError`) are defined in their respective modules.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each component has its own error type with specific variants
//! - **Severity Classification**: Errors are categorized by how the host should react
//! - **Never crash the frame loop**: Only `Fatal` errors are allowed to stop a game

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Transient**: Session hiccups; drop the offending event and continue
/// - **Degraded**: Resource pressure handled by a slower path
/// - **Protocol**: A logic defect detected and contained (logged, not recovered)
/// - **Fatal**: The game cannot continue in a consistent state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Transient error - a single event or message is dropped.
    ///
    /// Examples: non-success event status, malformed player payload
    Transient,

    /// Degraded operation - the request succeeded on a slower path.
    ///
    /// Examples: object pool exhausted and grown
    Degraded,

    /// Protocol error - an invariant was violated but contained.
    ///
    /// Examples: double release into a pool, shield raised with value zero
    /// These indicate bugs and should be investigated.
    Protocol,

    /// Fatal error - the game state machine cannot continue.
    ///
    /// Examples: transition into an unregistered phase
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Degraded => "degraded",
            Self::Protocol => "protocol",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the game may keep running after this error.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Protocol | Self::Fatal)
    }
}

/// Common trait for all game errors.
///
/// Provides a uniform interface for error classification across crates so
/// the host can decide between logging and stopping.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl GameError for object_pool::PoolError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Protocol
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NothingBorrowed { .. } => "POOL_NOTHING_BORROWED",
            Self::UnknownHandle { .. } => "POOL_UNKNOWN_HANDLE",
            Self::StaleHandle { .. } => "POOL_STALE_HANDLE",
        }
    }
}

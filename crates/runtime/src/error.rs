//! Unified error types surfaced by the runtime API.
//!
//! Session-level problems (bad status codes, malformed payloads) are not
//! errors here: phases log and drop them. What remains are invariant
//! violations in the phase machine, configuration failures and host task
//! failures.
use std::path::PathBuf;

use thiserror::Error;

use game_core::{ErrorSeverity, GameError, PhaseId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Phase machine invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("phase {0} is not registered")]
    Unregistered(PhaseId),

    #[error("phase transitions did not settle after {hops} hops (last requested {last})")]
    TransitionLoop { hops: usize, last: PhaseId },
}

impl GameError for PhaseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unregistered(_) => "PHASE_UNREGISTERED",
            Self::TransitionLoop { .. } => "PHASE_TRANSITION_LOOP",
        }
    }
}

/// Failures while reading runtime or game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to read game config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse game config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEnv { .. } => "CONFIG_INVALID_ENV",
            Self::Read { .. } => "CONFIG_READ",
            Self::Parse { .. } => "CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("game has not been started")]
    NotStarted,

    #[error("host task join failed")]
    HostJoin(#[source] tokio::task::JoinError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Phase(error) => error.severity(),
            Self::Config(error) => error.severity(),
            Self::NotStarted => ErrorSeverity::Protocol,
            Self::HostJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Phase(error) => error.error_code(),
            Self::Config(error) => error.error_code(),
            Self::NotStarted => "RUNTIME_NOT_STARTED",
            Self::HostJoin(_) => "RUNTIME_HOST_JOIN",
        }
    }
}

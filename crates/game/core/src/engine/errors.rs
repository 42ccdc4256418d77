//! Error types for the action engine.

use object_pool::PoolError;

use crate::action::ActionRef;
use crate::error::{ErrorSeverity, GameError};

/// Invariant violations detected by the engine.
///
/// The engine never panics on these; it logs them and keeps the pools
/// consistent. Calls that hand a list back to the engine return them so the
/// caller can decide how loudly to report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("action {0} does not resolve to a live pooled action")]
    MissingAction(ActionRef),

    #[error("engine started while {pending} queued action(s) were still live")]
    StartedWhileLive { pending: usize },
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Protocol
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Pool(error) => error.error_code(),
            Self::MissingAction(_) => "ENGINE_MISSING_ACTION",
            Self::StartedWhileLive { .. } => "ENGINE_STARTED_WHILE_LIVE",
        }
    }
}

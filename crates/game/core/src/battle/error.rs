use crate::battle::PlayerId;
use crate::error::{ErrorSeverity, GameError};

/// Errors raised by battle roster and shield bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("party is full ({capacity} players), cannot add {player}")]
    PartyFull { player: PlayerId, capacity: usize },

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("tried to raise the party shield with invalid value {0}")]
    InvalidShieldValue(u32),
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PartyFull { .. } | Self::UnknownPlayer(_) => ErrorSeverity::Transient,
            Self::InvalidShieldValue(_) => ErrorSeverity::Protocol,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PartyFull { .. } => "BATTLE_PARTY_FULL",
            Self::UnknownPlayer(_) => "BATTLE_UNKNOWN_PLAYER",
            Self::InvalidShieldValue(_) => "BATTLE_INVALID_SHIELD",
        }
    }
}

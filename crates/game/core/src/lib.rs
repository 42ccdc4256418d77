//! Deterministic combat rules and timed action execution.
//!
//! `game-core` defines the canonical game rules (elements, damage, shields,
//! health), the eight pooled action kinds and the [`engine::ActionEngine`]
//! that plays them back one at a time against a caller-supplied clock. It
//! performs no I/O: presentation is reached through [`Presenter`] cues and
//! time arrives as [`Timestamp`] values, so every behavior is reproducible in
//! tests.
pub mod action;
pub mod battle;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod presentation;
pub mod protocol;
pub mod time;

pub use action::{
    ActionCatalog, ActionContext, ActionKind, ActionPools, ActionRef, CountdownAction,
    EnemyAttackSpell, EnemyDeathAction, FullScreenDisplayAction, PartyDeathAction,
    PlayerAttackSpell, PlayerHealSpell, PlayerShieldSpell, ShieldEffect, TimedAction,
};
pub use battle::{Battle, BattleError, HealthSnapshot, PartyMember, PlayerId};
pub use combat::{AttackOutcome, attack_outcome, enemy_damage, heal_value, shield_value};
pub use config::{
    AccuracyTable, BalanceConfig, DifficultyTable, GameConfig, PoolConfig, TimingConfig,
};
pub use engine::{ActionEngine, ActionList, EngineError};
pub use env::{GameRng, PcgRng, RngOracle, RollContext};
pub use error::{ErrorSeverity, GameError};
pub use presentation::{Cue, DisplayId, NullPresenter, Placement, Presenter, Sound};
pub use protocol::{
    DifficultySetting, GameData, PhaseId, PlayerBonus, PlayerMessage, PlayerPlayingData,
    PlayerReadyData, Spell, SpellAccuracy, SpellElement, SpellMessage, SpellType,
};
pub use time::Timestamp;

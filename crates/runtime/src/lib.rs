//! Runtime orchestration for the spellcasting party game.
//!
//! This crate wires the pure battle and action logic of `game-core` to a
//! session layer, a phase machine and a frame loop. Consumers build a
//! [`Game`] over any [`SessionService`], drive it with [`GameHost`] or by
//! calling [`Game::tick`] themselves, and observe it through the
//! [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`game`] hosts the orchestrator that owns all game state
//! - [`phases`] provides the eight phases and the machine switching them
//! - [`session`] defines the roster contract and an in-memory implementation
//! - [`events`] provides the topic-based bus for outbound traffic
//! - [`host`] and [`clock`] run games on a tokio interval
//! - [`ai`] plays unattended games with random spells
//! - [`config`] reads host settings and game tuning files
pub mod ai;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod host;
pub mod phases;
pub mod presenter;
pub mod session;

pub use ai::{AiReport, RandomAi};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::{RuntimeConfig, load_game_config};
pub use error::{ConfigError, PhaseError, Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use game::Game;
pub use host::{GameHost, HostHandle};
pub use phases::{PhaseContext, PhaseHandler, PhaseMachine, RoundState, Transition};
pub use presenter::LogPresenter;
pub use session::{
    EventKind, EventMask, GameplayState, LobbyState, LocalSession, PlayerInfo, PlayerRequest,
    PlayerState, SessionClosed, SessionEvent, SessionHandle, SessionService, StatusCode,
};

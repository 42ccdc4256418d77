//! The game orchestrator: owns all state and runs one frame per tick.
//!
//! # Architecture
//!
//! - **Single owner**: [`Game`] owns the battle, the engine, the phase
//!   machine and the round; phases borrow them through a [`PhaseContext`]
//!   built fresh for every callback
//! - **Frame order**: each [`Game::tick`] drains inbound session events and
//!   dispatches them, then updates the current phase, then advances the
//!   engine, then publishes health changes
//! - **Game-level events**: failed events are logged and dropped before any
//!   phase sees them; departures always leave the battle roster, whatever
//!   the phase
use game_core::{
    ActionContext, ActionEngine, Battle, Cue, GameConfig, GameError, GameRng, HealthSnapshot,
    PhaseId, Presenter, Timestamp,
};

use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::phases::{PhaseContext, PhaseMachine, RoundState};
use crate::session::{SessionEvent, SessionService};

pub struct Game<S, P> {
    config: GameConfig,
    session: S,
    presenter: P,
    battle: Battle,
    engine: ActionEngine,
    machine: PhaseMachine,
    round: RoundState,
    rng: GameRng,
    bus: EventBus,
    events: Vec<SessionEvent>,
    last_snapshot: HealthSnapshot,
}

impl<S: SessionService, P: Presenter> Game<S, P> {
    /// A game with all eight phases registered, not yet started.
    pub fn new(config: GameConfig, session: S, presenter: P, bus: EventBus, seed: u64) -> Self {
        let engine = ActionEngine::new(&config.pools);
        Self {
            config,
            session,
            presenter,
            battle: Battle::new(),
            engine,
            machine: PhaseMachine::standard(),
            round: RoundState::new(),
            rng: GameRng::new(seed),
            bus,
            events: Vec::new(),
            last_snapshot: HealthSnapshot::default(),
        }
    }

    /// Enters the lobby.
    pub fn start(&mut self, now: Timestamp) -> Result<()> {
        tracing::info!(seed = self.rng.seed(), "game starting");
        self.go_to(now, PhaseId::WaitingForPlayers)
    }

    pub fn is_started(&self) -> bool {
        self.machine.current().is_some()
    }

    /// Forces a transition to `phase`.
    pub fn go_to(&mut self, now: Timestamp, phase: PhaseId) -> Result<()> {
        let (machine, mut ctx) = self.split(now);
        machine.go_to_state(&mut ctx, phase)?;
        Ok(())
    }

    /// Runs one frame at `now`.
    pub fn tick(&mut self, now: Timestamp) -> Result<()> {
        if !self.is_started() {
            return Err(RuntimeError::NotStarted);
        }

        let mut events = std::mem::take(&mut self.events);
        self.session.drain_events(&mut events);
        let dispatched = events
            .drain(..)
            .try_for_each(|event| self.dispatch(now, &event));
        self.events = events;
        dispatched?;

        let (machine, mut ctx) = self.split(now);
        machine.update(&mut ctx)?;

        let mut actions = ActionContext::new(&mut self.battle, &mut self.presenter, &self.config);
        self.engine.update(now, &mut actions);

        self.publish_health();
        Ok(())
    }

    fn dispatch(&mut self, now: Timestamp, event: &SessionEvent) -> Result<()> {
        if !event.is_success() {
            tracing::warn!(
                player = %event.player,
                kind = %event.kind,
                reason = event.error_description.as_deref().unwrap_or("unknown"),
                "session event failed, dropped"
            );
            return Ok(());
        }

        if event.kind.is_departure() && self.battle.remove_player(&event.player).is_some() {
            tracing::info!(player = %event.player, kind = %event.kind, "player left the battle");
            self.presenter.cue(Cue::HidePlayer(event.player.clone()));
        }

        let (machine, mut ctx) = self.split(now);
        machine.handle_event(&mut ctx, event).map_err(|error| {
            tracing::error!(code = error.error_code(), %error, "event handling failed");
            RuntimeError::from(error)
        })?;
        Ok(())
    }

    fn publish_health(&mut self) {
        let snapshot = self.battle.snapshot();
        if snapshot != self.last_snapshot {
            self.last_snapshot = snapshot;
            self.bus.publish(Event::Health(snapshot));
        }
    }

    fn split(&mut self, now: Timestamp) -> (&mut PhaseMachine, PhaseContext<'_>) {
        let ctx = PhaseContext {
            engine: &mut self.engine,
            battle: &mut self.battle,
            session: &mut self.session,
            presenter: &mut self.presenter,
            config: &self.config,
            rng: &mut self.rng,
            round: &mut self.round,
            now,
        };
        (&mut self.machine, ctx)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_phase(&self) -> Option<PhaseId> {
        self.machine.current()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn engine(&self) -> &ActionEngine {
        &self.engine
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl<S, P> std::fmt::Debug for Game<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.machine.current())
            .field("engine", &self.engine)
            .field("health", &self.last_snapshot)
            .finish()
    }
}

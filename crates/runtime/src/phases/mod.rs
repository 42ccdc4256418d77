//! Game phases and the machine that switches between them.
//!
//! # Architecture
//!
//! - **Registry**: [`PhaseMachine`] maps each [`PhaseId`] to a boxed
//!   [`PhaseHandler`]; exactly one is current once the machine has started
//! - **Transitions as values**: handlers never call back into the machine.
//!   They return a [`Transition`] and the machine applies it after the
//!   handler returns, so a redirect from `on_enter` is just another hop
//! - **Subscriptions**: each handler declares an [`EventMask`]; the machine
//!   hands an event only to the current phase and only when subscribed, so
//!   nothing a phase listens to outlives its `on_exit`
//! - **Shared round state**: submissions collected during player action live
//!   in [`RoundState`], owned by the game and lent to every phase
//!
//! Several phases skip their teardown when the next phase is
//! [`PhaseId::Paused`] and skip their setup when entered from it, so a round
//! survives a pause unchanged.
mod instructions;
mod lobby;
mod machine;
mod paused;
mod player_action;
mod resolution;
mod round;
mod victory;

pub use instructions::InstructionsPhase;
pub use lobby::WaitingForPlayersPhase;
pub use machine::PhaseMachine;
pub use paused::PausedPhase;
pub use player_action::PlayerActionPhase;
pub use resolution::{EnemyResolutionPhase, PlayerResolutionPhase};
pub use round::RoundState;
pub use victory::VictoryPhase;

use game_core::{
    ActionContext, ActionEngine, Battle, Cue, GameConfig, GameRng, PhaseId, Presenter, Timestamp,
};

use crate::session::{EventMask, SessionEvent, SessionService};

/// What a phase wants the machine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    GoTo(PhaseId),
}

/// Everything a phase may read or mutate during one callback.
pub struct PhaseContext<'a> {
    pub engine: &'a mut ActionEngine,
    pub battle: &'a mut Battle,
    pub session: &'a mut dyn SessionService,
    pub presenter: &'a mut dyn Presenter,
    pub config: &'a GameConfig,
    pub rng: &'a mut GameRng,
    pub round: &'a mut RoundState,
    /// Frame time of the tick being processed.
    pub now: Timestamp,
}

impl PhaseContext<'_> {
    #[inline]
    pub fn cue(&mut self, cue: Cue) {
        self.presenter.cue(cue);
    }

    /// Action-facing view of the battle, for helpers that emit their own cues.
    pub fn actions(&mut self) -> ActionContext<'_> {
        ActionContext::new(&mut *self.battle, &mut *self.presenter, self.config)
    }

    pub fn connected_count(&self) -> usize {
        self.session.connected_count()
    }

    /// Releases the round's submissions and stops the engine.
    pub fn abandon_round(&mut self) {
        self.round.clear(self.engine);
        self.engine.reset();
    }
}

/// One node of the phase graph.
pub trait PhaseHandler: Send {
    fn id(&self) -> PhaseId;

    /// Event kinds delivered to [`on_event`](Self::on_event).
    fn subscriptions(&self) -> EventMask {
        EventMask::empty()
    }

    fn on_enter(&mut self, _ctx: &mut PhaseContext<'_>, _previous: Option<PhaseId>) -> Transition {
        Transition::Stay
    }

    fn on_update(&mut self, _ctx: &mut PhaseContext<'_>) -> Transition {
        Transition::Stay
    }

    /// Only successful events reach phases.
    fn on_event(&mut self, _ctx: &mut PhaseContext<'_>, _event: &SessionEvent) -> Transition {
        Transition::Stay
    }

    fn on_exit(&mut self, _ctx: &mut PhaseContext<'_>, _next: PhaseId) {}
}

/// Degrades to the lobby when nobody is left.
pub(crate) fn lobby_if_empty(ctx: &PhaseContext<'_>) -> Transition {
    if ctx.connected_count() == 0 {
        tracing::info!("no connected players left");
        Transition::GoTo(PhaseId::WaitingForPlayers)
    } else {
        Transition::Stay
    }
}

//! Pause screen. Freezes the engine until an idle player comes back.
use game_core::{Cue, DisplayId, PhaseId};

use super::{PhaseContext, PhaseHandler, Transition, lobby_if_empty};
use crate::session::{EventKind, EventMask, GameplayState, PlayerState, SessionEvent};

#[derive(Debug, Default)]
pub struct PausedPhase {
    /// Phase to return to once a player resumes.
    resume_to: Option<PhaseId>,
}

impl PausedPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume_to(&self) -> Option<PhaseId> {
        self.resume_to
    }
}

impl PhaseHandler for PausedPhase {
    fn id(&self) -> PhaseId {
        PhaseId::Paused
    }

    fn subscriptions(&self) -> EventMask {
        EventMask::PLAYER_PLAYING | EventMask::DEPARTURES
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, previous: Option<PhaseId>) -> Transition {
        self.resume_to = previous.filter(|id| *id != PhaseId::Paused);
        ctx.cue(Cue::ActivateDisplay(DisplayId::Paused));
        ctx.session.update_gameplay_state(GameplayState::Paused);
        ctx.engine.pause(ctx.now);
        let idled = ctx
            .session
            .transition_players(PlayerState::Playing, PlayerState::Idle);
        tracing::info!(resume_to = ?self.resume_to, idled, "game paused");
        Transition::Stay
    }

    fn on_event(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        if event.kind.is_departure() {
            return lobby_if_empty(ctx);
        }
        if event.kind == EventKind::PlayerPlaying {
            tracing::info!(player = %event.player, "resumed by player");
            return Transition::GoTo(self.resume_to.unwrap_or(PhaseId::WaitingForPlayers));
        }
        Transition::Stay
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, _next: PhaseId) {
        ctx.session.transition_players(PlayerState::Idle, PlayerState::Playing);
        ctx.engine.resume(ctx.now);
        ctx.session.update_gameplay_state(GameplayState::Running);
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Paused));
    }
}

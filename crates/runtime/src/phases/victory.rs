//! End-of-game screens for either side.
use game_core::{Cue, DisplayId, PhaseId};

use super::{PhaseContext, PhaseHandler, Transition};
use crate::session::{GameplayState, PlayerState};

/// Shows the winner's display, then sends everyone back to the lobby.
#[derive(Debug)]
pub struct VictoryPhase {
    id: PhaseId,
    display: DisplayId,
}

impl VictoryPhase {
    pub fn player() -> Self {
        Self {
            id: PhaseId::PlayerVictory,
            display: DisplayId::PlayerVictory,
        }
    }

    pub fn enemy() -> Self {
        Self {
            id: PhaseId::EnemyVictory,
            display: DisplayId::EnemyVictory,
        }
    }
}

impl PhaseHandler for VictoryPhase {
    fn id(&self) -> PhaseId {
        self.id
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, _previous: Option<PhaseId>) -> Transition {
        ctx.cue(Cue::DeactivateDisplay(DisplayId::EnemyHealth));
        ctx.cue(Cue::DeactivateDisplay(DisplayId::PartyHealth));
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Battlefield));

        let delay = ctx.config.timing.endgame_display_ms;
        ctx.engine.reset();
        let display = ctx.engine.pools_mut().full_screen_display(self.display, delay);
        ctx.engine.start_single(display);
        ctx.session.update_gameplay_state(GameplayState::ShowingInfoScreen);
        ctx.session.transition_players(PlayerState::Playing, PlayerState::Idle);

        for member in ctx.battle.members().to_vec() {
            ctx.cue(Cue::HidePlayer(member.id));
        }
        ctx.battle.remove_all_players();
        ctx.battle.clear_enemy();
        ctx.cue(Cue::RemoveEnemy);

        tracing::info!(winner = %self.id, "game over");
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        if ctx.engine.is_done() {
            Transition::GoTo(PhaseId::WaitingForPlayers)
        } else {
            Transition::Stay
        }
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, _next: PhaseId) {
        ctx.session.transition_players(PlayerState::Idle, PlayerState::Available);
        ctx.session.update_gameplay_state(GameplayState::Running);
        ctx.engine.reset();
        ctx.cue(Cue::DeactivateDisplay(self.display));
    }
}

//! Instructions screen shown before the first round.
use game_core::{Cue, DisplayId, PhaseId};

use super::{PhaseContext, PhaseHandler, Transition, lobby_if_empty};
use crate::session::GameplayState;

#[derive(Debug, Default)]
pub struct InstructionsPhase;

impl InstructionsPhase {
    pub fn new() -> Self {
        Self
    }
}

impl PhaseHandler for InstructionsPhase {
    fn id(&self) -> PhaseId {
        PhaseId::Instructions
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, _previous: Option<PhaseId>) -> Transition {
        let delay = ctx.config.timing.instructions_delay_ms;
        ctx.engine.reset();
        let display = ctx
            .engine
            .pools_mut()
            .full_screen_display(DisplayId::Instructions, delay);
        ctx.engine.start_single(display);
        ctx.session.update_gameplay_state(GameplayState::ShowingInfoScreen);
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        if let Transition::GoTo(next) = lobby_if_empty(ctx) {
            return Transition::GoTo(next);
        }
        if ctx.engine.is_done() {
            Transition::GoTo(PhaseId::PlayerAction)
        } else {
            Transition::Stay
        }
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, next: PhaseId) {
        ctx.engine.reset();
        if next != PhaseId::PlayerAction {
            return;
        }

        ctx.session.update_gameplay_state(GameplayState::Running);
        let party_size = ctx.battle.party_size();
        ctx.battle.setup_world(party_size, &ctx.config.balance);
        tracing::info!(
            party_size,
            party_health = ctx.battle.party_health(),
            enemy_health = ctx.battle.enemy_health(),
            "world set up"
        );

        ctx.cue(Cue::ActivateDisplay(DisplayId::Battlefield));
        ctx.cue(Cue::ActivateDisplay(DisplayId::PartyHealth));
        ctx.cue(Cue::ActivateDisplay(DisplayId::EnemyHealth));
        let health = Cue::PartyHealth {
            health: ctx.battle.party_health(),
            max: ctx.battle.party_max_health(),
        };
        ctx.cue(health);
        let health = Cue::EnemyHealth {
            health: ctx.battle.enemy_health(),
            max: ctx.battle.enemy_max_health(),
        };
        ctx.cue(health);
    }
}

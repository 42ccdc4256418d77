//! Resolution phases: the party's spells, then the enemy's attack.
//!
//! Both end the same way when their side wins: a death effect runs to
//! completion before the victory phase is entered.
use game_core::{PhaseId, RollContext, SpellElement};

use super::{PhaseContext, PhaseHandler, Transition, lobby_if_empty};
use crate::session::{EventKind, EventMask, GameplayState, SessionEvent};

fn pause_unless_paused(ctx: &PhaseContext<'_>) -> Transition {
    if ctx.session.gameplay_state() == GameplayState::Paused {
        Transition::Stay
    } else {
        Transition::GoTo(PhaseId::Paused)
    }
}

fn idle_or_departure(ctx: &PhaseContext<'_>, event: &SessionEvent) -> Transition {
    match event.kind {
        EventKind::PlayerIdle => pause_unless_paused(ctx),
        kind if kind.is_departure() => lobby_if_empty(ctx),
        _ => Transition::Stay,
    }
}

// ============================================================================
// Player resolution
// ============================================================================

/// Plays every submitted spell, interleaved round-robin across players.
#[derive(Debug, Default)]
pub struct PlayerResolutionPhase {
    showed_enemy_death: bool,
}

impl PlayerResolutionPhase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhaseHandler for PlayerResolutionPhase {
    fn id(&self) -> PhaseId {
        PhaseId::PlayerResolution
    }

    fn subscriptions(&self) -> EventMask {
        EventMask::PLAYER_IDLE | EventMask::DEPARTURES
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, previous: Option<PhaseId>) -> Transition {
        if previous == Some(PhaseId::Paused) {
            return Transition::Stay;
        }

        ctx.battle.reset_shield_casts();
        let actions = ctx.round.interleave(ctx.engine);
        tracing::info!(actions = actions.len(), "resolving player spells");
        ctx.engine.reset();
        ctx.engine.start_executing(actions);
        self.showed_enemy_death = false;
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        if !ctx.engine.is_done() {
            return Transition::Stay;
        }
        if ctx.battle.enemy_health() > 0 {
            return Transition::GoTo(PhaseId::EnemyResolution);
        }
        if self.showed_enemy_death {
            return Transition::GoTo(PhaseId::PlayerVictory);
        }

        tracing::info!("enemy defeated");
        ctx.engine.reset();
        let death = ctx.engine.pools_mut().enemy_death();
        ctx.engine.start_single(death);
        self.showed_enemy_death = true;
        Transition::Stay
    }

    fn on_event(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        idle_or_departure(ctx, event)
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, next: PhaseId) {
        if next == PhaseId::Paused {
            return;
        }
        ctx.engine.reset();
        ctx.battle.reset_shield_casts();
    }
}

// ============================================================================
// Enemy resolution
// ============================================================================

/// The enemy attacks one random connected party member.
#[derive(Debug, Default)]
pub struct EnemyResolutionPhase {
    showed_party_death: bool,
}

impl EnemyResolutionPhase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhaseHandler for EnemyResolutionPhase {
    fn id(&self) -> PhaseId {
        PhaseId::EnemyResolution
    }

    fn subscriptions(&self) -> EventMask {
        EventMask::PLAYER_IDLE | EventMask::DEPARTURES
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, previous: Option<PhaseId>) -> Transition {
        if previous == Some(PhaseId::Paused) {
            return Transition::Stay;
        }

        let element = ctx.battle.enemy_element();
        if element == SpellElement::None {
            tracing::error!("enemy resolution without an enemy element");
            return Transition::GoTo(PhaseId::WaitingForPlayers);
        }

        let candidates: Vec<_> = ctx
            .battle
            .members()
            .iter()
            .filter(|member| ctx.session.is_connected(&member.id))
            .map(|member| member.id.clone())
            .collect();
        let Some(target) = ctx.rng.pick(RollContext::EnemyTarget, &candidates).cloned() else {
            tracing::error!("no connected party member for the enemy to attack");
            return Transition::GoTo(PhaseId::WaitingForPlayers);
        };
        let Some(strength) = ctx
            .rng
            .pick(RollContext::EnemyStrength, &ctx.config.balance.enemy_strengths)
            .copied()
        else {
            tracing::error!("no enemy attack strengths configured");
            return Transition::GoTo(PhaseId::WaitingForPlayers);
        };

        tracing::info!(%target, %element, strength, "enemy attacks");
        ctx.engine.reset();
        let attack = ctx.engine.pools_mut().enemy_attack(target, element, strength);
        ctx.engine.start_single(attack);
        self.showed_party_death = false;
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        if !ctx.engine.is_done() {
            return Transition::Stay;
        }
        if ctx.battle.party_health() > 0 {
            return Transition::GoTo(PhaseId::PlayerAction);
        }
        if self.showed_party_death {
            return Transition::GoTo(PhaseId::EnemyVictory);
        }

        tracing::info!("party defeated");
        ctx.engine.reset();
        let death = ctx.engine.pools_mut().party_death();
        ctx.engine.start_single(death);
        self.showed_party_death = true;
        Transition::Stay
    }

    fn on_event(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        idle_or_departure(ctx, event)
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, next: PhaseId) {
        if next == PhaseId::Paused {
            return;
        }
        ctx.engine.reset();
    }
}


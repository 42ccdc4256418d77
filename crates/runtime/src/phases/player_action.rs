//! Player action: countdown, round-start notification, spell collection.
use game_core::{
    ActionCatalog, Cue, DisplayId, PhaseId, Placement, PlayerMessage, SpellMessage, Timestamp,
};

use super::{PhaseContext, PhaseHandler, Transition, lobby_if_empty};
use crate::session::{EventKind, EventMask, GameplayState, SessionEvent};

/// Collects one spell list per connected player.
///
/// The round survives a detour through [`PhaseId::Paused`]: entering from
/// the pause skips setup and leaving for it skips teardown.
#[derive(Debug, Default)]
pub struct PlayerActionPhase {
    /// Set once the countdown is over and players were told to cast.
    notified_at: Option<Timestamp>,
    time_running_out: bool,
}

impl PlayerActionPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether players have been told to start casting.
    pub fn casting_open(&self) -> bool {
        self.notified_at.is_some()
    }

    pub fn time_running_out(&self) -> bool {
        self.time_running_out
    }

    /// Assigns this round's bonuses and tells every party member how long
    /// they have to cast.
    fn notify_players(&mut self, ctx: &mut PhaseContext<'_>) {
        ctx.battle
            .assign_bonuses(ctx.rng, &ctx.config.balance.bonus_lottery);
        let cast_duration_millis = ctx.config.cast_duration_millis(ctx.battle.difficulty());

        for member in ctx.battle.members().to_vec() {
            if !ctx.session.is_connected(&member.id) {
                continue;
            }
            let message = PlayerMessage {
                player_bonus: member.bonus,
                cast_duration_millis,
            };
            match serde_json::to_value(message) {
                Ok(message) => ctx.session.send_message_to_player(&member.id, message),
                Err(error) => {
                    tracing::error!(player = %member.id, %error, "round start message not encoded")
                }
            }
        }
        tracing::info!(cast_duration_millis, "players notified");
    }

    fn on_spells(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        let caster = &event.player;
        let message = match event.parse_payload::<SpellMessage>() {
            Some(Ok(message)) => message,
            Some(Err(error)) => {
                tracing::warn!(player = %caster, %error, "malformed spell message dropped");
                return Transition::Stay;
            }
            None => {
                tracing::warn!(player = %caster, "spell message without payload dropped");
                return Transition::Stay;
            }
        };
        if !ctx.battle.contains(caster) {
            tracing::warn!(player = %caster, "spells from unknown caster dropped");
            return Transition::Stay;
        }

        let actions = ActionCatalog::parse(ctx.engine, caster, &message.spells);
        ctx.round.submit(ctx.engine, caster.clone(), actions);
        tracing::debug!(
            player = %caster,
            spells = message.spells.len(),
            submitted = ctx.round.submitted_count(),
            "spells received"
        );
        Self::everyone_submitted(ctx)
    }

    fn everyone_submitted(ctx: &PhaseContext<'_>) -> Transition {
        let submitted = ctx.round.submitted_count();
        if submitted > 0 && submitted >= ctx.connected_count() {
            Transition::GoTo(PhaseId::PlayerResolution)
        } else {
            Transition::Stay
        }
    }
}

impl PhaseHandler for PlayerActionPhase {
    fn id(&self) -> PhaseId {
        PhaseId::PlayerAction
    }

    fn subscriptions(&self) -> EventMask {
        EventMask::GAME_MESSAGE | EventMask::PLAYER_IDLE | EventMask::DEPARTURES
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, previous: Option<PhaseId>) -> Transition {
        if let Transition::GoTo(next) = lobby_if_empty(ctx) {
            return Transition::GoTo(next);
        }
        if previous == Some(PhaseId::Paused) {
            return Transition::Stay;
        }

        ctx.abandon_round();
        ctx.actions().disable_party_shield();

        for member in ctx.battle.members().to_vec() {
            if ctx.session.is_connected(&member.id) {
                ctx.cue(Cue::ShowPlayer {
                    player: member.id,
                    placement: Placement::Battle,
                });
            }
        }

        let element = ctx.battle.select_enemy_element(ctx.rng);
        ctx.cue(Cue::ShowEnemy(element));

        let countdown = ctx.engine.pools_mut().countdown();
        ctx.engine.start_single(countdown);

        self.notified_at = None;
        self.time_running_out = false;
        tracing::info!(
            %element,
            enemy_health = ctx.battle.enemy_health(),
            party_health = ctx.battle.party_health(),
            "round started"
        );
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        match self.notified_at {
            None if ctx.engine.is_done() => {
                self.notify_players(ctx);
                self.notified_at = Some(ctx.now);
            }
            Some(notified_at)
                if !self.time_running_out
                    && ctx.now.millis_since(notified_at) > ctx.config.timing.time_running_out_ms =>
            {
                self.time_running_out = true;
                tracing::info!(
                    submitted = ctx.round.submitted_count(),
                    "cast time running out"
                );
            }
            _ => {}
        }
        Transition::Stay
    }

    fn on_event(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        match event.kind {
            EventKind::GameMessageReceived => self.on_spells(ctx, event),
            EventKind::PlayerIdle => {
                if ctx.session.gameplay_state() == GameplayState::Paused {
                    Transition::Stay
                } else {
                    Transition::GoTo(PhaseId::Paused)
                }
            }
            kind if kind.is_departure() => {
                ctx.round.withdraw(ctx.engine, &event.player);
                match lobby_if_empty(ctx) {
                    Transition::Stay => Self::everyone_submitted(ctx),
                    redirect => redirect,
                }
            }
            _ => Transition::Stay,
        }
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, next: PhaseId) {
        if next == PhaseId::Paused {
            return;
        }

        self.notified_at = None;
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Countdown));
        ctx.cue(Cue::DeactivateDisplay(DisplayId::WaitingForSpells));
        ctx.engine.reset();
        if next != PhaseId::PlayerResolution {
            ctx.round.clear(ctx.engine);
        }
    }
}

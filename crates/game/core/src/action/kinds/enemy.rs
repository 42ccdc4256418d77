//! Enemy turn and death effects.

use crate::action::{ActionContext, TimedAction};
use crate::battle::PlayerId;
use crate::combat::enemy_damage;
use crate::presentation::{Cue, Sound};
use crate::protocol::SpellElement;

/// Enemy attack on the party.
///
/// The attack animation plays first; the projectile is launched on the first
/// update and damage is applied when it lands.
#[derive(Clone, Debug, Default)]
pub struct EnemyAttackSpell {
    target: Option<PlayerId>,
    element: SpellElement,
    strength: u32,
    duration: u64,
    launched: bool,
}

impl EnemyAttackSpell {
    pub fn init(&mut self, target: PlayerId, element: SpellElement, strength: u32) {
        *self = Self {
            target: Some(target),
            element,
            strength,
            ..Self::default()
        };
    }

    pub fn target(&self) -> Option<&PlayerId> {
        self.target.as_ref()
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }
}

impl TimedAction for EnemyAttackSpell {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        self.duration = ctx.config.timing.enemy_attack_ms;
        ctx.cue(Cue::EnemyAttackAnimation(self.element));
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if self.launched {
            return;
        }
        self.launched = true;

        let flight_ms = self
            .duration
            .saturating_sub(elapsed)
            .saturating_sub(ctx.config.timing.explosion_fx_ms);
        ctx.cue(Cue::Sound(Sound::Attack));
        match self.target.clone() {
            Some(target) => ctx.cue(Cue::LaunchEnemySpell {
                target,
                element: self.element,
                strength: self.strength,
                flight_ms,
            }),
            None => tracing::warn!("enemy attack launched without a target"),
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.cue(Cue::DeactivateSpell);
        let damage = enemy_damage(
            self.strength,
            ctx.battle.party_size(),
            ctx.battle.party_shield(),
            &ctx.config.balance,
        );
        let health = ctx.update_party_health(-(damage as i64));
        tracing::debug!(damage, party_health = health, "enemy attack landed");
    }
}

// ============================================================================
// Death effects
// ============================================================================

/// Stepped fade from fully opaque to transparent over the death effect.
#[derive(Clone, Copy, Debug, Default)]
struct Fade {
    duration: u64,
    step: u64,
    next_step_at: u64,
}

impl Fade {
    fn start(&mut self, duration: u64, step: u64) {
        self.duration = duration;
        self.step = step.max(1);
        self.next_step_at = self.step;
    }

    /// New alpha when a step boundary has been crossed.
    fn advance(&mut self, elapsed: u64) -> Option<f32> {
        if elapsed < self.next_step_at || self.duration == 0 {
            return None;
        }
        self.next_step_at = (elapsed / self.step + 1) * self.step;
        let remaining = self.duration.saturating_sub(elapsed);
        Some(remaining as f32 / self.duration as f32)
    }
}

/// Fades the enemy out after its health reaches zero.
#[derive(Clone, Debug, Default)]
pub struct EnemyDeathAction {
    fade: Fade,
}

impl EnemyDeathAction {
    pub fn init(&mut self) {
        *self = Self::default();
    }
}

impl TimedAction for EnemyDeathAction {
    fn execution_time(&self) -> u64 {
        self.fade.duration
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        let timing = &ctx.config.timing;
        self.fade.start(timing.death_fx_ms, timing.death_fade_step_ms);
        ctx.cue(Cue::EnemyAlpha(1.0));
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if let Some(alpha) = self.fade.advance(elapsed) {
            ctx.cue(Cue::EnemyAlpha(alpha));
        }
    }

    fn on_finish(&mut self, _ctx: &mut ActionContext<'_>) {}
}

/// Fades the party out after its health reaches zero, then removes the enemy.
#[derive(Clone, Debug, Default)]
pub struct PartyDeathAction {
    fade: Fade,
}

impl PartyDeathAction {
    pub fn init(&mut self) {
        *self = Self::default();
    }
}

impl TimedAction for PartyDeathAction {
    fn execution_time(&self) -> u64 {
        self.fade.duration
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        let timing = &ctx.config.timing;
        self.fade.start(timing.death_fx_ms, timing.death_fade_step_ms);
        ctx.cue(Cue::PartyAlpha(1.0));
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if let Some(alpha) = self.fade.advance(elapsed) {
            ctx.cue(Cue::PartyAlpha(alpha));
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.cue(Cue::RemoveEnemy);
    }
}

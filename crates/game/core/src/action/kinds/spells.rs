//! Spells cast by party members.

use crate::action::{ActionContext, TimedAction};
use crate::battle::PlayerId;
use crate::combat::{AttackOutcome, attack_outcome, heal_value, shield_value};
use crate::presentation::{Cue, Sound};
use crate::protocol::{PlayerBonus, SpellAccuracy, SpellElement};

fn attack_sprite_scale(accuracy: SpellAccuracy) -> f32 {
    match accuracy {
        SpellAccuracy::Good => 0.5,
        SpellAccuracy::Great => 0.8,
        SpellAccuracy::Perfect => 1.25,
    }
}

// ============================================================================
// Attack
// ============================================================================

/// Basic elemental attack against the enemy.
///
/// The outcome is resolved when the spell is cast, using the caster's bonus
/// for this round, and applied when it lands.
#[derive(Clone, Debug, Default)]
pub struct PlayerAttackSpell {
    caster: Option<PlayerId>,
    element: SpellElement,
    accuracy: SpellAccuracy,
    outcome: AttackOutcome,
    duration: u64,
    abort: bool,
}

impl PlayerAttackSpell {
    pub fn init(&mut self, caster: PlayerId, element: SpellElement, accuracy: SpellAccuracy) {
        *self = Self {
            caster: Some(caster),
            element,
            accuracy,
            ..Self::default()
        };
    }

    pub fn caster(&self) -> Option<&PlayerId> {
        self.caster.as_ref()
    }

    pub fn element(&self) -> SpellElement {
        self.element
    }

    /// Resolved outcome, [`AttackOutcome::NoEffect`] before the spell starts.
    pub fn outcome(&self) -> AttackOutcome {
        self.outcome
    }
}

impl TimedAction for PlayerAttackSpell {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn should_finish_on_next_update(&self) -> bool {
        self.abort
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(caster) = self.caster.clone().filter(|id| ctx.battle.contains(id)) else {
            tracing::warn!(caster = ?self.caster, "attack caster left the party");
            self.abort = true;
            return;
        };

        let config = ctx.config;
        let bonus = ctx.battle.bonus(&caster);
        self.duration = config.timing.player_attack_ms;
        self.outcome = attack_outcome(
            self.element,
            ctx.battle.enemy_element(),
            self.accuracy,
            bonus,
            &config.balance,
        );
        tracing::debug!(
            caster = %caster,
            element = %self.element,
            outcome = ?self.outcome,
            "player attack cast"
        );

        let mut scale = attack_sprite_scale(self.accuracy);
        if bonus == PlayerBonus::Attack {
            scale += 0.25;
        }
        ctx.cue(Cue::MoveForward(caster.clone()));
        ctx.cue(Cue::LaunchPlayerSpell {
            caster,
            element: self.element,
            scale,
            flight_ms: self.duration.saturating_sub(config.timing.explosion_fx_ms),
            explodes: self.outcome.is_damage(),
        });
        ctx.cue(Cue::Sound(Sound::Attack));
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(caster) = self.caster.clone().filter(|_| !self.abort) else {
            return;
        };

        ctx.cue(Cue::MoveBackward(caster));
        ctx.cue(Cue::DeactivateSpell);
        if matches!(self.outcome, AttackOutcome::EnemyHeal(_)) {
            ctx.cue(Cue::Sound(Sound::Heal));
        }
        ctx.update_enemy_health(self.outcome.enemy_health_delta());
    }
}

// ============================================================================
// Heal
// ============================================================================

/// Restores party health. The heal visual appears after a short delay.
#[derive(Clone, Debug, Default)]
pub struct PlayerHealSpell {
    caster: Option<PlayerId>,
    accuracy: SpellAccuracy,
    bonus: PlayerBonus,
    duration: u64,
    heal_shown: bool,
    abort: bool,
}

impl PlayerHealSpell {
    pub fn init(&mut self, caster: PlayerId, accuracy: SpellAccuracy) {
        *self = Self {
            caster: Some(caster),
            accuracy,
            ..Self::default()
        };
    }

    pub fn caster(&self) -> Option<&PlayerId> {
        self.caster.as_ref()
    }
}

impl TimedAction for PlayerHealSpell {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn should_finish_on_next_update(&self) -> bool {
        self.abort
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(caster) = self.caster.clone().filter(|id| ctx.battle.contains(id)) else {
            tracing::warn!(caster = ?self.caster, "heal caster left the party");
            self.abort = true;
            return;
        };

        self.bonus = ctx.battle.bonus(&caster);
        self.duration = ctx.config.timing.player_heal_ms;
        ctx.cue(Cue::MoveForward(caster));
        ctx.cue(Cue::Sound(Sound::Heal));
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if !self.heal_shown && !self.abort && elapsed > ctx.config.timing.heal_fx_ms {
            ctx.enable_heal(self.accuracy);
            self.heal_shown = true;
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(caster) = self.caster.clone().filter(|_| !self.abort) else {
            return;
        };

        ctx.cue(Cue::MoveBackward(caster));
        ctx.disable_heal();
        let value = heal_value(self.accuracy, self.bonus, &ctx.config.balance);
        ctx.update_party_health(value as i64);
    }
}

// ============================================================================
// Shield
// ============================================================================

/// What a shield cast does, decided by how many shields preceded it this
/// round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShieldEffect {
    /// First cast of the round: raise the shield.
    Raise(u32),
    /// Second cast: the two shields cancel out.
    Disrupt,
    /// Third and later casts are ignored.
    #[default]
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct PlayerShieldSpell {
    caster: Option<PlayerId>,
    accuracy: SpellAccuracy,
    bonus: PlayerBonus,
    effect: ShieldEffect,
    duration: u64,
    moved: bool,
    applied: bool,
    abort: bool,
}

impl PlayerShieldSpell {
    pub fn init(&mut self, caster: PlayerId, accuracy: SpellAccuracy) {
        *self = Self {
            caster: Some(caster),
            accuracy,
            ..Self::default()
        };
    }

    pub fn caster(&self) -> Option<&PlayerId> {
        self.caster.as_ref()
    }

    pub fn effect(&self) -> ShieldEffect {
        self.effect
    }
}

impl TimedAction for PlayerShieldSpell {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn should_finish_on_next_update(&self) -> bool {
        self.abort
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        let config = ctx.config;
        let Some(caster) = self.caster.clone().filter(|id| ctx.battle.contains(id)) else {
            tracing::warn!(caster = ?self.caster, "shield caster left the party");
            self.abort = true;
            return;
        };

        self.bonus = ctx.battle.bonus(&caster);
        let previous_casts = ctx.battle.record_shield_cast();
        match previous_casts {
            0 => {
                let value = shield_value(self.accuracy, self.bonus, &config.balance);
                self.effect = ShieldEffect::Raise(value);
                self.duration = config.timing.player_shield_ms;
                self.moved = true;
                ctx.cue(Cue::MoveForward(caster));
                ctx.cue(Cue::Sound(Sound::Shield));
            }
            1 => {
                self.effect = ShieldEffect::Disrupt;
                self.duration = config.timing.player_shield_ms;
                self.moved = true;
                ctx.cue(Cue::MoveForward(caster));
                ctx.cue(Cue::Sound(Sound::ShieldDisrupt));
            }
            _ => {
                self.effect = ShieldEffect::Ignored;
                self.duration = config.timing.ignored_shield_ms;
            }
        }
        tracing::debug!(previous_casts, effect = ?self.effect, "shield cast");
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if self.applied || self.abort || elapsed <= ctx.config.timing.shield_fx_ms {
            return;
        }
        self.applied = true;

        match self.effect {
            ShieldEffect::Raise(value) => {
                let bonus = self.bonus == PlayerBonus::Shield;
                ctx.enable_party_shield(value, self.accuracy, bonus);
            }
            ShieldEffect::Disrupt => ctx.disable_party_shield(),
            ShieldEffect::Ignored => {}
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        // The shield itself stays up until the next player action phase.
        if !self.moved {
            return;
        }
        if let Some(caster) = self.caster.clone() {
            ctx.cue(Cue::MoveBackward(caster));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::Battle;
    use crate::config::GameConfig;
    use crate::presentation::Presenter;

    struct Fixture {
        battle: Battle,
        cues: Vec<Cue>,
        config: GameConfig,
    }

    impl Fixture {
        fn new(enemy: SpellElement) -> Self {
            let config = GameConfig::default();
            let mut battle = Battle::new();
            battle.add_player(PlayerId::from("p1"), "p1", 0).unwrap();
            battle.setup_world(1, &config.balance);
            battle.set_enemy_element(enemy);
            Self {
                battle,
                cues: Vec::new(),
                config,
            }
        }

        fn ctx(&mut self) -> ActionContext<'_> {
            ActionContext::new(&mut self.battle, &mut self.cues as &mut dyn Presenter, &self.config)
        }

        /// Runs the full lifecycle with one update at `elapsed`.
        fn run(&mut self, action: &mut dyn TimedAction, elapsed: u64) {
            action.on_start(&mut self.ctx());
            action.on_update(&mut self.ctx(), elapsed);
            action.on_finish(&mut self.ctx());
        }
    }

    #[test]
    fn foil_attack_damages_the_enemy_on_finish() {
        let mut fx = Fixture::new(SpellElement::Fire);
        let mut spell = PlayerAttackSpell::default();
        spell.init(PlayerId::from("p1"), SpellElement::Water, SpellAccuracy::Perfect);

        spell.on_start(&mut fx.ctx());
        assert_eq!(spell.execution_time(), 3_000);
        assert_eq!(spell.outcome(), AttackOutcome::Damage(3));
        assert_eq!(fx.battle.enemy_health(), 20);

        spell.on_finish(&mut fx.ctx());
        assert_eq!(fx.battle.enemy_health(), 17);
        assert!(fx.cues.contains(&Cue::LaunchPlayerSpell {
            caster: PlayerId::from("p1"),
            element: SpellElement::Water,
            scale: 1.25,
            flight_ms: 2_250,
            explodes: true,
        }));
    }

    #[test]
    fn same_element_attack_heals_the_enemy() {
        let mut fx = Fixture::new(SpellElement::Air);
        fx.battle.update_enemy_health(-10);
        let mut spell = PlayerAttackSpell::default();
        spell.init(PlayerId::from("p1"), SpellElement::Air, SpellAccuracy::Good);

        fx.run(&mut spell, 100);

        assert_eq!(fx.battle.enemy_health(), 13);
        assert!(fx.cues.contains(&Cue::Sound(Sound::Heal)));
    }

    #[test]
    fn reused_attack_forgets_previous_outcome() {
        let mut fx = Fixture::new(SpellElement::Earth);
        let mut spell = PlayerAttackSpell::default();
        spell.init(PlayerId::from("p1"), SpellElement::Air, SpellAccuracy::Good);
        fx.run(&mut spell, 0);

        spell.init(PlayerId::from("p1"), SpellElement::Fire, SpellAccuracy::Good);
        assert_eq!(spell.outcome(), AttackOutcome::NoEffect);
        assert_eq!(spell.execution_time(), 0);
    }

    #[test]
    fn attack_without_caster_asks_to_finish() {
        let mut fx = Fixture::new(SpellElement::Fire);
        let mut spell = PlayerAttackSpell::default();

        spell.on_start(&mut fx.ctx());

        assert!(spell.should_finish_on_next_update());
        assert!(fx.cues.is_empty());
    }

    #[test]
    fn attack_from_departed_caster_has_no_effect() {
        let mut fx = Fixture::new(SpellElement::Fire);
        let mut spell = PlayerAttackSpell::default();
        spell.init(PlayerId::from("p1"), SpellElement::Water, SpellAccuracy::Perfect);
        fx.battle.remove_player(&PlayerId::from("p1"));

        fx.run(&mut spell, 0);

        assert!(spell.should_finish_on_next_update());
        assert_eq!(fx.battle.enemy_health(), 20);
        assert!(fx.cues.is_empty());
    }

    #[test]
    fn heal_shows_visual_after_delay_and_uses_bonus() {
        let mut fx = Fixture::new(SpellElement::Fire);
        fx.battle.update_party_health(-5);
        let mut rng = crate::env::GameRng::new(0);
        fx.battle.assign_bonuses(&mut rng, &[PlayerBonus::Heal]);

        let mut spell = PlayerHealSpell::default();
        spell.init(PlayerId::from("p1"), SpellAccuracy::Great);
        spell.on_start(&mut fx.ctx());

        spell.on_update(&mut fx.ctx(), 500);
        assert!(!fx.cues.contains(&Cue::HealOn(SpellAccuracy::Great)));
        spell.on_update(&mut fx.ctx(), 501);
        spell.on_update(&mut fx.ctx(), 900);
        let shown = fx
            .cues
            .iter()
            .filter(|cue| **cue == Cue::HealOn(SpellAccuracy::Great))
            .count();
        assert_eq!(shown, 1);

        spell.on_finish(&mut fx.ctx());
        assert_eq!(fx.battle.party_health(), 8);
    }

    #[test]
    fn shield_from_departed_caster_is_not_counted() {
        let mut fx = Fixture::new(SpellElement::Fire);
        fx.battle.raise_shield(2).unwrap();
        let mut spell = PlayerShieldSpell::default();
        spell.init(PlayerId::from("p1"), SpellAccuracy::Perfect);
        fx.battle.remove_player(&PlayerId::from("p1"));

        fx.run(&mut spell, 600);

        assert!(spell.should_finish_on_next_update());
        assert_eq!(spell.effect(), ShieldEffect::Ignored);
        assert_eq!(fx.battle.shield_casts_this_round(), 0);
        assert_eq!(fx.battle.party_shield(), 2);
        assert!(!fx.cues.iter().any(|cue| matches!(cue, Cue::MoveForward(_))));
    }

    #[test]
    fn shields_stack_raise_then_disrupt_then_ignore() {
        let mut fx = Fixture::new(SpellElement::Fire);
        let mut first = PlayerShieldSpell::default();
        let mut second = PlayerShieldSpell::default();
        let mut third = PlayerShieldSpell::default();
        first.init(PlayerId::from("p1"), SpellAccuracy::Great);
        second.init(PlayerId::from("p1"), SpellAccuracy::Perfect);
        third.init(PlayerId::from("p1"), SpellAccuracy::Perfect);

        fx.run(&mut first, 600);
        assert_eq!(first.effect(), ShieldEffect::Raise(3));
        assert_eq!(fx.battle.party_shield(), 3);

        fx.run(&mut second, 600);
        assert_eq!(second.effect(), ShieldEffect::Disrupt);
        assert_eq!(fx.battle.party_shield(), 0);

        fx.battle.raise_shield(2).unwrap();
        third.on_start(&mut fx.ctx());
        assert_eq!(third.effect(), ShieldEffect::Ignored);
        assert_eq!(third.execution_time(), 100);
        third.on_update(&mut fx.ctx(), 600);
        third.on_finish(&mut fx.ctx());
        assert_eq!(fx.battle.party_shield(), 2);
        assert_eq!(fx.battle.shield_casts_this_round(), 3);
    }
}

//! Per-kind object pools and kind-tagged handles.

use object_pool::{ObjectPool, PoolError, PoolHandle};

use crate::action::kinds::{
    CountdownAction, EnemyAttackSpell, EnemyDeathAction, FullScreenDisplayAction,
    PartyDeathAction, PlayerAttackSpell, PlayerHealSpell, PlayerShieldSpell,
};
use crate::action::TimedAction;
use crate::battle::PlayerId;
use crate::config::PoolConfig;
use crate::presentation::DisplayId;
use crate::protocol::{SpellAccuracy, SpellElement};

/// Closed set of action kinds. Each kind has its own pool.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    PlayerAttack,
    PlayerHeal,
    PlayerShield,
    EnemyAttack,
    EnemyDeath,
    PartyDeath,
    Countdown,
    FullScreenDisplay,
}

/// A checked-out action: its kind plus a handle into that kind's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub kind: ActionKind,
    pub handle: PoolHandle,
}

impl core::fmt::Display for ActionRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.kind, self.handle)
    }
}

/// One pool per action kind.
pub struct ActionPools {
    player_attack: ObjectPool<PlayerAttackSpell>,
    player_heal: ObjectPool<PlayerHealSpell>,
    player_shield: ObjectPool<PlayerShieldSpell>,
    enemy_attack: ObjectPool<EnemyAttackSpell>,
    enemy_death: ObjectPool<EnemyDeathAction>,
    party_death: ObjectPool<PartyDeathAction>,
    countdown: ObjectPool<CountdownAction>,
    full_screen_display: ObjectPool<FullScreenDisplayAction>,
}

impl ActionPools {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            player_attack: ObjectPool::new(
                "PlayerAttackSpell",
                config.player_attack,
                PlayerAttackSpell::default,
            ),
            player_heal: ObjectPool::new(
                "PlayerHealSpell",
                config.player_heal,
                PlayerHealSpell::default,
            ),
            player_shield: ObjectPool::new(
                "PlayerShieldSpell",
                config.player_shield,
                PlayerShieldSpell::default,
            ),
            enemy_attack: ObjectPool::new(
                "EnemyAttackSpell",
                config.enemy_attack,
                EnemyAttackSpell::default,
            ),
            enemy_death: ObjectPool::new(
                "EnemyDeathAction",
                config.enemy_death,
                EnemyDeathAction::default,
            ),
            party_death: ObjectPool::new(
                "PartyDeathAction",
                config.party_death,
                PartyDeathAction::default,
            ),
            countdown: ObjectPool::new(
                "CountdownAction",
                config.countdown,
                CountdownAction::default,
            ),
            full_screen_display: ObjectPool::new(
                "FullScreenDisplayAction",
                config.full_screen_display,
                FullScreenDisplayAction::default,
            ),
        }
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    pub fn player_attack(
        &mut self,
        caster: PlayerId,
        element: SpellElement,
        accuracy: SpellAccuracy,
    ) -> ActionRef {
        let handle = self.player_attack.borrow();
        if let Some(action) = self.player_attack.get_mut(handle) {
            action.init(caster, element, accuracy);
        }
        ActionRef {
            kind: ActionKind::PlayerAttack,
            handle,
        }
    }

    pub fn player_heal(&mut self, caster: PlayerId, accuracy: SpellAccuracy) -> ActionRef {
        let handle = self.player_heal.borrow();
        if let Some(action) = self.player_heal.get_mut(handle) {
            action.init(caster, accuracy);
        }
        ActionRef {
            kind: ActionKind::PlayerHeal,
            handle,
        }
    }

    pub fn player_shield(&mut self, caster: PlayerId, accuracy: SpellAccuracy) -> ActionRef {
        let handle = self.player_shield.borrow();
        if let Some(action) = self.player_shield.get_mut(handle) {
            action.init(caster, accuracy);
        }
        ActionRef {
            kind: ActionKind::PlayerShield,
            handle,
        }
    }

    pub fn enemy_attack(
        &mut self,
        target: PlayerId,
        element: SpellElement,
        strength: u32,
    ) -> ActionRef {
        let handle = self.enemy_attack.borrow();
        if let Some(action) = self.enemy_attack.get_mut(handle) {
            action.init(target, element, strength);
        }
        ActionRef {
            kind: ActionKind::EnemyAttack,
            handle,
        }
    }

    pub fn enemy_death(&mut self) -> ActionRef {
        let handle = self.enemy_death.borrow();
        if let Some(action) = self.enemy_death.get_mut(handle) {
            action.init();
        }
        ActionRef {
            kind: ActionKind::EnemyDeath,
            handle,
        }
    }

    pub fn party_death(&mut self) -> ActionRef {
        let handle = self.party_death.borrow();
        if let Some(action) = self.party_death.get_mut(handle) {
            action.init();
        }
        ActionRef {
            kind: ActionKind::PartyDeath,
            handle,
        }
    }

    pub fn countdown(&mut self) -> ActionRef {
        let handle = self.countdown.borrow();
        if let Some(action) = self.countdown.get_mut(handle) {
            action.init();
        }
        ActionRef {
            kind: ActionKind::Countdown,
            handle,
        }
    }

    pub fn full_screen_display(&mut self, display: DisplayId, duration: u64) -> ActionRef {
        let handle = self.full_screen_display.borrow();
        if let Some(action) = self.full_screen_display.get_mut(handle) {
            action.init(display, duration);
        }
        ActionRef {
            kind: ActionKind::FullScreenDisplay,
            handle,
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Resolves a checked-out action.
    pub fn get_mut(&mut self, action: ActionRef) -> Option<&mut dyn TimedAction> {
        let handle = action.handle;
        match action.kind {
            ActionKind::PlayerAttack => as_dyn(self.player_attack.get_mut(handle)),
            ActionKind::PlayerHeal => as_dyn(self.player_heal.get_mut(handle)),
            ActionKind::PlayerShield => as_dyn(self.player_shield.get_mut(handle)),
            ActionKind::EnemyAttack => as_dyn(self.enemy_attack.get_mut(handle)),
            ActionKind::EnemyDeath => as_dyn(self.enemy_death.get_mut(handle)),
            ActionKind::PartyDeath => as_dyn(self.party_death.get_mut(handle)),
            ActionKind::Countdown => as_dyn(self.countdown.get_mut(handle)),
            ActionKind::FullScreenDisplay => as_dyn(self.full_screen_display.get_mut(handle)),
        }
    }

    pub fn is_live(&self, action: ActionRef) -> bool {
        let handle = action.handle;
        match action.kind {
            ActionKind::PlayerAttack => self.player_attack.is_borrowed(handle),
            ActionKind::PlayerHeal => self.player_heal.is_borrowed(handle),
            ActionKind::PlayerShield => self.player_shield.is_borrowed(handle),
            ActionKind::EnemyAttack => self.enemy_attack.is_borrowed(handle),
            ActionKind::EnemyDeath => self.enemy_death.is_borrowed(handle),
            ActionKind::PartyDeath => self.party_death.is_borrowed(handle),
            ActionKind::Countdown => self.countdown.is_borrowed(handle),
            ActionKind::FullScreenDisplay => self.full_screen_display.is_borrowed(handle),
        }
    }

    /// Returns an action to its kind's pool.
    pub fn release(&mut self, action: ActionRef) -> Result<(), PoolError> {
        let handle = action.handle;
        match action.kind {
            ActionKind::PlayerAttack => self.player_attack.release(handle),
            ActionKind::PlayerHeal => self.player_heal.release(handle),
            ActionKind::PlayerShield => self.player_shield.release(handle),
            ActionKind::EnemyAttack => self.enemy_attack.release(handle),
            ActionKind::EnemyDeath => self.enemy_death.release(handle),
            ActionKind::PartyDeath => self.party_death.release(handle),
            ActionKind::Countdown => self.countdown.release(handle),
            ActionKind::FullScreenDisplay => self.full_screen_display.release(handle),
        }
    }

    /// Number of checked-out actions of `kind`.
    pub fn borrowed_count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::PlayerAttack => self.player_attack.borrowed_count(),
            ActionKind::PlayerHeal => self.player_heal.borrowed_count(),
            ActionKind::PlayerShield => self.player_shield.borrowed_count(),
            ActionKind::EnemyAttack => self.enemy_attack.borrowed_count(),
            ActionKind::EnemyDeath => self.enemy_death.borrowed_count(),
            ActionKind::PartyDeath => self.party_death.borrowed_count(),
            ActionKind::Countdown => self.countdown.borrowed_count(),
            ActionKind::FullScreenDisplay => self.full_screen_display.borrowed_count(),
        }
    }

    /// Number of checked-out actions across all kinds.
    pub fn total_borrowed(&self) -> usize {
        use strum::IntoEnumIterator;
        ActionKind::iter().map(|kind| self.borrowed_count(kind)).sum()
    }

    pub fn player_attack_spell(&self, action: ActionRef) -> Option<&PlayerAttackSpell> {
        match action.kind {
            ActionKind::PlayerAttack => self.player_attack.get(action.handle),
            _ => None,
        }
    }

    pub fn enemy_attack_spell(&self, action: ActionRef) -> Option<&EnemyAttackSpell> {
        match action.kind {
            ActionKind::EnemyAttack => self.enemy_attack.get(action.handle),
            _ => None,
        }
    }
}

impl core::fmt::Debug for ActionPools {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionPools")
            .field("borrowed", &self.total_borrowed())
            .finish()
    }
}

fn as_dyn<A: TimedAction + 'static>(action: Option<&mut A>) -> Option<&mut dyn TimedAction> {
    action.map(|action| action as &mut dyn TimedAction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_initializes_and_release_returns_to_the_right_pool() {
        let mut pools = ActionPools::new(&PoolConfig::default());

        let attack = pools.player_attack(
            PlayerId::from("p1"),
            SpellElement::Fire,
            SpellAccuracy::Good,
        );
        let death = pools.enemy_death();

        assert_eq!(attack.kind, ActionKind::PlayerAttack);
        assert_eq!(
            pools.player_attack_spell(attack).and_then(|a| a.caster()),
            Some(&PlayerId::from("p1"))
        );
        assert_eq!(pools.total_borrowed(), 2);

        pools.release(attack).unwrap();
        assert!(!pools.is_live(attack));
        assert!(pools.get_mut(attack).is_none());
        assert!(pools.is_live(death));
        assert_eq!(pools.borrowed_count(ActionKind::EnemyDeath), 1);
    }

    #[test]
    fn double_release_is_an_error() {
        let mut pools = ActionPools::new(&PoolConfig::default());
        let countdown = pools.countdown();

        pools.release(countdown).unwrap();
        assert!(pools.release(countdown).is_err());
    }

    #[test]
    fn mistagged_handle_does_not_resolve() {
        let mut pools = ActionPools::new(&PoolConfig::default());
        let heal = pools.player_heal(PlayerId::from("p1"), SpellAccuracy::Great);

        let forged = ActionRef {
            kind: ActionKind::PlayerShield,
            handle: heal.handle,
        };
        assert!(pools.get_mut(forged).is_none());
        assert!(matches!(
            pools.release(forged),
            Err(PoolError::NothingBorrowed { .. })
        ));
    }
}

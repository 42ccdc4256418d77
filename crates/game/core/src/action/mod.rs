//! Timed actions.
//!
//! An action is a unit of combat behavior that occupies the battlefield for a
//! number of milliseconds. The [`ActionEngine`](crate::engine::ActionEngine)
//! drives exactly one action at a time through
//! `on_start -> on_update* -> on_finish`.
//!
//! # Module Structure
//!
//! - `kinds`: The eight concrete action kinds
//! - `pools`: One object pool per kind, plus kind-tagged handles
//! - `catalog`: Translates submitted spells into pooled actions
//!
//! # Lifecycle
//!
//! Action objects are constructed once per pool slot. Each checkout
//! re-initializes every field, so no state leaks between uses. A checked-out
//! action is referenced by a single [`ActionRef`] that lives in exactly one
//! action list until the engine releases it.

pub mod catalog;
pub mod kinds;
pub mod pools;

pub use catalog::ActionCatalog;
pub use kinds::{
    CountdownAction, EnemyAttackSpell, EnemyDeathAction, FullScreenDisplayAction,
    PartyDeathAction, PlayerAttackSpell, PlayerHealSpell, PlayerShieldSpell, ShieldEffect,
};
pub use pools::{ActionKind, ActionPools, ActionRef};

use crate::battle::Battle;
use crate::config::GameConfig;
use crate::presentation::{Cue, Presenter};
use crate::protocol::SpellAccuracy;

/// Defines how a concrete action kind behaves over time.
///
/// All timing is expressed as milliseconds elapsed since `on_start`; the
/// engine accounts for pauses before computing it.
pub trait TimedAction {
    /// Declared duration. May be computed in `on_start`.
    fn execution_time(&self) -> u64;

    /// Requests that the engine finish this action on the next update,
    /// regardless of elapsed time.
    fn should_finish_on_next_update(&self) -> bool {
        false
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>);

    fn on_update(&mut self, _ctx: &mut ActionContext<'_>, _elapsed: u64) {}

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>);
}

/// Mutable view of the game handed to actions.
pub struct ActionContext<'a> {
    pub battle: &'a mut Battle,
    pub presenter: &'a mut dyn Presenter,
    pub config: &'a GameConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        battle: &'a mut Battle,
        presenter: &'a mut dyn Presenter,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            battle,
            presenter,
            config,
        }
    }

    /// Reborrows the context for a shorter scope.
    pub fn reborrow(&mut self) -> ActionContext<'_> {
        ActionContext {
            battle: &mut *self.battle,
            presenter: &mut *self.presenter,
            config: self.config,
        }
    }

    #[inline]
    pub fn cue(&mut self, cue: Cue) {
        self.presenter.cue(cue);
    }

    pub fn update_party_health(&mut self, delta: i64) -> u32 {
        let health = self.battle.update_party_health(delta);
        self.cue(Cue::PartyHealth {
            health,
            max: self.battle.party_max_health(),
        });
        health
    }

    pub fn update_enemy_health(&mut self, delta: i64) -> u32 {
        let health = self.battle.update_enemy_health(delta);
        self.cue(Cue::EnemyHealth {
            health,
            max: self.battle.enemy_max_health(),
        });
        health
    }

    /// Raises the party shield; invalid values are logged and ignored.
    pub fn enable_party_shield(&mut self, value: u32, accuracy: SpellAccuracy, bonus: bool) {
        match self.battle.raise_shield(value) {
            Ok(true) => self.cue(Cue::ShieldUp {
                value,
                accuracy,
                bonus,
            }),
            Ok(false) => {}
            Err(error) => tracing::error!(%error, "party shield not raised"),
        }
    }

    pub fn disable_party_shield(&mut self) {
        if self.battle.disable_shield() {
            self.cue(Cue::ShieldDown);
        }
    }

    pub fn enable_heal(&mut self, accuracy: SpellAccuracy) {
        self.cue(Cue::HealOn(accuracy));
    }

    pub fn disable_heal(&mut self) {
        self.cue(Cue::HealOff);
    }
}

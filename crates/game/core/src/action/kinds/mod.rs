//! Concrete action kinds.

mod display;
mod enemy;
mod spells;

pub use display::{COUNTDOWN_LABELS, CountdownAction, FullScreenDisplayAction, WAITING_FOR_SPELLS_TEXT};
pub use enemy::{EnemyAttackSpell, EnemyDeathAction, PartyDeathAction};
pub use spells::{PlayerAttackSpell, PlayerHealSpell, PlayerShieldSpell, ShieldEffect};

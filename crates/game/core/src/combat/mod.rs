//! Combat resolution rules.
//!
//! Pure functions over [`BalanceConfig`]; actions call them and apply the
//! results to the [`Battle`](crate::battle::Battle).
//!
//! # Rules
//!
//! - An attack damages the enemy only when its element is the foil of the
//!   enemy element (FIRE/WATER, AIR/EARTH)
//! - Hitting the enemy with its own element heals it instead
//! - Bonuses are additive and applied before health clamping

pub mod damage;

pub use damage::{AttackOutcome, attack_outcome, enemy_damage, heal_value, shield_value};

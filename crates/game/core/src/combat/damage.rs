//! Damage, heal and shield values.

use crate::config::{BalanceConfig, GameConfig};
use crate::protocol::{PlayerBonus, SpellAccuracy, SpellElement};

/// What a player attack does to the enemy once it lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    /// Enemy loses this much health.
    Damage(u32),
    /// Attack matched the enemy element; the enemy regains this much health.
    EnemyHeal(u32),
    #[default]
    NoEffect,
}

impl AttackOutcome {
    /// Signed change applied to enemy health.
    pub fn enemy_health_delta(self) -> i64 {
        match self {
            AttackOutcome::Damage(damage) => -(damage as i64),
            AttackOutcome::EnemyHeal(heal) => heal as i64,
            AttackOutcome::NoEffect => 0,
        }
    }

    pub fn is_damage(self) -> bool {
        matches!(self, AttackOutcome::Damage(damage) if damage > 0)
    }
}

/// Resolves a player attack against an enemy of element `enemy`.
pub fn attack_outcome(
    attack: SpellElement,
    enemy: SpellElement,
    accuracy: SpellAccuracy,
    bonus: PlayerBonus,
    balance: &BalanceConfig,
) -> AttackOutcome {
    let Some(foil) = enemy.foil() else {
        // No enemy on the field.
        return AttackOutcome::NoEffect;
    };

    if attack == enemy {
        return AttackOutcome::EnemyHeal(balance.enemy_heal_value);
    }
    if attack != foil {
        return AttackOutcome::NoEffect;
    }

    let mut damage = balance.attack_damage.get(accuracy);
    if bonus == PlayerBonus::Attack {
        damage += balance.attack_bonus;
    }
    AttackOutcome::Damage(damage)
}

/// Party health restored by a heal spell.
pub fn heal_value(accuracy: SpellAccuracy, bonus: PlayerBonus, balance: &BalanceConfig) -> u32 {
    let mut value = balance.heal_value.get(accuracy);
    if bonus == PlayerBonus::Heal {
        value += balance.heal_bonus;
    }
    value
}

/// Shield strength raised by the first shield spell of a round.
pub fn shield_value(accuracy: SpellAccuracy, bonus: PlayerBonus, balance: &BalanceConfig) -> u32 {
    let mut value = balance.shield_value.get(accuracy);
    if bonus == PlayerBonus::Shield {
        value += balance.shield_bonus;
    }
    value
}

/// Damage an enemy attack of `strength` deals to the party.
///
/// ```text
/// damage = max(strength + party_bonus[party_size] - shield, 0)
/// ```
pub fn enemy_damage(strength: u32, party_size: usize, shield: u32, balance: &BalanceConfig) -> u32 {
    let bonus = balance.enemy_party_bonus[party_size.min(GameConfig::MAX_PLAYERS)];
    (strength + bonus).saturating_sub(shield)
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpellElement::{Air, Earth, Fire, Water};

    fn outcome(attack: SpellElement, enemy: SpellElement) -> AttackOutcome {
        attack_outcome(
            attack,
            enemy,
            SpellAccuracy::Great,
            PlayerBonus::None,
            &BalanceConfig::default(),
        )
    }

    #[test]
    fn only_the_foil_element_deals_damage() {
        assert_eq!(outcome(Water, Fire), AttackOutcome::Damage(2));
        assert_eq!(outcome(Fire, Water), AttackOutcome::Damage(2));
        assert_eq!(outcome(Air, Earth), AttackOutcome::Damage(2));
        assert_eq!(outcome(Earth, Air), AttackOutcome::Damage(2));

        assert_eq!(outcome(Air, Fire), AttackOutcome::NoEffect);
        assert_eq!(outcome(Earth, Water), AttackOutcome::NoEffect);
        assert_eq!(outcome(SpellElement::None, Water), AttackOutcome::NoEffect);
    }

    #[test]
    fn matching_element_heals_the_enemy() {
        for element in SpellElement::ENEMY_ELEMENTS {
            assert_eq!(outcome(element, element), AttackOutcome::EnemyHeal(3));
        }
    }

    #[test]
    fn attacks_without_an_enemy_do_nothing() {
        assert_eq!(outcome(Fire, SpellElement::None), AttackOutcome::NoEffect);
        assert_eq!(outcome(SpellElement::None, SpellElement::None), AttackOutcome::NoEffect);
    }

    #[test]
    fn bonuses_add_one() {
        let balance = BalanceConfig::default();
        assert_eq!(
            attack_outcome(Water, Fire, SpellAccuracy::Perfect, PlayerBonus::Attack, &balance),
            AttackOutcome::Damage(4)
        );
        assert_eq!(heal_value(SpellAccuracy::Good, PlayerBonus::Heal, &balance), 2);
        assert_eq!(heal_value(SpellAccuracy::Good, PlayerBonus::Shield, &balance), 1);
        assert_eq!(shield_value(SpellAccuracy::Perfect, PlayerBonus::Shield, &balance), 5);
    }

    #[test]
    fn enemy_damage_scales_with_party_and_is_absorbed_by_shield() {
        let balance = BalanceConfig::default();
        assert_eq!(enemy_damage(4, 1, 0, &balance), 4);
        assert_eq!(enemy_damage(5, 3, 0, &balance), 11);
        assert_eq!(enemy_damage(6, 4, 4, &balance), 11);
        assert_eq!(enemy_damage(4, 1, 9, &balance), 0);
    }
}

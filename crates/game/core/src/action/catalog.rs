//! Translation of submitted spells into actions.

use crate::action::{ActionPools, ActionRef};
use crate::battle::PlayerId;
use crate::engine::{ActionEngine, ActionList};
use crate::protocol::{Spell, SpellType};

/// Maps spell intents to pooled action instances.
pub struct ActionCatalog;

impl ActionCatalog {
    /// Checks out the action that carries out `spell` for `caster`.
    pub fn action_for(pools: &mut ActionPools, caster: &PlayerId, spell: &Spell) -> ActionRef {
        match spell.spell_type {
            SpellType::Attack => {
                pools.player_attack(caster.clone(), spell.spell_element, spell.spell_accuracy)
            }
            SpellType::Heal => pools.player_heal(caster.clone(), spell.spell_accuracy),
            SpellType::Shield => pools.player_shield(caster.clone(), spell.spell_accuracy),
        }
    }

    /// Builds an action list for `spells`, preserving their order.
    pub fn parse(engine: &mut ActionEngine, caster: &PlayerId, spells: &[Spell]) -> ActionList {
        let mut list = engine.action_list();
        for spell in spells {
            list.push(Self::action_for(engine.pools_mut(), caster, spell));
        }
        tracing::debug!(caster = %caster, actions = list.len(), "parsed spells");
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::config::PoolConfig;
    use crate::protocol::{SpellAccuracy, SpellElement};

    #[test]
    fn spells_map_to_actions_in_order() {
        let mut engine = ActionEngine::new(&PoolConfig::default());
        let spells = [
            Spell::shield(SpellAccuracy::Good),
            Spell::attack(SpellElement::Air, SpellAccuracy::Great),
            Spell::heal(SpellAccuracy::Perfect),
        ];

        let list = ActionCatalog::parse(&mut engine, &PlayerId::from("p1"), &spells);

        let kinds: Vec<ActionKind> = list.iter().map(|action| action.kind).collect();
        assert_eq!(
            kinds,
            [
                ActionKind::PlayerShield,
                ActionKind::PlayerAttack,
                ActionKind::PlayerHeal
            ]
        );
        engine.release_action_list(list).unwrap();
        assert_eq!(engine.pools().total_borrowed(), 0);
    }

    #[test]
    fn empty_submission_yields_an_empty_list() {
        let mut engine = ActionEngine::new(&PoolConfig::default());
        let list = ActionCatalog::parse(&mut engine, &PlayerId::from("p1"), &[]);
        assert!(list.is_empty());
        engine.release_action_list(list).unwrap();
    }
}

//! Spells submitted during one round, per player.
use arrayvec::ArrayVec;

use game_core::{ActionEngine, ActionList, GameConfig, GameError, PlayerId};

/// Action lists received during player action, in first-submission order.
///
/// A player who submits again replaces their earlier list in place.
#[derive(Debug, Default)]
pub struct RoundState {
    submissions: ArrayVec<(PlayerId, ActionList), { GameConfig::MAX_PLAYERS }>,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `actions` for `player`, releasing any list it replaces.
    ///
    /// Returns `false` and releases `actions` when the round is full.
    pub fn submit(&mut self, engine: &mut ActionEngine, player: PlayerId, actions: ActionList) -> bool {
        if let Some((_, slot)) = self.submissions.iter_mut().find(|(id, _)| id == &player) {
            let previous = std::mem::replace(slot, actions);
            release_logged(engine, previous);
            tracing::debug!(%player, "submission replaced");
            return true;
        }

        match self.submissions.try_push((player, actions)) {
            Ok(()) => true,
            Err(rejected) => {
                let (player, actions) = rejected.element();
                tracing::warn!(%player, "round is full, submission dropped");
                release_logged(engine, actions);
                false
            }
        }
    }

    /// Drops `player`'s submission. Returns whether there was one.
    pub fn withdraw(&mut self, engine: &mut ActionEngine, player: &PlayerId) -> bool {
        let Some(index) = self.submissions.iter().position(|(id, _)| id == player) else {
            return false;
        };
        let (_, actions) = self.submissions.remove(index);
        release_logged(engine, actions);
        true
    }

    pub fn submitted_count(&self) -> usize {
        self.submissions.len()
    }

    pub fn has_submitted(&self, player: &PlayerId) -> bool {
        self.submissions.iter().any(|(id, _)| id == player)
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// Releases every submission and the actions in it.
    pub fn clear(&mut self, engine: &mut ActionEngine) {
        for (_, actions) in self.submissions.drain(..) {
            release_logged(engine, actions);
        }
    }

    /// Moves every submitted action into one list, round-robin by slot:
    /// each player's first action, then each player's second, and so on.
    ///
    /// The emptied per-player lists are returned to the engine right away,
    /// so no action is ever held by two lists.
    pub fn interleave(&mut self, engine: &mut ActionEngine) -> ActionList {
        let mut merged = engine.action_list();
        loop {
            let mut moved = false;
            for (_, actions) in self.submissions.iter_mut() {
                if let Some(action) = actions.pop_front() {
                    merged.push(action);
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }

        for (_, emptied) in self.submissions.drain(..) {
            if let Err(error) = engine.release_list_only(emptied) {
                tracing::error!(code = error.error_code(), %error, "submission list release failed");
            }
        }
        tracing::debug!(actions = merged.len(), "round interleaved");
        merged
    }
}

fn release_logged(engine: &mut ActionEngine, actions: ActionList) {
    if let Err(error) = engine.release_action_list(actions) {
        tracing::error!(code = error.error_code(), %error, "submission release failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{
        ActionCatalog, ActionKind, PoolConfig, Spell, SpellAccuracy, SpellElement,
    };

    fn attacks(engine: &mut ActionEngine, player: &str, count: usize) -> ActionList {
        let spells = vec![Spell::attack(SpellElement::Fire, SpellAccuracy::Good); count];
        ActionCatalog::parse(engine, &PlayerId::from(player), &spells)
    }

    fn caster_of(engine: &ActionEngine, list: &ActionList, index: usize) -> String {
        let action = list.get(index).unwrap();
        engine
            .pools()
            .player_attack_spell(action)
            .and_then(|spell| spell.caster())
            .map(|id| id.to_string())
            .unwrap()
    }

    #[test]
    fn interleaves_round_robin_by_slot() {
        let mut engine = ActionEngine::new(&PoolConfig::default());
        let mut round = RoundState::new();
        let a = attacks(&mut engine, "a", 2);
        let b = attacks(&mut engine, "b", 1);
        round.submit(&mut engine, PlayerId::from("a"), a);
        round.submit(&mut engine, PlayerId::from("b"), b);

        let merged = round.interleave(&mut engine);

        let order: Vec<String> = (0..merged.len())
            .map(|index| caster_of(&engine, &merged, index))
            .collect();
        assert_eq!(order, ["a", "b", "a"]);
        assert!(round.is_empty());
        assert_eq!(engine.lists_in_use(), 1);
    }

    #[test]
    fn resubmission_replaces_and_releases() {
        let mut engine = ActionEngine::new(&PoolConfig::default());
        let mut round = RoundState::new();
        let first = attacks(&mut engine, "a", 3);
        round.submit(&mut engine, PlayerId::from("a"), first);
        let second = attacks(&mut engine, "a", 1);
        round.submit(&mut engine, PlayerId::from("a"), second);

        assert_eq!(round.submitted_count(), 1);
        assert_eq!(engine.pools().borrowed_count(ActionKind::PlayerAttack), 1);
    }

    #[test]
    fn withdraw_and_clear_return_everything() {
        let mut engine = ActionEngine::new(&PoolConfig::default());
        let mut round = RoundState::new();
        for player in ["a", "b"] {
            let list = attacks(&mut engine, player, 2);
            round.submit(&mut engine, PlayerId::from(player), list);
        }

        assert!(round.withdraw(&mut engine, &PlayerId::from("a")));
        assert!(!round.withdraw(&mut engine, &PlayerId::from("a")));
        assert!(round.has_submitted(&PlayerId::from("b")));

        round.clear(&mut engine);
        assert_eq!(engine.pools().total_borrowed(), 0);
        assert_eq!(engine.lists_in_use(), 0);
    }
}

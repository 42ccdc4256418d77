//! Round-robin merging of submitted spell lists.

use game_core::{ActionEngine, ActionRef, GameConfig, PlayerId, SpellAccuracy};
use proptest::prelude::*;
use runtime::RoundState;

fn submit_heals(
    engine: &mut ActionEngine,
    round: &mut RoundState,
    player: &str,
    count: usize,
) -> Vec<ActionRef> {
    let mut list = engine.action_list();
    let mut refs = Vec::with_capacity(count);
    for _ in 0..count {
        let action = engine
            .pools_mut()
            .player_heal(PlayerId::from(player), SpellAccuracy::Good);
        list.push(action);
        refs.push(action);
    }
    assert!(round.submit(engine, PlayerId::from(player), list));
    refs
}

#[test]
fn two_players_merge_as_first_second_first() {
    let config = GameConfig::default();
    let mut engine = ActionEngine::new(&config.pools);
    let mut round = RoundState::new();

    let a = submit_heals(&mut engine, &mut round, "a", 2);
    let b = submit_heals(&mut engine, &mut round, "b", 1);
    let merged = round.interleave(&mut engine);

    let order: Vec<_> = (0..merged.len()).filter_map(|i| merged.get(i)).collect();
    assert_eq!(order, vec![a[0], b[0], a[1]]);
    assert!(round.is_empty());
    engine.release_action_list(merged).unwrap();
    assert_eq!(engine.pools().total_borrowed(), 0);
    assert_eq!(engine.lists_in_use(), 0);
}

proptest! {
    #[test]
    fn merge_keeps_every_action_once_in_slot_order(
        lengths in prop::collection::vec(0usize..6, 1..=GameConfig::MAX_PLAYERS),
    ) {
        let config = GameConfig::default();
        let mut engine = ActionEngine::new(&config.pools);
        let mut round = RoundState::new();

        let names = ["a", "b", "c", "d"];
        let submitted: Vec<Vec<ActionRef>> = lengths
            .iter()
            .zip(names)
            .map(|(&count, name)| submit_heals(&mut engine, &mut round, name, count))
            .collect();

        let mut expected = Vec::new();
        let longest = lengths.iter().copied().max().unwrap_or(0);
        for slot in 0..longest {
            for refs in &submitted {
                if let Some(action) = refs.get(slot) {
                    expected.push(*action);
                }
            }
        }

        let merged = round.interleave(&mut engine);
        let order: Vec<_> = (0..merged.len()).filter_map(|i| merged.get(i)).collect();
        prop_assert_eq!(order, expected);
        prop_assert_eq!(engine.lists_in_use(), 1);

        engine.release_action_list(merged).unwrap();
        prop_assert_eq!(engine.pools().total_borrowed(), 0);
    }
}

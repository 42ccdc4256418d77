//! A full resolution round: submitted spells, shields, and the enemy reply.

use game_core::{
    ActionCatalog, ActionContext, ActionEngine, ActionList, Battle, Cue, GameConfig, PlayerId,
    Presenter, Spell, SpellAccuracy, SpellElement, Timestamp,
};

struct Round {
    engine: ActionEngine,
    battle: Battle,
    cues: Vec<Cue>,
    config: GameConfig,
    now: u64,
}

impl Round {
    fn new(players: &[&str], enemy: SpellElement) -> Self {
        let config = GameConfig::default();
        let mut battle = Battle::new();
        for (avatar, id) in players.iter().enumerate() {
            battle
                .add_player(PlayerId::from(*id), *id, avatar as u32)
                .unwrap();
        }
        battle.setup_world(players.len(), &config.balance);
        battle.set_enemy_element(enemy);
        Self {
            engine: ActionEngine::new(&config.pools),
            battle,
            cues: Vec::new(),
            config,
            now: 0,
        }
    }

    /// Interleaves per-player lists round-robin into one list.
    fn interleave(&mut self, mut lists: Vec<ActionList>) -> ActionList {
        let mut merged = self.engine.action_list();
        loop {
            let mut took = false;
            for list in lists.iter_mut() {
                if let Some(action) = list.pop_front() {
                    merged.push(action);
                    took = true;
                }
            }
            if !took {
                break;
            }
        }
        for list in lists {
            self.engine.release_list_only(list).unwrap();
        }
        merged
    }

    fn run_to_completion(&mut self) {
        while !self.engine.is_done() {
            let mut ctx = ActionContext::new(
                &mut self.battle,
                &mut self.cues as &mut dyn Presenter,
                &self.config,
            );
            self.engine.update(Timestamp(self.now), &mut ctx);
            self.now += 16;
            assert!(self.now < 120_000, "round never finished");
        }
    }
}

#[test]
fn shields_cancel_and_foil_attacks_land_in_round_robin_order() {
    let mut round = Round::new(&["a", "b"], SpellElement::Fire);
    let a = ActionCatalog::parse(
        &mut round.engine,
        &PlayerId::from("a"),
        &[
            Spell::shield(SpellAccuracy::Great),
            Spell::attack(SpellElement::Water, SpellAccuracy::Perfect),
        ],
    );
    let b = ActionCatalog::parse(
        &mut round.engine,
        &PlayerId::from("b"),
        &[
            Spell::shield(SpellAccuracy::Perfect),
            Spell::attack(SpellElement::Water, SpellAccuracy::Great),
        ],
    );
    let merged = round.interleave(vec![a, b]);
    assert_eq!(merged.len(), 4);
    round.engine.start_executing(merged);

    round.run_to_completion();

    assert_eq!(round.battle.enemy_health(), 40 - 3 - 2);
    assert_eq!(round.battle.party_shield(), 0);
    assert_eq!(round.battle.shield_casts_this_round(), 2);

    let shield_cues: Vec<&Cue> = round
        .cues
        .iter()
        .filter(|cue| matches!(cue, Cue::ShieldUp { .. } | Cue::ShieldDown))
        .collect();
    assert_eq!(
        shield_cues,
        vec![
            &Cue::ShieldUp {
                value: 3,
                accuracy: SpellAccuracy::Great,
                bonus: false,
            },
            &Cue::ShieldDown,
        ]
    );

    let forward: Vec<&PlayerId> = round
        .cues
        .iter()
        .filter_map(|cue| match cue {
            Cue::MoveForward(player) => Some(player),
            _ => None,
        })
        .collect();
    assert_eq!(
        forward,
        ["a", "b", "a", "b"].map(PlayerId::from).iter().collect::<Vec<_>>()
    );
    assert_eq!(round.engine.pools().total_borrowed(), 0);
    assert_eq!(round.engine.lists_in_use(), 0);
}

#[test]
fn raised_shield_absorbs_the_enemy_attack() {
    let mut round = Round::new(&["a", "b"], SpellElement::Air);
    let list = ActionCatalog::parse(
        &mut round.engine,
        &PlayerId::from("a"),
        &[Spell::shield(SpellAccuracy::Perfect)],
    );
    round.engine.start_executing(list);
    round.run_to_completion();
    assert_eq!(round.battle.party_shield(), 4);

    let attack = round
        .engine
        .pools_mut()
        .enemy_attack(PlayerId::from("b"), SpellElement::Air, 4);
    round.engine.start_single(attack);
    round.run_to_completion();

    assert_eq!(round.battle.party_health(), 20);
}

#[test]
fn unshielded_party_takes_strength_plus_party_bonus() {
    let mut round = Round::new(&["a", "b", "c", "d"], SpellElement::Earth);
    let attack = round
        .engine
        .pools_mut()
        .enemy_attack(PlayerId::from("c"), SpellElement::Earth, 6);
    round.engine.start_single(attack);

    round.run_to_completion();

    assert_eq!(round.battle.party_health(), 40 - (6 + 9));
    assert!(round.cues.contains(&Cue::PartyHealth {
        health: 25,
        max: 40,
    }));
}

#[test]
fn same_element_attack_cannot_overheal_the_enemy() {
    let mut round = Round::new(&["a"], SpellElement::Water);
    let list = ActionCatalog::parse(
        &mut round.engine,
        &PlayerId::from("a"),
        &[
            Spell::attack(SpellElement::Water, SpellAccuracy::Perfect),
            Spell::attack(SpellElement::Earth, SpellAccuracy::Perfect),
        ],
    );
    round.engine.start_executing(list);

    round.run_to_completion();

    assert_eq!(round.battle.enemy_health(), 20);
}

//! Whole games driven through the in-memory session, one frame at a time.

use tokio::sync::broadcast;

use game_core::{
    ActionKind, Cue, GameConfig, PhaseId, PlayerId, PlayerMessage, PlayerPlayingData, Spell, SpellAccuracy,
    SpellElement, SpellMessage, Timestamp, attack_outcome,
};
use runtime::{
    Event, EventBus, Game, GameplayState, LobbyState, LocalSession, PlayerRequest, PlayerState,
    RuntimeError, SessionHandle, SessionService, Topic,
};

const FRAME_MS: u64 = 20;

fn quick_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.timing.instructions_delay_ms = 100;
    config.timing.endgame_display_ms = 100;
    config.timing.countdown_ms = 300;
    config.timing.countdown_step_ms = 100;
    config
}

struct Table {
    game: Game<LocalSession, Vec<Cue>>,
    handle: SessionHandle,
    messages: broadcast::Receiver<Event>,
    health: broadcast::Receiver<Event>,
    now: u64,
}

impl Table {
    fn new(config: GameConfig) -> Self {
        let bus = EventBus::new();
        let session = LocalSession::new(bus.clone());
        let handle = session.handle();
        let messages = bus.subscribe(Topic::Player);
        let health = bus.subscribe(Topic::Battle);
        let mut game = Game::new(config, session, Vec::new(), bus, 7);
        game.start(Timestamp::ZERO).unwrap();
        Self {
            game,
            handle,
            messages,
            health,
            now: 0,
        }
    }

    /// Joins and readies `players`, then starts the game from the first.
    fn seated(players: &[&str], config: GameConfig) -> Self {
        let mut table = Self::new(config);
        for (avatar, id) in (0u32..).zip(players) {
            let player = PlayerId::from(*id);
            table.handle.join(&player).unwrap();
            table.handle.ready(&player, *id, avatar).unwrap();
        }
        table
            .handle
            .start(&PlayerId::from(players[0]), PlayerPlayingData::default())
            .unwrap();
        table.tick();
        table
    }

    fn tick(&mut self) {
        self.now += FRAME_MS;
        self.game.tick(Timestamp(self.now)).unwrap();
    }

    fn phase(&self) -> Option<PhaseId> {
        self.game.current_phase()
    }

    fn run_until(&mut self, phase: PhaseId) {
        let deadline = self.now + 120_000;
        while self.phase() != Some(phase) {
            assert!(self.now < deadline, "never reached {phase}, stuck in {:?}", self.phase());
            self.tick();
        }
    }

    /// Ticks until every connected party member got the round-start message.
    fn wait_for_round_start(&mut self) -> Vec<(PlayerId, PlayerMessage)> {
        self.run_until(PhaseId::PlayerAction);
        let expected = self.game.session().connected_count();
        let deadline = self.now + 10_000;
        let mut received = Vec::new();
        while received.len() < expected {
            assert!(self.now < deadline, "round never started");
            self.tick();
            while let Ok(event) = self.messages.try_recv() {
                if let Event::PlayerMessage { player, message } = event {
                    received.push((player, serde_json::from_value(message).unwrap()));
                }
            }
        }
        received
    }

    fn cast(&self, player: &str, spells: Vec<Spell>) {
        self.handle
            .cast_spells(&PlayerId::from(player), SpellMessage { spells })
            .unwrap();
    }

    fn running_action(&self) -> Option<ActionKind> {
        self.game.engine().current_action().map(|action| action.kind)
    }

    /// Ticks until `kind` is the action in flight and returns the frame it
    /// started on.
    fn run_until_action(&mut self, kind: ActionKind) -> u64 {
        let deadline = self.now + 60_000;
        while self.running_action() != Some(kind) {
            assert!(self.now < deadline, "{kind:?} never started");
            self.tick();
        }
        self.now
    }

    /// Idles `player`, holds the pause for `frames` frames, then resumes.
    /// Returns how long the game stayed paused.
    fn pause_for(&mut self, player: &str, frames: usize) -> u64 {
        self.send(PlayerRequest::Idle(PlayerId::from(player)));
        self.tick();
        assert_eq!(self.phase(), Some(PhaseId::Paused));
        let paused_at = self.now;
        for _ in 0..frames {
            self.tick();
        }
        assert_eq!(self.phase(), Some(PhaseId::Paused));

        self.send(PlayerRequest::Resume(PlayerId::from(player)));
        self.tick();
        self.now - paused_at
    }

    fn send(&self, request: PlayerRequest) {
        self.handle.send(request).unwrap();
    }

    fn state_of(&self, player: &str) -> PlayerState {
        self.game
            .session()
            .player(&PlayerId::from(player))
            .map(|info| info.state)
            .unwrap()
    }
}

#[test]
fn ticking_before_start_is_an_error() {
    let bus = EventBus::new();
    let session = LocalSession::new(bus.clone());
    let mut game = Game::new(GameConfig::default(), session, Vec::<Cue>::new(), bus, 1);

    assert!(matches!(
        game.tick(Timestamp::ZERO),
        Err(RuntimeError::NotStarted)
    ));
}

#[test]
fn lobby_seats_ready_players_and_the_host_starts_the_game() {
    let table = Table::seated(&["a", "b"], quick_config());

    assert_eq!(table.phase(), Some(PhaseId::Instructions));
    assert_eq!(table.game.battle().party_size(), 2);
    assert_eq!(table.state_of("a"), PlayerState::Playing);
    assert_eq!(table.state_of("b"), PlayerState::Playing);
    assert_eq!(table.game.session().lobby_state(), LobbyState::Closed);

    let host = table.game.session().player(&PlayerId::from("a")).unwrap();
    assert_eq!(host.data["host"], serde_json::Value::Bool(true));
}

#[test]
fn failed_session_events_are_dropped() {
    let mut table = Table::new(quick_config());
    table.handle.join(&PlayerId::from("a")).unwrap();
    table.cast("a", vec![Spell::heal(SpellAccuracy::Good)]);
    table.tick();

    assert_eq!(table.phase(), Some(PhaseId::WaitingForPlayers));
    assert_eq!(table.game.battle().party_size(), 0);
}

#[test]
fn foil_attacks_from_both_players_damage_the_enemy() {
    let config = quick_config();
    let mut table = Table::seated(&["a", "b"], config.clone());
    let notified = table.wait_for_round_start();
    assert_eq!(notified.len(), 2);
    assert!(notified.iter().all(|(_, message)| message.cast_duration_millis == 15_000));

    let battle = table.game.battle();
    let enemy = battle.enemy_element();
    let foil = enemy.foil().unwrap();
    let before = battle.enemy_health();
    let expected: u32 = ["a", "b"]
        .iter()
        .map(|id| {
            let bonus = battle.bonus(&PlayerId::from(*id));
            let outcome = attack_outcome(foil, enemy, SpellAccuracy::Great, bonus, &config.balance);
            (-outcome.enemy_health_delta()) as u32
        })
        .sum();

    table.cast("a", vec![Spell::attack(foil, SpellAccuracy::Great)]);
    table.cast("b", vec![Spell::attack(foil, SpellAccuracy::Great)]);
    table.tick();
    assert_eq!(table.phase(), Some(PhaseId::PlayerResolution));

    table.run_until(PhaseId::EnemyResolution);
    assert_eq!(table.game.battle().enemy_health(), before - expected);
    assert!(table.game.round().is_empty());
}

#[test]
fn idle_player_pauses_and_the_round_survives() {
    let mut table = Table::seated(&["a", "b"], quick_config());
    table.wait_for_round_start();

    table.cast("a", vec![Spell::heal(SpellAccuracy::Good)]);
    table.send(PlayerRequest::Idle(PlayerId::from("b")));
    table.tick();

    assert_eq!(table.phase(), Some(PhaseId::Paused));
    assert_eq!(table.game.session().gameplay_state(), GameplayState::Paused);
    assert_eq!(table.state_of("a"), PlayerState::Idle);
    assert_eq!(table.game.round().submitted_count(), 1);

    for _ in 0..50 {
        table.tick();
    }
    assert_eq!(table.phase(), Some(PhaseId::Paused));

    table.send(PlayerRequest::Resume(PlayerId::from("b")));
    table.tick();
    assert_eq!(table.phase(), Some(PhaseId::PlayerAction));
    assert_eq!(table.state_of("a"), PlayerState::Playing);
    assert_eq!(table.game.round().submitted_count(), 1);

    table.cast("b", vec![Spell::shield(SpellAccuracy::Great)]);
    table.tick();
    assert_eq!(table.phase(), Some(PhaseId::PlayerResolution));
}

#[test]
fn only_the_first_of_simultaneous_idles_pauses_the_game() {
    let mut table = Table::seated(&["a", "b"], quick_config());
    table.wait_for_round_start();
    let mut phases = table.game.bus().subscribe(Topic::Phase);

    table.send(PlayerRequest::Idle(PlayerId::from("a")));
    table.send(PlayerRequest::Idle(PlayerId::from("b")));
    for _ in 0..5 {
        table.tick();
    }

    assert_eq!(table.phase(), Some(PhaseId::Paused));
    assert_eq!(table.state_of("a"), PlayerState::Idle);
    assert_eq!(table.state_of("b"), PlayerState::Idle);
    let mut entered = Vec::new();
    while let Ok(event) = phases.try_recv() {
        if let Event::PhaseChanged { phase } = event {
            entered.push(phase);
        }
    }
    assert_eq!(entered, vec![PhaseId::Paused]);
}

#[test]
fn pausing_mid_attack_freezes_it_until_resumed() {
    let config = quick_config();
    let attack_ms = config.timing.player_attack_ms;
    let mut table = Table::seated(&["a"], config);
    table.wait_for_round_start();

    let before = table.game.battle().enemy_health();
    let foil = table.game.battle().enemy_element().foil().unwrap();
    table.cast("a", vec![Spell::attack(foil, SpellAccuracy::Great)]);
    let started_at = table.run_until_action(ActionKind::PlayerAttack);
    for _ in 0..50 {
        table.tick();
    }

    let paused = table.pause_for("a", 500);
    assert_eq!(table.phase(), Some(PhaseId::PlayerResolution));
    assert_eq!(table.running_action(), Some(ActionKind::PlayerAttack));
    assert_eq!(table.game.battle().enemy_health(), before);

    let deadline = table.now + 10_000;
    while table.game.battle().enemy_health() == before {
        assert!(table.now < deadline, "attack never landed");
        table.tick();
    }
    let active = table.now - started_at - paused;
    assert!(active > attack_ms, "landed after {active} ms");
    assert!(active <= attack_ms + FRAME_MS, "landed after {active} ms");
}

#[test]
fn pausing_during_the_enemy_death_delays_victory() {
    let mut config = quick_config();
    config.balance.enemy_initial_health = [0, 1, 1, 1, 1];
    let death_ms = config.timing.death_fx_ms;
    let mut table = Table::seated(&["a"], config);
    table.wait_for_round_start();

    let foil = table.game.battle().enemy_element().foil().unwrap();
    table.cast("a", vec![Spell::attack(foil, SpellAccuracy::Good)]);
    let started_at = table.run_until_action(ActionKind::EnemyDeath);
    for _ in 0..25 {
        table.tick();
    }

    let paused = table.pause_for("a", 250);
    assert_eq!(table.phase(), Some(PhaseId::PlayerResolution));
    assert_eq!(table.running_action(), Some(ActionKind::EnemyDeath));

    table.run_until(PhaseId::PlayerVictory);
    let active = table.now - started_at - paused;
    assert!(active > death_ms, "victory after {active} ms");
    assert!(active <= death_ms + 3 * FRAME_MS, "victory after {active} ms");
}

#[test]
fn a_quitting_player_no_longer_holds_up_the_round() {
    let mut table = Table::seated(&["a", "b"], quick_config());
    table.wait_for_round_start();

    table.cast("a", vec![Spell::heal(SpellAccuracy::Great)]);
    table.send(PlayerRequest::Quit(PlayerId::from("b")));
    table.tick();

    assert_eq!(table.phase(), Some(PhaseId::PlayerResolution));
    assert_eq!(table.game.battle().party_size(), 1);
    assert!(!table.game.battle().contains(&PlayerId::from("b")));
}

#[test]
fn everyone_leaving_returns_to_the_lobby() {
    let mut table = Table::seated(&["a", "b"], quick_config());
    table.wait_for_round_start();

    table.send(PlayerRequest::Quit(PlayerId::from("a")));
    table.send(PlayerRequest::Drop(PlayerId::from("b")));
    table.tick();

    assert_eq!(table.phase(), Some(PhaseId::WaitingForPlayers));
    assert_eq!(table.game.battle().party_size(), 0);
    assert_eq!(table.game.session().lobby_state(), LobbyState::Open);
    assert!(table.game.round().is_empty());
}

#[test]
fn killing_the_enemy_ends_in_player_victory() {
    let mut config = quick_config();
    config.balance.enemy_initial_health = [0, 1, 1, 1, 1];
    let mut table = Table::seated(&["a"], config);
    table.wait_for_round_start();

    let foil = table.game.battle().enemy_element().foil().unwrap();
    table.cast("a", vec![Spell::attack(foil, SpellAccuracy::Good)]);
    table.run_until(PhaseId::PlayerVictory);

    assert_eq!(table.game.battle().party_size(), 0);
    assert_eq!(table.state_of("a"), PlayerState::Idle);

    table.run_until(PhaseId::WaitingForPlayers);
    assert_eq!(table.state_of("a"), PlayerState::Available);
    assert_eq!(table.game.engine().lists_in_use(), 0);
}

#[test]
fn losing_the_party_ends_in_enemy_victory() {
    let mut config = quick_config();
    config.balance.party_initial_health = [0, 1, 1, 1, 1];
    let mut table = Table::seated(&["a"], config);
    table.wait_for_round_start();

    table.cast("a", vec![Spell::heal(SpellAccuracy::Good)]);
    table.run_until(PhaseId::EnemyResolution);
    table.run_until(PhaseId::EnemyVictory);
    assert_eq!(table.game.battle().party_health(), 0);

    table.run_until(PhaseId::WaitingForPlayers);
    assert_eq!(table.state_of("a"), PlayerState::Available);
}

#[test]
fn health_changes_are_published() {
    let mut table = Table::seated(&["a"], quick_config());
    table.run_until(PhaseId::PlayerAction);

    let mut snapshots = Vec::new();
    while let Ok(event) = table.health.try_recv() {
        if let Event::Health(snapshot) = event {
            snapshots.push(snapshot);
        }
    }
    let last = snapshots.last().copied().unwrap();
    assert_eq!(last.party_health, last.party_max_health);
    assert_eq!(last.enemy_max_health, quick_config().balance.enemy_initial_health[1]);
}

#[test]
fn spells_from_a_player_outside_the_battle_are_ignored() {
    let mut table = Table::seated(&["a", "b"], quick_config());
    table.wait_for_round_start();

    let late = PlayerId::from("late");
    table.handle.join(&late).unwrap();
    table.tick();
    table.game.session_mut().update_player_state(&late, PlayerState::Playing);
    table.cast("late", vec![Spell::heal(SpellAccuracy::Good)]);
    table.cast("a", vec![Spell::heal(SpellAccuracy::Good)]);
    table.tick();

    assert_eq!(table.phase(), Some(PhaseId::PlayerAction));
    assert_eq!(table.game.round().submitted_count(), 1);
    assert!(!table.game.round().has_submitted(&late));
}

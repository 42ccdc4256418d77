//! Random-AI players for unattended games.
//!
//! [`RandomAi`] plays every seat of a party through a [`SessionHandle`]:
//! it readies all of its players whenever the lobby opens, starts the game
//! from the first one, and answers each round-start message with a handful
//! of random spells. Outcomes are read from phase broadcasts.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast::{self, error::RecvError};

use game_core::{
    DifficultySetting, GameConfig, PhaseId, PlayerId, PlayerMessage, PlayerPlayingData, Spell,
    SpellAccuracy, SpellElement, SpellMessage, SpellType,
};

use crate::events::{Event, EventBus, Topic};
use crate::session::{SessionClosed, SessionHandle};

const SPELL_TYPES: [SpellType; 3] = [SpellType::Attack, SpellType::Heal, SpellType::Shield];
const ELEMENTS: [SpellElement; 4] = [
    SpellElement::Air,
    SpellElement::Water,
    SpellElement::Fire,
    SpellElement::Earth,
];
const ACCURACIES: [SpellAccuracy; 3] = [
    SpellAccuracy::Good,
    SpellAccuracy::Great,
    SpellAccuracy::Perfect,
];
const MAX_SPELLS_PER_ROUND: usize = 4;

/// Tally of what the AI played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiReport {
    pub games: u32,
    pub player_victories: u32,
    pub enemy_victories: u32,
    pub rounds: u32,
    pub spells_cast: u64,
}

pub struct RandomAi {
    handle: SessionHandle,
    players: Vec<PlayerId>,
    difficulty: DifficultySetting,
    rng: StdRng,
    phases: broadcast::Receiver<Event>,
    messages: broadcast::Receiver<Event>,
    last_phase: Option<PhaseId>,
    report: AiReport,
}

impl RandomAi {
    /// Subscribes to `bus` immediately, so create the AI before the game
    /// starts or the first lobby broadcast is missed.
    pub fn new(handle: SessionHandle, bus: &EventBus, players: usize, seed: u64) -> Self {
        let players = (1..=players.clamp(1, GameConfig::MAX_PLAYERS))
            .map(|seat| PlayerId::new(format!("ai-{seat}")))
            .collect();
        Self {
            handle,
            players,
            difficulty: DifficultySetting::default(),
            rng: StdRng::seed_from_u64(seed),
            phases: bus.subscribe(Topic::Phase),
            messages: bus.subscribe(Topic::Player),
            last_phase: None,
            report: AiReport::default(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: DifficultySetting) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn report(&self) -> AiReport {
        self.report
    }

    /// Plays until `games` games have ended, then returns the tally.
    pub async fn run(mut self, games: u32) -> Result<AiReport, SessionClosed> {
        for player in &self.players {
            self.handle.join(player)?;
        }

        loop {
            tokio::select! {
                event = self.phases.recv() => match event {
                    Ok(Event::PhaseChanged { phase }) => {
                        if self.on_phase(phase, games)? {
                            return Ok(self.report);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ai missed phase broadcasts");
                    }
                    Err(RecvError::Closed) => return Err(SessionClosed),
                },
                event = self.messages.recv() => match event {
                    Ok(Event::PlayerMessage { player, message }) => {
                        self.on_message(&player, message)?;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ai missed player messages");
                    }
                    Err(RecvError::Closed) => return Err(SessionClosed),
                },
            }
        }
    }

    /// Returns true once the requested number of games is done.
    fn on_phase(&mut self, phase: PhaseId, games: u32) -> Result<bool, SessionClosed> {
        let previous = self.last_phase.replace(phase);
        match phase {
            PhaseId::WaitingForPlayers => {
                if self.report.games >= games {
                    return Ok(true);
                }
                self.enter_lobby()?;
            }
            // Resuming from a pause re-enters the same round.
            PhaseId::PlayerAction if previous != Some(PhaseId::Paused) => {
                self.report.rounds += 1;
            }
            PhaseId::PlayerVictory => {
                self.report.games += 1;
                self.report.player_victories += 1;
                tracing::info!(report = ?self.report, "party won");
            }
            PhaseId::EnemyVictory => {
                self.report.games += 1;
                self.report.enemy_victories += 1;
                tracing::info!(report = ?self.report, "enemy won");
            }
            _ => {}
        }
        Ok(false)
    }

    fn enter_lobby(&mut self) -> Result<(), SessionClosed> {
        for (avatar, player) in (0u32..).zip(&self.players) {
            self.handle.ready(player, format!("Bot {}", avatar + 1), avatar)?;
        }
        if let Some(host) = self.players.first() {
            self.handle.start(
                host,
                PlayerPlayingData {
                    difficulty_setting: self.difficulty,
                },
            )?;
        }
        Ok(())
    }

    fn on_message(
        &mut self,
        player: &PlayerId,
        message: serde_json::Value,
    ) -> Result<(), SessionClosed> {
        if !self.players.contains(player) {
            return Ok(());
        }
        let bonus = serde_json::from_value::<PlayerMessage>(message)
            .map(|message| message.player_bonus)
            .unwrap_or_default();

        let spells = self.random_spells();
        tracing::debug!(%player, %bonus, spells = spells.len(), "ai casting");
        self.report.spells_cast += spells.len() as u64;
        self.handle
            .cast_spells(player, SpellMessage { spells })
    }

    fn random_spells(&mut self) -> Vec<Spell> {
        let count = self.rng.gen_range(1..=MAX_SPELLS_PER_ROUND);
        (0..count)
            .map(|_| {
                let accuracy = ACCURACIES[self.rng.gen_range(0..ACCURACIES.len())];
                match SPELL_TYPES[self.rng.gen_range(0..SPELL_TYPES.len())] {
                    SpellType::Attack => {
                        Spell::attack(ELEMENTS[self.rng.gen_range(0..ELEMENTS.len())], accuracy)
                    }
                    SpellType::Heal => Spell::heal(accuracy),
                    SpellType::Shield => Spell::shield(accuracy),
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for RandomAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomAi")
            .field("players", &self.players)
            .field("difficulty", &self.difficulty)
            .field("report", &self.report)
            .finish()
    }
}

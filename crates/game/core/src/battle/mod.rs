//! Battle state shared by actions and phases.
//!
//! [`Battle`] is the single owner of everything a round reads or mutates:
//! the party roster with per-round bonuses, both health pools, the enemy
//! element and the party shield. It holds no presentation state; callers
//! emit cues for whatever they change.
mod error;

pub use error::BattleError;

use arrayvec::ArrayVec;

use crate::config::{BalanceConfig, GameConfig};
use crate::env::{GameRng, RngOracle, RollContext};
use crate::protocol::{DifficultySetting, PlayerBonus, SpellElement};

/// Session-assigned player identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyMember {
    pub id: PlayerId,
    pub name: String,
    pub avatar_index: u32,
    pub bonus: PlayerBonus,
}

/// Health and shield values after a change, published to observers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthSnapshot {
    pub party_health: u32,
    pub party_max_health: u32,
    pub enemy_health: u32,
    pub enemy_max_health: u32,
    pub party_shield: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Battle {
    members: ArrayVec<PartyMember, { GameConfig::MAX_PLAYERS }>,
    party_health: u32,
    party_max_health: u32,
    enemy_health: u32,
    enemy_max_health: u32,
    enemy_element: SpellElement,
    party_shield: u32,
    shield_casts: u32,
    difficulty: DifficultySetting,
}

impl Battle {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Adds a player, or refreshes name and avatar of an existing one.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        avatar_index: u32,
    ) -> Result<&PartyMember, BattleError> {
        let name = name.into();
        if let Some(index) = self.index_of(&id) {
            let member = &mut self.members[index];
            member.name = name;
            member.avatar_index = avatar_index;
            return Ok(&self.members[index]);
        }

        if self.members.is_full() {
            return Err(BattleError::PartyFull {
                player: id,
                capacity: GameConfig::MAX_PLAYERS,
            });
        }
        self.members.push(PartyMember {
            id,
            name,
            avatar_index,
            bonus: PlayerBonus::None,
        });
        Ok(&self.members[self.members.len() - 1])
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<PartyMember> {
        let index = self.index_of(id)?;
        Some(self.members.remove(index))
    }

    /// Removes every player and drops the party shield.
    pub fn remove_all_players(&mut self) -> usize {
        let removed = self.members.len();
        self.members.clear();
        self.party_shield = 0;
        removed
    }

    pub fn members(&self) -> &[PartyMember] {
        &self.members
    }

    pub fn member(&self, id: &PlayerId) -> Option<&PartyMember> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn party_size(&self) -> usize {
        self.members.len()
    }

    fn index_of(&self, id: &PlayerId) -> Option<usize> {
        self.members.iter().position(|member| &member.id == id)
    }

    // ========================================================================
    // Round setup
    // ========================================================================

    /// Sizes both health pools for `party_size` players and fills them.
    pub fn setup_world(&mut self, party_size: usize, balance: &BalanceConfig) {
        let slot = party_size.min(GameConfig::MAX_PLAYERS);
        self.party_max_health = balance.party_initial_health[slot];
        self.party_health = self.party_max_health;
        self.enemy_max_health = balance.enemy_initial_health[slot];
        self.enemy_health = self.enemy_max_health;
        self.party_shield = 0;
        self.shield_casts = 0;
    }

    pub fn select_enemy_element<R: RngOracle>(&mut self, rng: &mut GameRng<R>) -> SpellElement {
        self.enemy_element = rng
            .pick(RollContext::EnemyElement, &SpellElement::ENEMY_ELEMENTS)
            .copied()
            .unwrap_or_default();
        self.enemy_element
    }

    pub fn enemy_element(&self) -> SpellElement {
        self.enemy_element
    }

    pub fn set_enemy_element(&mut self, element: SpellElement) {
        self.enemy_element = element;
    }

    /// Takes the enemy off the battlefield.
    pub fn clear_enemy(&mut self) {
        self.enemy_element = SpellElement::None;
    }

    /// Draws a fresh bonus for every member from `lottery`.
    pub fn assign_bonuses<R: RngOracle>(&mut self, rng: &mut GameRng<R>, lottery: &[PlayerBonus]) {
        for member in self.members.iter_mut() {
            member.bonus = rng
                .pick(RollContext::PlayerBonus, lottery)
                .copied()
                .unwrap_or_default();
        }
    }

    /// Bonus of `id` this round, [`PlayerBonus::None`] for unknown players.
    pub fn bonus(&self, id: &PlayerId) -> PlayerBonus {
        self.member(id).map(|member| member.bonus).unwrap_or_default()
    }

    pub fn difficulty(&self) -> DifficultySetting {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultySetting) {
        self.difficulty = difficulty;
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub fn party_health(&self) -> u32 {
        self.party_health
    }

    pub fn party_max_health(&self) -> u32 {
        self.party_max_health
    }

    pub fn enemy_health(&self) -> u32 {
        self.enemy_health
    }

    pub fn enemy_max_health(&self) -> u32 {
        self.enemy_max_health
    }

    /// Applies `delta` to party health, clamped to `[0, max]`.
    pub fn update_party_health(&mut self, delta: i64) -> u32 {
        self.party_health = clamp_health(self.party_health, delta, self.party_max_health);
        self.party_health
    }

    /// Applies `delta` to enemy health, clamped to `[0, max]`.
    pub fn update_enemy_health(&mut self, delta: i64) -> u32 {
        self.enemy_health = clamp_health(self.enemy_health, delta, self.enemy_max_health);
        self.enemy_health
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            party_health: self.party_health,
            party_max_health: self.party_max_health,
            enemy_health: self.enemy_health,
            enemy_max_health: self.enemy_max_health,
            party_shield: self.party_shield,
        }
    }

    // ========================================================================
    // Shield
    // ========================================================================

    pub fn party_shield(&self) -> u32 {
        self.party_shield
    }

    /// Raises the party shield to `value`.
    ///
    /// Returns `Ok(false)` when the shield already has that value.
    pub fn raise_shield(&mut self, value: u32) -> Result<bool, BattleError> {
        if value < 1 {
            return Err(BattleError::InvalidShieldValue(value));
        }
        if value == self.party_shield {
            return Ok(false);
        }
        self.party_shield = value;
        Ok(true)
    }

    /// Drops the party shield. Returns `false` when it was already down.
    pub fn disable_shield(&mut self) -> bool {
        if self.party_shield == 0 {
            return false;
        }
        self.party_shield = 0;
        true
    }

    pub fn shield_casts_this_round(&self) -> u32 {
        self.shield_casts
    }

    /// Counts one shield cast and returns how many preceded it this round.
    pub fn record_shield_cast(&mut self) -> u32 {
        let previous = self.shield_casts;
        self.shield_casts = self.shield_casts.saturating_add(1);
        previous
    }

    pub fn reset_shield_casts(&mut self) {
        self.shield_casts = 0;
    }
}

fn clamp_health(current: u32, delta: i64, max: u32) -> u32 {
    (current as i64 + delta).clamp(0, max as i64) as u32
}

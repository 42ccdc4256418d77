use crate::protocol::{DifficultySetting, PlayerBonus, SpellAccuracy};

/// Number of entries in tables indexed by party size (`0..=MAX_PLAYERS`).
pub const PARTY_SIZE_SLOTS: usize = GameConfig::MAX_PLAYERS + 1;

/// Game configuration constants and tunable parameters.
///
/// Compile-time limits live as associated constants. Everything else is a
/// runtime-tunable value grouped by concern; any group (or field) omitted
/// from a serialized config falls back to its default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub balance: BalanceConfig,
    pub pools: PoolConfig,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum party size. Party storage is fixed-capacity.
    pub const MAX_PLAYERS: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Cast window announced to players for the given difficulty.
    pub fn cast_duration_millis(&self, difficulty: DifficultySetting) -> u64 {
        self.balance.cast_duration_millis.get(difficulty)
    }
}

/// Durations and delays, all in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// How long the instructions screen stays up.
    pub instructions_delay_ms: u64,
    /// How long the victory or defeat screen stays up.
    pub endgame_display_ms: u64,
    /// After this long in the player action phase the "time running out"
    /// warning is shown.
    pub time_running_out_ms: u64,
    pub death_fx_ms: u64,
    /// Interval between alpha steps while a sprite fades out.
    pub death_fade_step_ms: u64,
    pub explosion_fx_ms: u64,
    pub heal_fx_ms: u64,
    pub shield_fx_ms: u64,

    pub player_attack_ms: u64,
    pub player_heal_ms: u64,
    pub player_shield_ms: u64,
    /// Duration of a shield cast past the second one in a round.
    pub ignored_shield_ms: u64,
    pub enemy_attack_ms: u64,
    pub countdown_ms: u64,
    /// Spacing between the countdown labels.
    pub countdown_step_ms: u64,
}

impl TimingConfig {
    pub const DEFAULT_INSTRUCTIONS_DELAY_MS: u64 = 10_000;
    pub const DEFAULT_ENDGAME_DISPLAY_MS: u64 = 5_000;
    pub const DEFAULT_TIME_RUNNING_OUT_MS: u64 = 12_000;
    pub const DEFAULT_DEATH_FX_MS: u64 = 2_500;
    pub const DEFAULT_EXPLOSION_FX_MS: u64 = 750;
    pub const DEFAULT_SPELL_FX_MS: u64 = 500;
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            instructions_delay_ms: Self::DEFAULT_INSTRUCTIONS_DELAY_MS,
            endgame_display_ms: Self::DEFAULT_ENDGAME_DISPLAY_MS,
            time_running_out_ms: Self::DEFAULT_TIME_RUNNING_OUT_MS,
            death_fx_ms: Self::DEFAULT_DEATH_FX_MS,
            death_fade_step_ms: 250,
            explosion_fx_ms: Self::DEFAULT_EXPLOSION_FX_MS,
            heal_fx_ms: Self::DEFAULT_SPELL_FX_MS,
            shield_fx_ms: Self::DEFAULT_SPELL_FX_MS,
            player_attack_ms: 3_000,
            player_heal_ms: 2_000,
            player_shield_ms: 2_000,
            ignored_shield_ms: 100,
            enemy_attack_ms: 6_000,
            countdown_ms: 3_000,
            countdown_step_ms: 1_000,
        }
    }
}

/// A value per spell accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccuracyTable {
    pub good: u32,
    pub great: u32,
    pub perfect: u32,
}

impl AccuracyTable {
    pub const fn new(good: u32, great: u32, perfect: u32) -> Self {
        Self {
            good,
            great,
            perfect,
        }
    }

    pub const fn get(&self, accuracy: SpellAccuracy) -> u32 {
        match accuracy {
            SpellAccuracy::Good => self.good,
            SpellAccuracy::Great => self.great,
            SpellAccuracy::Perfect => self.perfect,
        }
    }
}

/// A value per difficulty setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyTable {
    pub easy: u64,
    pub normal: u64,
    pub hard: u64,
}

impl DifficultyTable {
    pub const fn get(&self, difficulty: DifficultySetting) -> u64 {
        match difficulty {
            DifficultySetting::Easy => self.easy,
            DifficultySetting::Normal => self.normal,
            DifficultySetting::Hard => self.hard,
        }
    }
}

/// Numeric combat policy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceConfig {
    pub attack_damage: AccuracyTable,
    pub heal_value: AccuracyTable,
    pub shield_value: AccuracyTable,
    pub attack_bonus: u32,
    pub heal_bonus: u32,
    pub shield_bonus: u32,
    /// Health the enemy regains when hit with its own element.
    pub enemy_heal_value: u32,
    /// Party starting health, indexed by party size.
    pub party_initial_health: [u32; PARTY_SIZE_SLOTS],
    /// Enemy starting health, indexed by party size.
    pub enemy_initial_health: [u32; PARTY_SIZE_SLOTS],
    /// Base damage of an enemy attack; one is drawn per attack.
    pub enemy_strengths: Vec<u32>,
    /// Extra enemy damage, indexed by party size.
    pub enemy_party_bonus: [u32; PARTY_SIZE_SLOTS],
    pub cast_duration_millis: DifficultyTable,
    /// Weighted bonus lottery; each entry is equally likely.
    pub bonus_lottery: Vec<PlayerBonus>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            attack_damage: AccuracyTable::new(1, 2, 3),
            heal_value: AccuracyTable::new(1, 2, 3),
            shield_value: AccuracyTable::new(2, 3, 4),
            attack_bonus: 1,
            heal_bonus: 1,
            shield_bonus: 1,
            enemy_heal_value: 3,
            party_initial_health: [0, 10, 20, 30, 40],
            enemy_initial_health: [0, 20, 40, 60, 80],
            enemy_strengths: vec![4, 5, 6],
            enemy_party_bonus: [0, 0, 3, 6, 9],
            cast_duration_millis: DifficultyTable {
                easy: 15_000,
                normal: 12_000,
                hard: 9_000,
            },
            bonus_lottery: vec![
                PlayerBonus::None,
                PlayerBonus::None,
                PlayerBonus::Attack,
                PlayerBonus::Shield,
                PlayerBonus::Heal,
            ],
        }
    }
}

/// Initial capacity of every object pool.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    pub player_attack: usize,
    pub player_heal: usize,
    pub player_shield: usize,
    pub enemy_attack: usize,
    pub enemy_death: usize,
    pub party_death: usize,
    pub countdown: usize,
    pub full_screen_display: usize,
    pub action_lists: usize,
}

impl PoolConfig {
    pub const PER_PLAYER_CAPACITY: usize = 100;
    pub const SINGLETON_CAPACITY: usize = 10;
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            player_attack: Self::PER_PLAYER_CAPACITY,
            player_heal: Self::PER_PLAYER_CAPACITY,
            player_shield: Self::PER_PLAYER_CAPACITY,
            enemy_attack: Self::SINGLETON_CAPACITY,
            enemy_death: Self::SINGLETON_CAPACITY,
            party_death: Self::SINGLETON_CAPACITY,
            countdown: Self::SINGLETON_CAPACITY,
            full_screen_display: Self::SINGLETON_CAPACITY,
            action_lists: Self::SINGLETON_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_tables_cover_every_party_size() {
        let balance = BalanceConfig::default();
        assert_eq!(balance.party_initial_health[GameConfig::MAX_PLAYERS], 40);
        assert_eq!(balance.enemy_initial_health[2], 40);
        assert_eq!(balance.enemy_party_bonus[1], 0);
    }

    #[test]
    fn cast_window_follows_difficulty() {
        let config = GameConfig::default();
        assert_eq!(config.cast_duration_millis(DifficultySetting::Easy), 15_000);
        assert_eq!(config.cast_duration_millis(DifficultySetting::Normal), 12_000);
        assert_eq!(config.cast_duration_millis(DifficultySetting::Hard), 9_000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{"timing": {"instructions_delay_ms": 1}, "pools": {"action_lists": 2}}"#,
        )
        .unwrap();

        assert_eq!(config.timing.instructions_delay_ms, 1);
        assert_eq!(config.timing.player_attack_ms, 3_000);
        assert_eq!(config.pools.action_lists, 2);
        assert_eq!(config.pools.player_attack, 100);
        assert_eq!(config.balance, BalanceConfig::default());
    }
}

//! Host configuration and game-config loading.
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use game_core::GameConfig;

use crate::error::ConfigError;

/// Settings for the process hosting a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Interval between frame ticks.
    pub frame_interval: Duration,
    /// Seed for every random decision in the game.
    pub seed: u64,
    /// Capacity of each event bus topic.
    pub event_capacity: usize,
    /// Optional RON file overriding [`GameConfig`] defaults.
    pub game_config_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            seed: 0,
            event_capacity: 256,
            game_config_path: None,
        }
    }
}

impl RuntimeConfig {
    pub const FRAME_MS_VAR: &'static str = "SPELLCAST_FRAME_MS";
    pub const SEED_VAR: &'static str = "SPELLCAST_SEED";
    pub const EVENT_CAPACITY_VAR: &'static str = "SPELLCAST_EVENT_CAPACITY";
    pub const GAME_CONFIG_VAR: &'static str = "SPELLCAST_GAME_CONFIG";

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(frame_ms) = parse_var::<u64>(&lookup, Self::FRAME_MS_VAR)? {
            config.frame_interval = Duration::from_millis(frame_ms.max(1));
        }
        if let Some(seed) = parse_var::<u64>(&lookup, Self::SEED_VAR)? {
            config.seed = seed;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, Self::EVENT_CAPACITY_VAR)? {
            config.event_capacity = capacity.max(1);
        }
        config.game_config_path = lookup(Self::GAME_CONFIG_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// The configured game config, or defaults when no file is set.
    pub fn load_game_config(&self) -> Result<GameConfig, ConfigError> {
        match &self.game_config_path {
            Some(path) => load_game_config(path),
            None => Ok(GameConfig::default()),
        }
    }
}

/// Loads a [`GameConfig`] from a RON file. Omitted fields keep defaults.
pub fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loaded game config");
    Ok(config)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

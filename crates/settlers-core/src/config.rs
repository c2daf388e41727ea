//! Game configuration.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"players": 3, "seed": 7}` is a complete configuration.

use crate::game::SetupError;
use crate::generator::TileMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest players a game supports
pub const MIN_PLAYERS: u8 = 2;
/// Most players a game supports
pub const MAX_PLAYERS: u8 = 4;

/// Errors from loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] SetupError),
}

/// Parameters for a new game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of players (2-4)
    pub players: u8,
    /// Victory points needed to win
    pub winning_points: u32,
    /// Starting bank quantity of each resource
    pub bank_per_resource: u32,
    /// Seed for board generation, deck shuffle and steals
    pub seed: u64,
    pub tile_map: TileMap,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 4,
            winning_points: 15,
            bank_per_resource: 19,
            seed: 42,
            tile_map: TileMap::standard(),
        }
    }
}

impl GameConfig {
    /// Default configuration with a given player count and seed
    pub fn new(players: u8, seed: u64) -> Self {
        Self {
            players,
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), SetupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(SetupError::InvalidPlayerCount(self.players));
        }
        if self.winning_points == 0 {
            return Err(SetupError::InvalidWinningPoints);
        }
        self.tile_map.validate()
    }
}

//! A simulated table: one game and one bot per seat.

use serde::Serialize;
use settlers_core::victory::total_victory_points;
use settlers_core::{
    ActionError, Bot, BotDifficulty, GameConfig, GameEvent, GameState, Resource, SetupError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot create game: {0}")]
    Setup(#[from] SetupError),

    #[error("bot {player} chose {action}, which was rejected: {source}")]
    Rejected {
        player: u8,
        action: &'static str,
        #[source]
        source: ActionError,
    },

    #[error("{resource} total is {total}, expected {expected}")]
    NotConserved {
        resource: Resource,
        total: u32,
        expected: u32,
    },
}

/// Outcome of one simulated game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub players: u8,
    pub winner: Option<u8>,
    pub turns: u32,
    pub actions: usize,
    pub victory_points: Vec<u32>,
    pub finished: bool,
}

pub struct Table {
    game: GameState,
    bots: Vec<Bot>,
    seed: u64,
    bank_per_resource: u32,
    actions: usize,
}

impl Table {
    pub fn new(config: &GameConfig, difficulty: BotDifficulty) -> Result<Self, SimError> {
        let game = GameState::new(config)?;
        let bots = (0..config.players)
            .map(|id| Bot::with_seed(id, difficulty, config.seed.wrapping_add(u64::from(id))))
            .collect();
        Ok(Self {
            game,
            bots,
            seed: config.seed,
            bank_per_resource: config.bank_per_resource,
            actions: 0,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Let the expected actor take one action. Returns `None` when nobody
    /// can act.
    pub fn step(&mut self) -> Result<Option<Vec<GameEvent>>, SimError> {
        let Some(player) = self.game.expected_actor() else {
            return Ok(None);
        };
        let Some(bot) = self.bots.get_mut(player as usize) else {
            return Ok(None);
        };
        let Some(action) = bot.choose_action(&self.game) else {
            warn!(player, phase = ?self.game.phase, "bot has no legal action");
            return Ok(None);
        };

        let transition =
            self.game
                .apply_action(player, &action)
                .map_err(|source| SimError::Rejected {
                    player,
                    action: action.name(),
                    source,
                })?;
        debug!(player, action = action.name(), events = transition.events.len(), "applied");
        self.game = transition.state;
        self.actions += 1;
        Ok(Some(transition.events))
    }

    /// Bank plus hands must still add up to the starting bank
    pub fn check_conservation(&self) -> Result<(), SimError> {
        for resource in Resource::ALL {
            let total = self.game.resource_total(resource);
            if total != self.bank_per_resource {
                return Err(SimError::NotConserved {
                    resource,
                    total,
                    expected: self.bank_per_resource,
                });
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            seed: self.seed,
            players: self.game.player_count() as u8,
            winner: self.game.winner,
            turns: self.game.turn_number,
            actions: self.actions,
            victory_points: self.game.players.iter().map(total_victory_points).collect(),
            finished: self.game.is_finished(),
        }
    }
}

/// Play one game to the end or until `max_actions` actions were taken
pub fn play_game(config: &GameConfig, max_actions: usize) -> Result<GameSummary, SimError> {
    let mut table = Table::new(config, BotDifficulty::Builder)?;
    while table.actions < max_actions {
        if table.step()?.is_none() {
            break;
        }
    }
    table.check_conservation()?;

    let summary = table.summary();
    match summary.winner {
        Some(winner) => info!(seed = summary.seed, winner, turns = summary.turns, "game won"),
        None => info!(
            seed = summary.seed,
            turns = summary.turns,
            actions = summary.actions,
            "game stopped without a winner"
        ),
    }
    Ok(summary)
}

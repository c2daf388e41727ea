//! Bot players.
//!
//! Bots choose from `GameState::legal_actions`, so anything they pick is
//! accepted by the engine:
//! - Random: any legal action
//! - Builder: prefers settlements on productive corners, then cities, with
//!   occasional roads and development cards
//!
//! Dice are rolled by the bot itself, since the engine only accepts a sum.

use crate::actions::GameAction;
use crate::board::{PlayerId, Resource, TileId, VertexId};
use crate::game::GameState;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Random,
    Builder,
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

/// Dots printed under a number token: how many of the 36 rolls hit it
pub fn pips(token: u8) -> u32 {
    6u32.saturating_sub(7u32.abs_diff(token as u32))
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sum of two six-sided dice
    pub fn roll_dice(&mut self) -> u8 {
        self.rng.gen_range(1..=6) + self.rng.gen_range(1..=6)
    }

    /// Choose an action from the legal actions
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        let actions = game.legal_actions(self.player_id);
        if actions.is_empty() {
            return None;
        }
        if actions
            .iter()
            .any(|a| matches!(a, GameAction::RollDice { .. }))
        {
            return Some(GameAction::RollDice {
                roll: self.roll_dice(),
            });
        }

        match self.difficulty {
            BotDifficulty::Random => actions.choose(&mut self.rng).cloned(),
            BotDifficulty::Builder => self.choose_builder(game, &actions),
        }
    }

    fn choose_builder(&mut self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        // Settlements on the best corner, in setup or later
        let best_settlement = actions
            .iter()
            .filter_map(|a| match a {
                GameAction::PlaceSettlement { vertex } | GameAction::BuildSettlement { vertex } => {
                    Some((a, vertex_value(game, *vertex)))
                }
                _ => None,
            })
            .max_by_key(|(_, value)| *value)
            .map(|(a, _)| a.clone());
        if best_settlement.is_some() {
            return best_settlement;
        }

        if let Some(city) = pick(actions, |a| matches!(a, GameAction::BuildCity { .. })) {
            return Some(city);
        }

        let setup_roads = filtered(actions, |a| matches!(a, GameAction::PlaceRoad { .. }));
        if let Some(road) = setup_roads.choose(&mut self.rng) {
            return Some(road.clone());
        }

        if let Some(tile) = self.rank_robber_spots(game, actions) {
            return Some(GameAction::PlaceRobber { tile });
        }

        // Steal from the richest candidate
        let steal = actions
            .iter()
            .filter_map(|a| match a {
                GameAction::StealResource { victim } => Some(*victim),
                _ => None,
            })
            .max_by_key(|v| game.player(*v).map_or(0, |p| p.resources.total()));
        if let Some(victim) = steal {
            return Some(GameAction::StealResource { victim });
        }

        // Single-option steps: discards, trade answers, card follow-ups
        if let Some(forced) = actions.iter().find(|a| {
            matches!(
                a,
                GameAction::DiscardResources { .. } | GameAction::RespondTrade { accepted: true }
            )
        }) {
            return Some(forced.clone());
        }
        if let Some(resource) = self.monopoly_choice(game, actions) {
            return Some(GameAction::SelectMonopolyResource { resource });
        }
        let follow_ups = filtered(actions, |a| {
            matches!(
                a,
                GameAction::SelectYearOfPlentyResources { .. }
                    | GameAction::RespondTrade { .. }
            )
        });
        if let Some(follow_up) = follow_ups.choose(&mut self.rng) {
            return Some(follow_up.clone());
        }

        let roads = filtered(actions, |a| matches!(a, GameAction::BuildRoad { .. }));
        let must_place = !actions.contains(&GameAction::EndTurn);
        if !roads.is_empty() && (must_place || self.rng.gen_bool(0.3)) {
            return roads.choose(&mut self.rng).cloned();
        }

        if actions.contains(&GameAction::BuyDevCard) && self.rng.gen_bool(0.2) {
            return Some(GameAction::BuyDevCard);
        }

        for card in [
            GameAction::PlayMonopoly,
            GameAction::PlayYearOfPlenty,
            GameAction::PlayRoadBuilding,
            GameAction::PlayKnight,
        ] {
            if actions.contains(&card) && self.rng.gen_bool(0.5) {
                return Some(card);
            }
        }

        let trades = filtered(actions, |a| matches!(a, GameAction::BankTrade { .. }));
        if !trades.is_empty() && self.rng.gen_bool(0.25) {
            return trades.choose(&mut self.rng).cloned();
        }

        if actions.contains(&GameAction::EndTurn) {
            return Some(GameAction::EndTurn);
        }

        actions.choose(&mut self.rng).cloned()
    }

    /// Robber tile that blocks the most opponent production and none of ours
    fn rank_robber_spots(&self, game: &GameState, actions: &[GameAction]) -> Option<TileId> {
        actions
            .iter()
            .filter_map(|a| match a {
                GameAction::PlaceRobber { tile } => Some(*tile),
                _ => None,
            })
            .max_by_key(|tile| {
                let Some(t) = game.board.tile(*tile) else {
                    return (false, 0);
                };
                let mut hurts_self = false;
                let mut blocked = 0;
                for v in &t.adjacent_vertices {
                    let site = game.vertex_states[v.index()];
                    match site.owner {
                        Some(owner) if owner == self.player_id => hurts_self = true,
                        Some(_) => blocked += site.building.payout() * t.token.map_or(0, pips),
                        None => {}
                    }
                }
                (!hurts_self, blocked)
            })
    }

    /// The resource opponents hold the most of
    fn monopoly_choice(&self, game: &GameState, actions: &[GameAction]) -> Option<Resource> {
        if !actions
            .iter()
            .any(|a| matches!(a, GameAction::SelectMonopolyResource { .. }))
        {
            return None;
        }
        Resource::ALL.into_iter().max_by_key(|r| {
            game.players
                .iter()
                .filter(|p| p.id != self.player_id)
                .map(|p| p.resources.get(*r))
                .sum::<u32>()
        })
    }
}

/// Production value of a corner: pips of adjacent resource tiles, plus a
/// bonus for each distinct resource
fn vertex_value(game: &GameState, vertex: VertexId) -> u32 {
    let Some(v) = game.board.vertex(vertex) else {
        return 0;
    };
    let mut kinds = Vec::new();
    let mut value = 0;
    for tile in v.adjacent_tiles.iter().filter_map(|t| game.board.tile(*t)) {
        if let (Some(resource), Some(token)) = (tile.resource(), tile.token) {
            value += pips(token);
            if !kinds.contains(&resource) {
                kinds.push(resource);
            }
        }
    }
    value + 2 * kinds.len() as u32
}

fn filtered(actions: &[GameAction], keep: impl Fn(&GameAction) -> bool) -> Vec<GameAction> {
    actions.iter().filter(|a| keep(a)).cloned().collect()
}

fn pick(actions: &[GameAction], keep: impl Fn(&GameAction) -> bool) -> Option<GameAction> {
    actions.iter().find(|a| keep(a)).cloned()
}

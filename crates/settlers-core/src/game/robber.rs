//! Robber phase: discard, move, steal.
//!
//! Discards are collected one player at a time in the order fixed when the 7
//! was rolled. Moving the robber then finds the opponents next to the new
//! tile who hold at least one card; a single candidate is robbed
//! automatically, several wait for an explicit choice.

use super::{ActionError, GamePhase, GameState, RobberStep};
use crate::actions::{GameAction, GameEvent};
use crate::board::{PlayerId, TileId};
use crate::ledger::{self, Holder};
use crate::player::ResourceHand;
use rand::seq::SliceRandom;

impl GameState {
    pub(super) fn handle_robber(
        &mut self,
        player: PlayerId,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let step = self
            .robber
            .as_ref()
            .map(|r| r.step)
            .ok_or(ActionError::InvalidPhase)?;

        match action {
            GameAction::DiscardResources { resources } if step == RobberStep::Discard => {
                self.discard(player, resources, events)
            }
            GameAction::PlaceRobber { tile } if step == RobberStep::Move => {
                self.move_robber(player, *tile, events)
            }
            GameAction::StealResource { victim } if step == RobberStep::Steal => {
                self.steal_chosen(player, *victim, events)
            }
            GameAction::DiscardResources { .. }
            | GameAction::PlaceRobber { .. }
            | GameAction::StealResource { .. }
            | GameAction::VertexClicked { .. }
            | GameAction::EdgeClicked { .. }
            | GameAction::PlaceSettlement { .. }
            | GameAction::PlaceRoad { .. }
            | GameAction::RollDice { .. }
            | GameAction::SetBuildMode { .. }
            | GameAction::BuildSettlement { .. }
            | GameAction::BuildRoad { .. }
            | GameAction::BuildCity { .. }
            | GameAction::BuyDevCard
            | GameAction::BankTrade { .. }
            | GameAction::OfferTrade { .. }
            | GameAction::RespondTrade { .. }
            | GameAction::PlayKnight
            | GameAction::PlayMonopoly
            | GameAction::SelectMonopolyResource { .. }
            | GameAction::PlayRoadBuilding
            | GameAction::PlayYearOfPlenty
            | GameAction::SelectYearOfPlentyResources { .. }
            | GameAction::EndTurn => Err(ActionError::InvalidPhase),
        }
    }

    // ==================== Discard ====================

    fn discard(
        &mut self,
        player: PlayerId,
        resources: &ResourceHand,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let robber = self.robber.as_ref().ok_or(ActionError::InvalidPhase)?;
        if robber.active_discarder != Some(player) {
            return Err(ActionError::NotYourTurn);
        }
        let owed = robber
            .discard_amounts
            .get(&player)
            .copied()
            .ok_or(ActionError::InvalidDiscard)?;
        if resources.total() != owed {
            return Err(ActionError::InvalidDiscard);
        }

        ledger::transfer(self, Holder::Player(player), Holder::Bank, resources)
            .map_err(|_| ActionError::InvalidDiscard)?;
        events.push(GameEvent::CardsDiscarded {
            player,
            count: owed,
        });

        let Some(robber) = self.robber.as_mut() else {
            return Err(ActionError::InvalidPhase);
        };
        robber.pending_discards.retain(|p| *p != player);
        match robber.pending_discards.first().copied() {
            Some(next) => {
                robber.active_discarder = Some(next);
                self.current_player = next;
            }
            None => {
                robber.active_discarder = None;
                robber.step = RobberStep::Move;
                self.current_player = robber.original_roller;
            }
        }
        Ok(())
    }

    // ==================== Move ====================

    /// Opponents of `thief` with a building next to `tile` and a non-empty hand,
    /// in turn order
    pub fn steal_candidates(&self, thief: PlayerId, tile: TileId) -> Vec<PlayerId> {
        let Some(tile) = self.board.tile(tile) else {
            return Vec::new();
        };
        let adjacent: Vec<PlayerId> = tile
            .adjacent_vertices
            .iter()
            .filter_map(|v| self.vertex_states[v.index()].owner)
            .collect();
        self.turn_order
            .iter()
            .copied()
            .filter(|p| *p != thief && adjacent.contains(p))
            .filter(|p| self.player(*p).is_some_and(|ps| !ps.resources.is_empty()))
            .collect()
    }

    fn move_robber(
        &mut self,
        player: PlayerId,
        tile: TileId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let target = self.board.tile(tile).ok_or(ActionError::InvalidTarget)?;
        if !target.is_land() || tile == self.robber_tile {
            return Err(ActionError::InvalidLocation);
        }

        let from = self.robber_tile;
        self.robber_tile = tile;
        events.push(GameEvent::RobberMoved {
            player,
            from,
            to: tile,
        });

        let candidates = self.steal_candidates(player, tile);
        if candidates.len() > 1 {
            if let Some(robber) = self.robber.as_mut() {
                robber.step = RobberStep::Steal;
                robber.steal_candidates = candidates;
            }
            return Ok(());
        }
        if let Some(&victim) = candidates.first() {
            self.steal_from(player, victim, events)?;
        }
        self.finish_robber();
        Ok(())
    }

    // ==================== Steal ====================

    fn steal_chosen(
        &mut self,
        player: PlayerId,
        victim: PlayerId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let allowed = self
            .robber
            .as_ref()
            .is_some_and(|r| r.steal_candidates.contains(&victim));
        if !allowed {
            return Err(ActionError::InvalidTarget);
        }
        self.steal_from(player, victim, events)?;
        self.finish_robber();
        Ok(())
    }

    /// Take one card of a kind chosen uniformly among the kinds the victim holds
    fn steal_from(
        &mut self,
        thief: PlayerId,
        victim: PlayerId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let kinds = self
            .player(victim)
            .map(|p| p.resources.held_kinds())
            .unwrap_or_default();
        let Some(&resource) = kinds.choose(&mut self.rng) else {
            return Ok(());
        };
        ledger::transfer(
            self,
            Holder::Player(victim),
            Holder::Player(thief),
            &ResourceHand::single(resource, 1),
        )?;
        events.push(GameEvent::ResourceStolen {
            thief,
            victim,
            resource,
        });
        Ok(())
    }

    fn finish_robber(&mut self) {
        if let Some(robber) = self.robber.take() {
            self.current_player = robber.original_roller;
        }
        self.phase = GamePhase::BuildingTrading;
    }
}

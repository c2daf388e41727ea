//! Setup phase: each player places a settlement and a road, first in turn
//! order and then in reverse. The second settlement pays one card per
//! adjacent producing tile, as far as the bank allows.

use super::{ActionError, GamePhase, GameState, SetupRound, SetupStep};
use crate::actions::{GameAction, GameEvent};
use crate::board::{Building, EdgeId, PlayerId, VertexId, VertexState};
use crate::player::ResourceHand;
use crate::rules;

impl GameState {
    pub(super) fn handle_setup(
        &mut self,
        player: PlayerId,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        match action {
            GameAction::PlaceSettlement { vertex } | GameAction::VertexClicked { vertex } => {
                self.place_setup_settlement(player, *vertex, events)
            }
            GameAction::PlaceRoad { edge } | GameAction::EdgeClicked { edge } => {
                self.place_setup_road(player, *edge, events)
            }
            GameAction::RollDice { .. }
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
            | GameAction::DiscardResources { .. }
            | GameAction::PlaceRobber { .. }
            | GameAction::StealResource { .. }
            | GameAction::EndTurn => Err(ActionError::InvalidPhase),
        }
    }

    fn place_setup_settlement(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if self.setup_step != SetupStep::Settlement {
            return Err(ActionError::InvalidPhase);
        }
        if !rules::can_place_setup_settlement(&self.occupancy(), vertex) {
            return Err(ActionError::InvalidLocation);
        }

        self.vertex_states[vertex.index()] = VertexState {
            building: Building::Settlement,
            owner: Some(player),
        };
        let board = self.board.clone();
        let p = self.player_mut(player)?;
        p.settlements.push(vertex);
        rules::grant_ports_for_vertex(&board, vertex, &mut p.ports);
        self.refresh_scores();
        events.push(GameEvent::SettlementPlaced { player, vertex });

        if self.setup_round == SetupRound::Reverse {
            let mut granted = ResourceHand::new();
            let resources: Vec<_> = board
                .vertex(vertex)
                .map(|v| {
                    v.adjacent_tiles
                        .iter()
                        .filter_map(|t| board.tile(*t).and_then(|tile| tile.resource()))
                        .collect()
                })
                .unwrap_or_default();
            for resource in resources {
                if self.pay_from_bank(player, resource) {
                    granted.add(resource, 1);
                }
            }
            if !granted.is_empty() {
                events.push(GameEvent::StartingResources {
                    player,
                    resources: granted,
                });
            }
        }

        self.setup_step = SetupStep::Road;
        Ok(())
    }

    fn place_setup_road(
        &mut self,
        player: PlayerId,
        edge: EdgeId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if self.setup_step != SetupStep::Road {
            return Err(ActionError::InvalidPhase);
        }
        let settlement = self
            .player(player)
            .and_then(|p| p.settlements.last().copied())
            .ok_or(ActionError::InvalidLocation)?;
        if !rules::can_place_setup_road(&self.occupancy(), edge, settlement) {
            return Err(ActionError::InvalidLocation);
        }

        self.edge_states[edge.index()].owner = Some(player);
        self.player_mut(player)?.roads.push(edge);
        events.push(GameEvent::RoadPlaced { player, edge });

        self.advance_setup(events);
        Ok(())
    }

    /// Move the snake draft on by one placement pair.
    fn advance_setup(&mut self, events: &mut Vec<GameEvent>) {
        let last = self.turn_order.len().saturating_sub(1);
        self.setup_step = SetupStep::Settlement;

        match self.setup_round {
            SetupRound::Forward if self.current_player_index < last => {
                self.current_player_index += 1;
            }
            // The last player places again immediately
            SetupRound::Forward => self.setup_round = SetupRound::Reverse,
            SetupRound::Reverse if self.current_player_index > 0 => {
                self.current_player_index -= 1;
            }
            SetupRound::Reverse => {
                self.phase = GamePhase::DiceRoll;
                self.turn_number = 1;
                events.push(GameEvent::SetupComplete);
            }
        }
        self.current_player = self.turn_owner();
    }
}

//! Development card plays.
//!
//! At most one card is played per turn. The card leaves the hand as soon as
//! it is played. Monopoly, year of plenty and road building then hold the
//! game in `DevCardAction` until their follow-up input arrives; the knight
//! hands over to the robber instead.

use super::{ActionError, DevCardActionState, GamePhase, GameState, RobberState, RobberStep};
use crate::actions::{BuildMode, GameAction, GameEvent};
use crate::board::{EdgeId, PlayerId, Resource};
use crate::ledger::{self, Holder};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::rules;
use std::collections::BTreeMap;

/// Free roads granted by a road building card
const ROAD_BUILDING_ROADS: usize = 2;
/// Cards taken from the bank by year of plenty
const YEAR_OF_PLENTY_CARDS: u32 = 2;

impl GameState {
    pub(super) fn handle_dev_card_action(
        &mut self,
        player: PlayerId,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let pending = self.dev_card_action.ok_or(ActionError::InvalidPhase)?;

        match (pending, action) {
            (DevCardActionState::MonopolySelect, GameAction::SelectMonopolyResource { resource }) => {
                self.resolve_monopoly(player, *resource, events)
            }
            (
                DevCardActionState::YearOfPlentySelect,
                GameAction::SelectYearOfPlentyResources { resources },
            ) => self.resolve_year_of_plenty(player, resources, events),
            (
                DevCardActionState::RoadBuilding { .. },
                GameAction::EdgeClicked { edge } | GameAction::BuildRoad { edge },
            ) => self.place_free_road(player, *edge, events),
            (
                _,
                GameAction::SelectMonopolyResource { .. }
                | GameAction::SelectYearOfPlentyResources { .. }
                | GameAction::EdgeClicked { .. }
                | GameAction::BuildRoad { .. }
                | GameAction::VertexClicked { .. }
                | GameAction::PlaceSettlement { .. }
                | GameAction::PlaceRoad { .. }
                | GameAction::RollDice { .. }
                | GameAction::SetBuildMode { .. }
                | GameAction::BuildSettlement { .. }
                | GameAction::BuildCity { .. }
                | GameAction::BuyDevCard
                | GameAction::BankTrade { .. }
                | GameAction::OfferTrade { .. }
                | GameAction::RespondTrade { .. }
                | GameAction::PlayKnight
                | GameAction::PlayMonopoly
                | GameAction::PlayRoadBuilding
                | GameAction::PlayYearOfPlenty
                | GameAction::DiscardResources { .. }
                | GameAction::PlaceRobber { .. }
                | GameAction::StealResource { .. }
                | GameAction::EndTurn,
            ) => Err(ActionError::InvalidPhase),
        }
    }

    // ==================== Playing ====================

    /// Remove a card from the hand, enforcing one play per turn
    fn take_card(&mut self, player: PlayerId, card: DevelopmentCard) -> Result<(), ActionError> {
        if self.dev_card_played {
            return Err(ActionError::DevCardAlreadyPlayed);
        }
        if !self.player_mut(player)?.dev_cards.take(card) {
            return Err(ActionError::NoSuchCard);
        }
        self.dev_card_played = true;
        Ok(())
    }

    pub(super) fn play_knight(
        &mut self,
        player: PlayerId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        self.take_card(player, DevelopmentCard::Knight)?;
        self.player_mut(player)?.knights_played += 1;
        events.push(GameEvent::KnightPlayed { player });

        self.robber = Some(RobberState {
            step: RobberStep::Move,
            pending_discards: Vec::new(),
            discard_amounts: BTreeMap::new(),
            active_discarder: None,
            steal_candidates: Vec::new(),
            original_roller: player,
        });
        self.phase = GamePhase::Robber;
        Ok(())
    }

    pub(super) fn play_monopoly(&mut self, player: PlayerId) -> Result<(), ActionError> {
        self.take_card(player, DevelopmentCard::Monopoly)?;
        self.open_card_action(DevCardActionState::MonopolySelect);
        Ok(())
    }

    pub(super) fn play_year_of_plenty(&mut self, player: PlayerId) -> Result<(), ActionError> {
        self.take_card(player, DevelopmentCard::YearOfPlenty)?;
        self.open_card_action(DevCardActionState::YearOfPlentySelect);
        Ok(())
    }

    pub(super) fn play_road_building(
        &mut self,
        player: PlayerId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        self.take_card(player, DevelopmentCard::RoadBuilding)?;
        let supply = self.player(player).map_or(0, |p| p.roads_remaining());
        let roads = supply.min(ROAD_BUILDING_ROADS);
        if roads == 0 {
            return Err(ActionError::NoPiecesRemaining);
        }
        if rules::legal_road_sites(&self.occupancy(), player).is_empty() {
            return Err(ActionError::InvalidLocation);
        }

        events.push(GameEvent::RoadBuildingPlayed {
            player,
            roads: roads as u32,
        });
        self.open_card_action(DevCardActionState::RoadBuilding {
            roads_remaining: roads as u8,
        });
        Ok(())
    }

    fn open_card_action(&mut self, state: DevCardActionState) {
        self.build_mode = BuildMode::None;
        self.dev_card_action = Some(state);
        self.phase = GamePhase::DevCardAction;
    }

    fn close_card_action(&mut self) {
        self.dev_card_action = None;
        if self.phase == GamePhase::DevCardAction {
            self.phase = GamePhase::BuildingTrading;
        }
    }

    // ==================== Resolving ====================

    fn resolve_monopoly(
        &mut self,
        player: PlayerId,
        resource: Resource,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let mut total_taken = 0;
        for other in self.order_from(player) {
            if other == player {
                continue;
            }
            let amount = self.player(other).map_or(0, |p| p.resources.get(resource));
            if amount == 0 {
                continue;
            }
            ledger::transfer(
                self,
                Holder::Player(other),
                Holder::Player(player),
                &ResourceHand::single(resource, amount),
            )?;
            total_taken += amount;
        }

        events.push(GameEvent::MonopolyPlayed {
            player,
            resource,
            total_taken,
        });
        self.close_card_action();
        Ok(())
    }

    fn resolve_year_of_plenty(
        &mut self,
        player: PlayerId,
        resources: &ResourceHand,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if resources.total() != YEAR_OF_PLENTY_CARDS {
            return Err(ActionError::InvalidSelection);
        }

        // Best effort: whatever the bank still holds
        let mut received = ResourceHand::new();
        for (resource, amount) in resources.entries() {
            for _ in 0..amount {
                if self.pay_from_bank(player, resource) {
                    received.add(resource, 1);
                }
            }
        }

        events.push(GameEvent::YearOfPlentyPlayed { player, received });
        self.close_card_action();
        Ok(())
    }

    fn place_free_road(
        &mut self,
        player: PlayerId,
        edge: EdgeId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        self.build_road(player, edge, true, events)?;
        if self.is_finished() {
            return Ok(());
        }

        let remaining = match self.dev_card_action {
            Some(DevCardActionState::RoadBuilding { roads_remaining }) => {
                roads_remaining.saturating_sub(1)
            }
            _ => 0,
        };
        let can_continue = remaining > 0
            && self.player(player).is_some_and(|p| p.roads_remaining() > 0)
            && !rules::legal_road_sites(&self.occupancy(), player).is_empty();

        if can_continue {
            self.dev_card_action = Some(DevCardActionState::RoadBuilding {
                roads_remaining: remaining,
            });
        } else {
            self.close_card_action();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Building, EdgeState, VertexState};
    use crate::player::MAX_ROADS;
    use pretty_assertions::assert_eq;

    fn main_phase_with_card(card: DevelopmentCard) -> GameState {
        let mut state = GameState::standard(3, 17).unwrap();
        let vertex = rules::legal_setup_settlement_sites(&state.occupancy())[0];
        state.vertex_states[vertex.index()] = VertexState {
            building: Building::Settlement,
            owner: Some(0),
        };
        state.players[0].settlements.push(vertex);
        state.phase = GamePhase::BuildingTrading;
        state.dice_rolled = true;
        state.turn_number = 1;
        state.players[0].dev_cards.add(card);
        state
    }

    fn give(state: &mut GameState, player: PlayerId, hand: ResourceHand) {
        ledger::transfer(state, Holder::Bank, Holder::Player(player), &hand).unwrap();
    }

    #[test]
    fn test_play_without_card_rejected() {
        let state = main_phase_with_card(DevelopmentCard::Knight);
        assert_eq!(
            state.apply_action(0, &GameAction::PlayMonopoly).unwrap_err(),
            ActionError::NoSuchCard
        );
    }

    #[test]
    fn test_one_card_per_turn() {
        let mut state = main_phase_with_card(DevelopmentCard::Monopoly);
        state.players[0].dev_cards.add(DevelopmentCard::YearOfPlenty);

        let selecting = state.apply_action(0, &GameAction::PlayMonopoly).unwrap().state;
        let done = selecting
            .apply_action(
                0,
                &GameAction::SelectMonopolyResource {
                    resource: Resource::Wheat,
                },
            )
            .unwrap()
            .state;
        assert_eq!(
            done.apply_action(0, &GameAction::PlayYearOfPlenty).unwrap_err(),
            ActionError::DevCardAlreadyPlayed
        );
    }

    #[test]
    fn test_monopoly_takes_from_everyone() {
        let mut state = main_phase_with_card(DevelopmentCard::Monopoly);
        give(&mut state, 1, ResourceHand::with_amounts(0, 0, 0, 3, 1));
        give(&mut state, 2, ResourceHand::with_amounts(0, 0, 0, 2, 0));

        let selecting = state.apply_action(0, &GameAction::PlayMonopoly).unwrap().state;
        assert_eq!(selecting.phase, GamePhase::DevCardAction);
        assert_eq!(selecting.players[0].dev_cards.monopoly, 0);
        // Nothing else is accepted until the selection arrives
        assert_eq!(
            selecting.apply_action(0, &GameAction::EndTurn).unwrap_err(),
            ActionError::InvalidPhase
        );

        let transition = selecting
            .apply_action(
                0,
                &GameAction::SelectMonopolyResource {
                    resource: Resource::Wheat,
                },
            )
            .unwrap();
        let next = transition.state;
        assert_eq!(next.players[0].resources.wheat, 5);
        assert_eq!(next.players[1].resources, ResourceHand::single(Resource::Ore, 1));
        assert!(next.players[2].resources.is_empty());
        assert_eq!(next.phase, GamePhase::BuildingTrading);
        assert_eq!(
            transition.events,
            vec![GameEvent::MonopolyPlayed {
                player: 0,
                resource: Resource::Wheat,
                total_taken: 5
            }]
        );
    }

    #[test]
    fn test_year_of_plenty_needs_exactly_two() {
        let state = main_phase_with_card(DevelopmentCard::YearOfPlenty);
        let selecting = state.apply_action(0, &GameAction::PlayYearOfPlenty).unwrap().state;

        let three = GameAction::SelectYearOfPlentyResources {
            resources: ResourceHand::with_amounts(1, 1, 1, 0, 0),
        };
        assert_eq!(
            selecting.apply_action(0, &three).unwrap_err(),
            ActionError::InvalidSelection
        );

        let two = GameAction::SelectYearOfPlentyResources {
            resources: ResourceHand::single(Resource::Ore, 2),
        };
        let next = selecting.apply_action(0, &two).unwrap().state;
        assert_eq!(next.players[0].resources, ResourceHand::single(Resource::Ore, 2));
        assert_eq!(next.bank.ore, 17);
    }

    #[test]
    fn test_year_of_plenty_best_effort() {
        let mut state = main_phase_with_card(DevelopmentCard::YearOfPlenty);
        give(&mut state, 1, ResourceHand::single(Resource::Ore, 18));
        let selecting = state.apply_action(0, &GameAction::PlayYearOfPlenty).unwrap().state;

        let next = selecting
            .apply_action(
                0,
                &GameAction::SelectYearOfPlentyResources {
                    resources: ResourceHand::single(Resource::Ore, 2),
                },
            )
            .unwrap()
            .state;
        assert_eq!(next.players[0].resources.ore, 1);
        assert_eq!(next.bank.ore, 0);
        assert_eq!(next.phase, GamePhase::BuildingTrading);
    }

    #[test]
    fn test_road_building_places_two_free_roads() {
        let state = main_phase_with_card(DevelopmentCard::RoadBuilding);
        let playing = state.apply_action(0, &GameAction::PlayRoadBuilding).unwrap().state;
        assert_eq!(
            playing.dev_card_action,
            Some(DevCardActionState::RoadBuilding { roads_remaining: 2 })
        );

        let first = rules::legal_road_sites(&playing.occupancy(), 0)[0];
        let one = playing
            .apply_action(0, &GameAction::EdgeClicked { edge: first })
            .unwrap()
            .state;
        assert_eq!(
            one.dev_card_action,
            Some(DevCardActionState::RoadBuilding { roads_remaining: 1 })
        );

        let second = rules::legal_road_sites(&one.occupancy(), 0)[0];
        let two = one
            .apply_action(0, &GameAction::BuildRoad { edge: second })
            .unwrap()
            .state;
        assert_eq!(two.phase, GamePhase::BuildingTrading);
        assert_eq!(two.players[0].roads.len(), 2);
        assert_eq!(two.bank, state.bank);
    }

    #[test]
    fn test_road_building_with_one_piece_left() {
        let mut state = main_phase_with_card(DevelopmentCard::RoadBuilding);
        state.players[0].roads = (0..MAX_ROADS as u16 - 1).map(|i| EdgeId(1000 + i)).collect();

        let transition = state.apply_action(0, &GameAction::PlayRoadBuilding).unwrap();
        assert_eq!(
            transition.state.dev_card_action,
            Some(DevCardActionState::RoadBuilding { roads_remaining: 1 })
        );
    }

    #[test]
    fn test_road_building_without_supply_rejected() {
        let mut state = main_phase_with_card(DevelopmentCard::RoadBuilding);
        state.players[0].roads = (0..MAX_ROADS as u16).map(|i| EdgeId(1000 + i)).collect();
        assert_eq!(
            state.apply_action(0, &GameAction::PlayRoadBuilding).unwrap_err(),
            ActionError::NoPiecesRemaining
        );
    }

    #[test]
    fn test_knight_moves_robber_then_returns() {
        let state = main_phase_with_card(DevelopmentCard::Knight);
        let playing = state.apply_action(0, &GameAction::PlayKnight).unwrap().state;
        assert_eq!(playing.phase, GamePhase::Robber);
        assert_eq!(playing.players[0].knights_played, 1);
        assert_eq!(playing.robber.as_ref().unwrap().step, RobberStep::Move);

        let tile = playing
            .board
            .land_tiles()
            .find(|t| {
                t.id != playing.robber_tile
                    && t.adjacent_vertices
                        .iter()
                        .all(|v| playing.vertex_states[v.index()].is_empty())
            })
            .map(|t| t.id)
            .unwrap();
        let next = playing
            .apply_action(0, &GameAction::PlaceRobber { tile })
            .unwrap()
            .state;
        assert_eq!(next.phase, GamePhase::BuildingTrading);
        assert!(next.dev_card_played);
    }

    #[test]
    fn test_rejected_free_road_changes_nothing() {
        let state = main_phase_with_card(DevelopmentCard::RoadBuilding);
        let playing = state.apply_action(0, &GameAction::PlayRoadBuilding).unwrap().state;
        let bad = playing
            .board
            .edges
            .iter()
            .find(|e| !rules::can_build_road(&playing.occupancy(), 0, e.id))
            .map(|e| e.id)
            .unwrap();
        let after = playing.dispatch(0, &GameAction::EdgeClicked { edge: bad });
        assert_eq!(after, playing);
        assert!(after.edge_states.iter().all(|e| *e == EdgeState::default()));
    }
}

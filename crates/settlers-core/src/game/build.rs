//! Building and trading phase.
//!
//! Board clicks are read through the current build mode; the explicit
//! `Build*` actions work whatever the mode. Every purchase checks the site,
//! then the piece supply, then pays the bank.

use super::{ActionError, GamePhase, GameState};
use crate::actions::{BuildMode, GameAction, GameEvent, TradeOffer};
use crate::board::{Building, EdgeId, PlayerId, Resource, VertexId, VertexState};
use crate::ledger::{self, Holder, LedgerError};
use crate::player::{costs, ResourceHand};
use crate::rules;

impl GameState {
    pub(super) fn handle_building_trading(
        &mut self,
        player: PlayerId,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        // An open offer blocks everything but its answer
        if self.trade_offer.is_some() && !matches!(action, GameAction::RespondTrade { .. }) {
            return Err(ActionError::TradePending);
        }

        match action {
            GameAction::SetBuildMode { mode } => {
                self.build_mode = *mode;
                Ok(())
            }
            GameAction::VertexClicked { vertex } => match self.build_mode {
                BuildMode::Settlement => self.build_settlement(player, *vertex, events),
                BuildMode::City => self.build_city(player, *vertex, events),
                BuildMode::None | BuildMode::Road | BuildMode::Bank => {
                    Err(ActionError::WrongBuildMode)
                }
            },
            GameAction::EdgeClicked { edge } => match self.build_mode {
                BuildMode::Road => self.build_road(player, *edge, false, events),
                BuildMode::None | BuildMode::Settlement | BuildMode::City | BuildMode::Bank => {
                    Err(ActionError::WrongBuildMode)
                }
            },
            GameAction::BuildSettlement { vertex } => self.build_settlement(player, *vertex, events),
            GameAction::BuildCity { vertex } => self.build_city(player, *vertex, events),
            GameAction::BuildRoad { edge } => self.build_road(player, *edge, false, events),
            GameAction::BuyDevCard => self.buy_dev_card(player, events),
            GameAction::BankTrade { give, receive } => {
                self.bank_trade(player, *give, *receive, events)
            }
            GameAction::OfferTrade { to, offer, request } => {
                self.offer_trade(player, *to, offer, request, events)
            }
            GameAction::RespondTrade { accepted } => self.respond_trade(player, *accepted, events),
            GameAction::PlayKnight => self.play_knight(player, events),
            GameAction::PlayMonopoly => self.play_monopoly(player),
            GameAction::PlayRoadBuilding => self.play_road_building(player, events),
            GameAction::PlayYearOfPlenty => self.play_year_of_plenty(player),
            GameAction::EndTurn => {
                self.end_turn(player, events);
                Ok(())
            }
            GameAction::PlaceSettlement { .. }
            | GameAction::PlaceRoad { .. }
            | GameAction::RollDice { .. }
            | GameAction::SelectMonopolyResource { .. }
            | GameAction::SelectYearOfPlentyResources { .. }
            | GameAction::DiscardResources { .. }
            | GameAction::PlaceRobber { .. }
            | GameAction::StealResource { .. } => Err(ActionError::InvalidPhase),
        }
    }

    // ==================== Building ====================

    fn build_settlement(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if !rules::can_build_settlement(&self.occupancy(), player, vertex) {
            return Err(ActionError::InvalidLocation);
        }
        if self.player(player).map_or(0, |p| p.settlements_remaining()) == 0 {
            return Err(ActionError::NoPiecesRemaining);
        }
        self.pay_to_bank(player, &costs::settlement())?;

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

        self.check_for_winner(events);
        Ok(())
    }

    fn build_city(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if !rules::can_build_city(&self.occupancy(), player, vertex) {
            return Err(ActionError::InvalidLocation);
        }
        if self.player(player).map_or(0, |p| p.cities_remaining()) == 0 {
            return Err(ActionError::NoPiecesRemaining);
        }
        self.pay_to_bank(player, &costs::city())?;

        self.vertex_states[vertex.index()].building = Building::City;
        let p = self.player_mut(player)?;
        // The settlement piece goes back to the supply
        p.settlements.retain(|v| *v != vertex);
        p.cities.push(vertex);
        self.refresh_scores();
        events.push(GameEvent::CityBuilt { player, vertex });

        self.check_for_winner(events);
        Ok(())
    }

    /// Build a road; `free` skips the cost for road building cards
    pub(super) fn build_road(
        &mut self,
        player: PlayerId,
        edge: EdgeId,
        free: bool,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if !rules::can_build_road(&self.occupancy(), player, edge) {
            return Err(ActionError::InvalidLocation);
        }
        if self.player(player).map_or(0, |p| p.roads_remaining()) == 0 {
            return Err(ActionError::NoPiecesRemaining);
        }
        if !free {
            self.pay_to_bank(player, &costs::road())?;
        }

        self.edge_states[edge.index()].owner = Some(player);
        self.player_mut(player)?.roads.push(edge);
        events.push(GameEvent::RoadPlaced { player, edge });

        self.check_for_winner(events);
        Ok(())
    }

    fn buy_dev_card(
        &mut self,
        player: PlayerId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if self.dev_deck.is_empty() {
            return Err(ActionError::EmptyDeck);
        }
        self.pay_to_bank(player, &costs::development_card())?;

        let card = self.dev_deck.pop().ok_or(ActionError::EmptyDeck)?;
        self.player_mut(player)?.dev_cards.add(card);
        events.push(GameEvent::DevCardBought { player });

        self.check_for_winner(events);
        Ok(())
    }

    // ==================== Trading ====================

    fn bank_trade(
        &mut self,
        player: PlayerId,
        give: Resource,
        receive: Resource,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if give == receive {
            return Err(ActionError::InvalidTrade);
        }
        let ratio = self
            .player(player)
            .map(|p| p.ports.trade_ratio(give))
            .ok_or(ActionError::UnknownPlayer(player))?;

        ledger::exchange(
            self,
            Holder::Player(player),
            Holder::Bank,
            &ResourceHand::single(give, ratio),
            &ResourceHand::single(receive, 1),
        )
        .map_err(|err| match err {
            LedgerError::Insufficient {
                holder: Holder::Player(_),
                ..
            } => ActionError::CannotAfford,
            other => ActionError::Ledger(other),
        })?;

        events.push(GameEvent::BankTraded {
            player,
            gave: give,
            gave_count: ratio,
            received: receive,
        });
        Ok(())
    }

    fn offer_trade(
        &mut self,
        player: PlayerId,
        to: PlayerId,
        offer: &ResourceHand,
        request: &ResourceHand,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if to == player || self.player(to).is_none() {
            return Err(ActionError::InvalidTarget);
        }
        let trade = TradeOffer {
            from: player,
            to,
            offer: *offer,
            request: *request,
        };
        if !trade.is_valid() {
            return Err(ActionError::InvalidTrade);
        }
        if !self.player(player).is_some_and(|p| p.resources.can_afford(offer)) {
            return Err(ActionError::CannotAfford);
        }

        events.push(GameEvent::TradeOffered {
            offer: trade.clone(),
        });
        self.trade_offer = Some(trade);
        Ok(())
    }

    fn respond_trade(
        &mut self,
        player: PlayerId,
        accepted: bool,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        let trade = self.trade_offer.clone().ok_or(ActionError::NoActiveTrade)?;
        if trade.to != player {
            return Err(ActionError::NotYourTurn);
        }

        if accepted {
            ledger::exchange(
                self,
                Holder::Player(trade.from),
                Holder::Player(trade.to),
                &trade.offer,
                &trade.request,
            )
            .map_err(|_| ActionError::CannotAfford)?;
            events.push(GameEvent::TradeCompleted {
                from: trade.from,
                to: trade.to,
            });
        } else {
            events.push(GameEvent::TradeDeclined {
                from: trade.from,
                to: trade.to,
            });
        }
        self.trade_offer = None;
        Ok(())
    }

    // ==================== Turn Management ====================

    fn end_turn(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let count = self.turn_order.len().max(1);
        self.current_player_index = (self.current_player_index + 1) % count;
        self.current_player = self.turn_owner();

        self.phase = GamePhase::DiceRoll;
        self.dice_rolled = false;
        self.dev_card_played = false;
        self.build_mode = BuildMode::None;
        self.trade_offer = None;
        self.turn_number += 1;

        events.push(GameEvent::TurnEnded {
            player,
            next_player: self.current_player,
        });
    }
}

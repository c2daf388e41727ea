//! Dice roll phase.
//!
//! A 7 hands over to the robber. Any other roll pays every building next to
//! a matching tile. When the bank cannot cover a resource, cards go out one
//! at a time, cycling through the owed players starting with the roller,
//! until either the demand or the bank runs dry.

use super::{ActionError, GamePhase, GameState, RobberState, RobberStep};
use crate::actions::{GameAction, GameEvent};
use crate::board::{PlayerId, Resource};
use std::collections::BTreeMap;

impl GameState {
    pub(super) fn handle_dice_roll(
        &mut self,
        player: PlayerId,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        match action {
            GameAction::RollDice { roll } => self.roll_dice(player, *roll, events),
            GameAction::VertexClicked { .. }
            | GameAction::EdgeClicked { .. }
            | GameAction::PlaceSettlement { .. }
            | GameAction::PlaceRoad { .. }
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

    fn roll_dice(
        &mut self,
        player: PlayerId,
        roll: u8,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ActionError> {
        if !(2..=12).contains(&roll) {
            return Err(ActionError::InvalidRoll(roll));
        }
        if self.dice_rolled {
            return Err(ActionError::InvalidPhase);
        }

        self.dice_rolled = true;
        self.last_roll = Some(roll);
        events.push(GameEvent::DiceRolled { player, roll });

        if roll == 7 {
            self.start_robber_after_seven(player, events);
        } else {
            self.produce(roll, events);
            self.phase = GamePhase::BuildingTrading;
        }
        Ok(())
    }

    /// Turn order rotated so `first` comes first
    pub(super) fn order_from(&self, first: PlayerId) -> Vec<PlayerId> {
        let start = self
            .turn_order
            .iter()
            .position(|p| *p == first)
            .unwrap_or(0);
        self.turn_order[start..]
            .iter()
            .chain(&self.turn_order[..start])
            .copied()
            .collect()
    }

    fn start_robber_after_seven(&mut self, roller: PlayerId, events: &mut Vec<GameEvent>) {
        let mut pending = Vec::new();
        let mut amounts = BTreeMap::new();
        for id in self.order_from(roller) {
            let total = self.player(id).map(|p| p.resources.total()).unwrap_or(0);
            if total >= 8 {
                pending.push(id);
                amounts.insert(id, total / 2);
            }
        }

        let active = pending.first().copied();
        if !pending.is_empty() {
            events.push(GameEvent::DiscardRequired {
                players: pending.clone(),
            });
        }
        self.robber = Some(RobberState {
            step: if active.is_some() {
                RobberStep::Discard
            } else {
                RobberStep::Move
            },
            pending_discards: pending,
            discard_amounts: amounts,
            active_discarder: active,
            steal_candidates: Vec::new(),
            original_roller: roller,
        });
        if let Some(discarder) = active {
            self.current_player = discarder;
        }
        self.phase = GamePhase::Robber;
    }

    /// Cards owed to each player for a roll, per resource
    pub fn production_demand(&self, roll: u8) -> BTreeMap<Resource, BTreeMap<PlayerId, u32>> {
        let mut demand: BTreeMap<Resource, BTreeMap<PlayerId, u32>> = BTreeMap::new();
        for tile in &self.board.tiles {
            if tile.token != Some(roll) || tile.id == self.robber_tile {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            for vertex in &tile.adjacent_vertices {
                let site = self.vertex_states[vertex.index()];
                if let Some(owner) = site.owner {
                    let payout = site.building.payout();
                    if payout > 0 {
                        *demand.entry(resource).or_default().entry(owner).or_default() += payout;
                    }
                }
            }
        }
        demand
    }

    fn produce(&mut self, roll: u8, events: &mut Vec<GameEvent>) {
        let order = self.order_from(self.turn_owner());
        let mut payouts = Vec::new();

        for (resource, mut owed) in self.production_demand(roll) {
            let mut paid: BTreeMap<PlayerId, u32> = BTreeMap::new();
            loop {
                let mut paid_this_pass = false;
                for &id in &order {
                    let Some(remaining) = owed.get_mut(&id) else {
                        continue;
                    };
                    if *remaining == 0 {
                        continue;
                    }
                    if !self.pay_from_bank(id, resource) {
                        break;
                    }
                    *remaining -= 1;
                    *paid.entry(id).or_default() += 1;
                    paid_this_pass = true;
                }
                if !paid_this_pass {
                    break;
                }
            }
            for id in &order {
                if let Some(&n) = paid.get(id) {
                    payouts.push((*id, resource, n));
                }
            }
        }

        if !payouts.is_empty() {
            events.push(GameEvent::ResourcesProduced { payouts });
        }
    }
}

//! Enumeration of the actions a player may take right now.
//!
//! Only canonical actions are listed: board clicks are aliases for the
//! explicit placement and build actions, and `SetBuildMode` never changes
//! what can be built, so neither appears. Player trade offers are open-ended
//! and are left to the caller. Every listed action is accepted by
//! `apply_action`.

use super::{DevCardActionState, GamePhase, GameState, RobberStep, SetupStep};
use crate::actions::GameAction;
use crate::board::{PlayerId, Resource};
use crate::player::{costs, DevelopmentCard, ResourceHand};
use crate::rules;

impl GameState {
    /// Get all currently valid actions for a player
    pub fn legal_actions(&self, player: PlayerId) -> Vec<GameAction> {
        if self.expected_actor() != Some(player) {
            return Vec::new();
        }

        match self.phase {
            GamePhase::Setup => self.legal_setup_actions(player),
            GamePhase::DiceRoll => (2..=12).map(|roll| GameAction::RollDice { roll }).collect(),
            GamePhase::Robber => self.legal_robber_actions(player),
            GamePhase::BuildingTrading => self.legal_main_actions(player),
            GamePhase::DevCardAction => self.legal_card_follow_ups(player),
            GamePhase::GameOver => Vec::new(),
        }
    }

    fn legal_setup_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let occ = self.occupancy();
        match self.setup_step {
            SetupStep::Settlement => rules::legal_setup_settlement_sites(&occ)
                .into_iter()
                .map(|vertex| GameAction::PlaceSettlement { vertex })
                .collect(),
            SetupStep::Road => self
                .player(player)
                .and_then(|p| p.settlements.last())
                .map(|settlement| {
                    rules::legal_setup_road_sites(&occ, *settlement)
                        .into_iter()
                        .map(|edge| GameAction::PlaceRoad { edge })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn legal_robber_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let Some(robber) = &self.robber else {
            return Vec::new();
        };
        match robber.step {
            RobberStep::Discard => {
                let owed = robber.discard_amounts.get(&player).copied().unwrap_or(0);
                match self.player(player) {
                    Some(p) if robber.active_discarder == Some(player) => {
                        vec![GameAction::DiscardResources {
                            resources: greedy_discard(&p.resources, owed),
                        }]
                    }
                    _ => Vec::new(),
                }
            }
            RobberStep::Move => self
                .board
                .land_tiles()
                .filter(|t| t.id != self.robber_tile)
                .map(|t| GameAction::PlaceRobber { tile: t.id })
                .collect(),
            RobberStep::Steal => robber
                .steal_candidates
                .iter()
                .map(|victim| GameAction::StealResource { victim: *victim })
                .collect(),
        }
    }

    fn legal_main_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let Some(p) = self.player(player) else {
            return Vec::new();
        };

        if let Some(offer) = &self.trade_offer {
            let mut actions = vec![GameAction::RespondTrade { accepted: false }];
            if p.resources.can_afford(&offer.request) {
                actions.push(GameAction::RespondTrade { accepted: true });
            }
            return actions;
        }

        let occ = self.occupancy();
        let mut actions = vec![GameAction::EndTurn];

        if p.roads_remaining() > 0 && p.resources.can_afford(&costs::road()) {
            actions.extend(
                rules::legal_road_sites(&occ, player)
                    .into_iter()
                    .map(|edge| GameAction::BuildRoad { edge }),
            );
        }
        if p.settlements_remaining() > 0 && p.resources.can_afford(&costs::settlement()) {
            actions.extend(
                rules::legal_settlement_sites(&occ, player)
                    .into_iter()
                    .map(|vertex| GameAction::BuildSettlement { vertex }),
            );
        }
        if p.cities_remaining() > 0 && p.resources.can_afford(&costs::city()) {
            actions.extend(
                rules::legal_city_sites(&occ, player)
                    .into_iter()
                    .map(|vertex| GameAction::BuildCity { vertex }),
            );
        }
        if !self.dev_deck.is_empty() && p.resources.can_afford(&costs::development_card()) {
            actions.push(GameAction::BuyDevCard);
        }

        for give in Resource::ALL {
            if p.resources.get(give) < p.ports.trade_ratio(give) {
                continue;
            }
            for receive in Resource::ALL {
                if receive != give && self.bank.get(receive) > 0 {
                    actions.push(GameAction::BankTrade { give, receive });
                }
            }
        }

        if !self.dev_card_played {
            let cards = &p.dev_cards;
            if cards.count(DevelopmentCard::Knight) > 0 {
                actions.push(GameAction::PlayKnight);
            }
            if cards.count(DevelopmentCard::Monopoly) > 0 {
                actions.push(GameAction::PlayMonopoly);
            }
            if cards.count(DevelopmentCard::YearOfPlenty) > 0 {
                actions.push(GameAction::PlayYearOfPlenty);
            }
            if cards.count(DevelopmentCard::RoadBuilding) > 0
                && p.roads_remaining() > 0
                && !rules::legal_road_sites(&occ, player).is_empty()
            {
                actions.push(GameAction::PlayRoadBuilding);
            }
        }

        actions
    }

    fn legal_card_follow_ups(&self, player: PlayerId) -> Vec<GameAction> {
        match self.dev_card_action {
            Some(DevCardActionState::MonopolySelect) => Resource::ALL
                .into_iter()
                .map(|resource| GameAction::SelectMonopolyResource { resource })
                .collect(),
            Some(DevCardActionState::YearOfPlentySelect) => {
                let mut actions = Vec::new();
                for (i, first) in Resource::ALL.into_iter().enumerate() {
                    for second in Resource::ALL.into_iter().skip(i) {
                        let mut resources = ResourceHand::single(first, 1);
                        resources.add(second, 1);
                        actions.push(GameAction::SelectYearOfPlentyResources { resources });
                    }
                }
                actions
            }
            Some(DevCardActionState::RoadBuilding { .. }) => {
                rules::legal_road_sites(&self.occupancy(), player)
                    .into_iter()
                    .map(|edge| GameAction::BuildRoad { edge })
                    .collect()
            }
            None => Vec::new(),
        }
    }
}

/// Discard `owed` cards, one at a time from the largest pile
fn greedy_discard(hand: &ResourceHand, owed: u32) -> ResourceHand {
    let mut remaining = *hand;
    let mut discard = ResourceHand::new();
    for _ in 0..owed {
        let Some(largest) = Resource::ALL
            .into_iter()
            .filter(|r| remaining.get(*r) > 0)
            .max_by_key(|r| (remaining.get(*r), std::cmp::Reverse(*r as u8)))
        else {
            break;
        };
        remaining.set(largest, remaining.get(largest) - 1);
        discard.add(largest, 1);
    }
    discard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::BuildMode;

    #[test]
    fn test_only_expected_actor_has_actions() {
        let state = GameState::standard(3, 2).unwrap();
        assert!(!state.legal_actions(0).is_empty());
        assert!(state.legal_actions(1).is_empty());
    }

    #[test]
    fn test_setup_lists_every_free_site() {
        let state = GameState::standard(2, 2).unwrap();
        // 54 land vertices on the standard board
        assert_eq!(state.legal_actions(0).len(), 54);
    }

    #[test]
    fn test_greedy_discard_takes_from_largest() {
        let hand = ResourceHand::with_amounts(5, 1, 3, 0, 1);
        let discard = greedy_discard(&hand, 5);
        assert_eq!(discard.total(), 5);
        assert_eq!(discard, ResourceHand::with_amounts(4, 0, 1, 0, 0));
    }

    #[test]
    fn test_dice_roll_lists_all_sums() {
        let mut state = GameState::standard(2, 2).unwrap();
        state.phase = GamePhase::DiceRoll;
        assert_eq!(state.legal_actions(0).len(), 11);
    }

    #[test]
    fn test_main_phase_listed_actions_are_accepted() {
        let mut state = GameState::standard(2, 2).unwrap();
        state.phase = GamePhase::BuildingTrading;
        state.dice_rolled = true;
        state.build_mode = BuildMode::None;
        state.players[0].resources = ResourceHand::uniform(4);
        state.bank = ResourceHand::uniform(15);
        state.players[0].dev_cards.add(DevelopmentCard::YearOfPlenty);

        let actions = state.legal_actions(0);
        assert!(actions.contains(&GameAction::EndTurn));
        assert!(actions.contains(&GameAction::BuyDevCard));
        assert!(actions.contains(&GameAction::PlayYearOfPlenty));
        for action in &actions {
            assert!(state.apply_action(0, action).is_ok(), "{action:?} rejected");
        }
    }
}

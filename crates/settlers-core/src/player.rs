//! Player state and resource hands.
//!
//! This module contains:
//! - ResourceHand for counting the five resources
//! - Development card kinds, the standard deck and per-player card counters
//! - Port access flags
//! - Building costs and per-player supply limits
//! - PlayerState, the per-player record carried on the game state

use crate::board::{EdgeId, PlayerId, Port, Resource, VertexId};
use serde::{Deserialize, Serialize};

/// Settlements a player may have on the board at once
pub const MAX_SETTLEMENTS: usize = 5;
/// Cities a player may have on the board at once
pub const MAX_CITIES: usize = 4;
/// Roads a player may have on the board at once
pub const MAX_ROADS: usize = 15;

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// A hand holding `amount` of every resource
    pub fn uniform(amount: u32) -> Self {
        Self::with_amounts(amount, amount, amount, amount, amount)
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Wood => self.wood = count,
            Resource::Brick => self.brick = count,
            Resource::Sheep => self.sheep = count,
            Resource::Wheat => self.wheat = count,
            Resource::Ore => self.ore = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Non-zero (resource, count) pairs in canonical resource order
    pub fn entries(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(move |r| (r, self.get(r)))
            .filter(|(_, n)| *n > 0)
    }

    /// Resource kinds with at least one card
    pub fn held_kinds(&self) -> Vec<Resource> {
        self.entries().map(|(r, _)| r).collect()
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move the robber and steal
    Knight,
    /// Worth 1 hidden VP, never played
    VictoryPoint,
    /// Place 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// Every other player gives you all of one resource
    Monopoly,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards, unshuffled)
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }

    /// Whether this card can be played (VP cards are never "played")
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevelopmentCard::VictoryPoint)
    }
}

/// Development cards held by one player, as counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCardHand {
    pub knight: u32,
    pub victory_point: u32,
    pub road_building: u32,
    pub year_of_plenty: u32,
    pub monopoly: u32,
}

impl DevCardHand {
    pub fn count(&self, card: DevelopmentCard) -> u32 {
        match card {
            DevelopmentCard::Knight => self.knight,
            DevelopmentCard::VictoryPoint => self.victory_point,
            DevelopmentCard::RoadBuilding => self.road_building,
            DevelopmentCard::YearOfPlenty => self.year_of_plenty,
            DevelopmentCard::Monopoly => self.monopoly,
        }
    }

    fn slot(&mut self, card: DevelopmentCard) -> &mut u32 {
        match card {
            DevelopmentCard::Knight => &mut self.knight,
            DevelopmentCard::VictoryPoint => &mut self.victory_point,
            DevelopmentCard::RoadBuilding => &mut self.road_building,
            DevelopmentCard::YearOfPlenty => &mut self.year_of_plenty,
            DevelopmentCard::Monopoly => &mut self.monopoly,
        }
    }

    /// Add a drawn card
    pub fn add(&mut self, card: DevelopmentCard) {
        *self.slot(card) += 1;
    }

    /// Remove one card of the given kind, returning false if none is held
    pub fn take(&mut self, card: DevelopmentCard) -> bool {
        let slot = self.slot(card);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Total cards held, including victory points
    pub fn total(&self) -> u32 {
        self.knight + self.victory_point + self.road_building + self.year_of_plenty + self.monopoly
    }
}

/// Which trade ports a player can use
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAccess {
    pub wood: bool,
    pub brick: bool,
    pub sheep: bool,
    pub wheat: bool,
    pub ore: bool,
    pub generic: bool,
}

impl PortAccess {
    /// Grant access to a port. Flags are never cleared.
    pub fn grant(&mut self, port: Port) {
        match port {
            Port::Generic => self.generic = true,
            Port::Specific(Resource::Wood) => self.wood = true,
            Port::Specific(Resource::Brick) => self.brick = true,
            Port::Specific(Resource::Sheep) => self.sheep = true,
            Port::Specific(Resource::Wheat) => self.wheat = true,
            Port::Specific(Resource::Ore) => self.ore = true,
        }
    }

    pub fn has_specific(&self, resource: Resource) -> bool {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Cards of `resource` required per card received from the bank
    pub fn trade_ratio(&self, resource: Resource) -> u32 {
        if self.has_specific(resource) {
            2
        } else if self.generic {
            3
        } else {
            4
        }
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 sheep, 1 wheat, 1 ore
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player ID (position in the turn order)
    pub id: PlayerId,
    /// Current resources
    pub resources: ResourceHand,
    pub roads: Vec<EdgeId>,
    pub settlements: Vec<VertexId>,
    pub cities: Vec<VertexId>,
    /// Visible victory points (settlements and cities)
    pub victory_points: u32,
    pub ports: PortAccess,
    pub dev_cards: DevCardHand,
    /// Knights played so far
    pub knights_played: u32,
}

impl PlayerState {
    /// Create a new player with nothing on the board
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            resources: ResourceHand::new(),
            roads: Vec::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            victory_points: 0,
            ports: PortAccess::default(),
            dev_cards: DevCardHand::default(),
            knights_played: 0,
        }
    }

    pub fn settlements_remaining(&self) -> usize {
        MAX_SETTLEMENTS.saturating_sub(self.settlements.len())
    }

    pub fn cities_remaining(&self) -> usize {
        MAX_CITIES.saturating_sub(self.cities.len())
    }

    pub fn roads_remaining(&self) -> usize {
        MAX_ROADS.saturating_sub(self.roads.len())
    }

    /// Hidden VP (victory point cards)
    pub fn hidden_vp(&self) -> u32 {
        self.dev_cards.victory_point
    }

    /// Whether the player holds any card that can be played
    pub fn has_playable_dev_card(&self) -> bool {
        self.dev_cards.knight
            + self.dev_cards.road_building
            + self.dev_cards.year_of_plenty
            + self.dev_cards.monopoly
            > 0
    }
}

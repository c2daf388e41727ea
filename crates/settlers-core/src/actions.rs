//! Game actions that players can take.
//!
//! This module defines the closed action vocabulary accepted by the engine
//! and the events that result from accepted actions.

use crate::board::{EdgeId, PlayerId, Resource, TileId, VertexId};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};

/// How clicks on the board are interpreted during building/trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BuildMode {
    #[default]
    None,
    Road,
    Settlement,
    City,
    Bank,
}

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameAction {
    // ==================== Board Clicks ====================
    /// A vertex was selected; meaning depends on phase and build mode
    VertexClicked { vertex: VertexId },
    /// An edge was selected; meaning depends on phase and build mode
    EdgeClicked { edge: EdgeId },

    // ==================== Setup Phase ====================
    /// Place a starting settlement
    PlaceSettlement { vertex: VertexId },
    /// Place a starting road next to the settlement just placed
    PlaceRoad { edge: EdgeId },

    // ==================== Turn Actions ====================
    /// Submit a two-dice sum rolled outside the engine
    RollDice { roll: u8 },

    // ==================== Building Actions ====================
    SetBuildMode { mode: BuildMode },
    BuildSettlement { vertex: VertexId },
    BuildRoad { edge: EdgeId },
    /// Upgrade one of your settlements
    BuildCity { vertex: VertexId },
    BuyDevCard,

    // ==================== Trading Actions ====================
    /// Trade with the bank at your best ratio for `give`
    BankTrade { give: Resource, receive: Resource },
    /// Offer a trade to one other player
    OfferTrade {
        to: PlayerId,
        offer: ResourceHand,
        request: ResourceHand,
    },
    /// Accept or decline the trade offered to you
    RespondTrade { accepted: bool },

    // ==================== Development Card Actions ====================
    PlayKnight,
    PlayMonopoly,
    SelectMonopolyResource { resource: Resource },
    PlayRoadBuilding,
    PlayYearOfPlenty,
    /// Exactly two units, in any combination
    SelectYearOfPlentyResources { resources: ResourceHand },

    // ==================== Robber Actions ====================
    /// Discard half your hand after a 7
    DiscardResources { resources: ResourceHand },
    PlaceRobber { tile: TileId },
    StealResource { victim: PlayerId },

    // ==================== Turn Management ====================
    EndTurn,
}

impl GameAction {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::VertexClicked { .. } => "vertex_clicked",
            GameAction::EdgeClicked { .. } => "edge_clicked",
            GameAction::PlaceSettlement { .. } => "place_settlement",
            GameAction::PlaceRoad { .. } => "place_road",
            GameAction::RollDice { .. } => "roll_dice",
            GameAction::SetBuildMode { .. } => "set_build_mode",
            GameAction::BuildSettlement { .. } => "build_settlement",
            GameAction::BuildRoad { .. } => "build_road",
            GameAction::BuildCity { .. } => "build_city",
            GameAction::BuyDevCard => "buy_dev_card",
            GameAction::BankTrade { .. } => "bank_trade",
            GameAction::OfferTrade { .. } => "offer_trade",
            GameAction::RespondTrade { .. } => "respond_trade",
            GameAction::PlayKnight => "play_knight",
            GameAction::PlayMonopoly => "play_monopoly",
            GameAction::SelectMonopolyResource { .. } => "select_monopoly_resource",
            GameAction::PlayRoadBuilding => "play_road_building",
            GameAction::PlayYearOfPlenty => "play_year_of_plenty",
            GameAction::SelectYearOfPlentyResources { .. } => "select_year_of_plenty_resources",
            GameAction::DiscardResources { .. } => "discard_resources",
            GameAction::PlaceRobber { .. } => "place_robber",
            GameAction::StealResource { .. } => "steal_resource",
            GameAction::EndTurn => "end_turn",
        }
    }
}

/// A pending trade between two players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Player making the offer
    pub from: PlayerId,
    /// Player who must answer
    pub to: PlayerId,
    /// Resources being offered
    pub offer: ResourceHand,
    /// Resources being requested
    pub request: ResourceHand,
}

impl TradeOffer {
    /// Both sides must be non-empty
    pub fn is_valid(&self) -> bool {
        !self.offer.is_empty() && !self.request.is_empty()
    }
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    SettlementPlaced {
        player: PlayerId,
        vertex: VertexId,
    },
    RoadPlaced {
        player: PlayerId,
        edge: EdgeId,
    },
    CityBuilt {
        player: PlayerId,
        vertex: VertexId,
    },
    /// Resources granted for the second setup settlement
    StartingResources {
        player: PlayerId,
        resources: ResourceHand,
    },
    /// Setup finished; the first regular turn starts
    SetupComplete,

    DiceRolled {
        player: PlayerId,
        roll: u8,
    },
    /// Cards paid out by the bank after a roll
    ResourcesProduced {
        payouts: Vec<(PlayerId, Resource, u32)>,
    },

    DiscardRequired {
        players: Vec<PlayerId>,
    },
    CardsDiscarded {
        player: PlayerId,
        count: u32,
    },
    RobberMoved {
        player: PlayerId,
        from: TileId,
        to: TileId,
    },
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Resource,
    },

    DevCardBought {
        player: PlayerId,
    },
    KnightPlayed {
        player: PlayerId,
    },
    MonopolyPlayed {
        player: PlayerId,
        resource: Resource,
        total_taken: u32,
    },
    YearOfPlentyPlayed {
        player: PlayerId,
        received: ResourceHand,
    },
    RoadBuildingPlayed {
        player: PlayerId,
        roads: u32,
    },

    BankTraded {
        player: PlayerId,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },
    TradeOffered {
        offer: TradeOffer,
    },
    TradeCompleted {
        from: PlayerId,
        to: PlayerId,
    },
    TradeDeclined {
        from: PlayerId,
        to: PlayerId,
    },

    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

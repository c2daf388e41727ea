//! Core game state machine.
//!
//! `GameState` is the aggregate root. Every accepted action produces a new
//! state value; a rejected action leaves the caller's state untouched.
//!
//! Each phase has its own handler module:
//! - [`setup`]: snake-draft settlement and road placement
//! - [`dice`]: roll submission and production
//! - [`robber`]: discard, move and steal steps
//! - [`build`]: building, trading and ending the turn
//! - [`dev_cards`]: development card plays and their follow-up selections
//!
//! Handlers match every `GameAction` variant explicitly, so a new variant
//! does not compile until each phase decides what to do with it.

mod build;
mod dev_cards;
mod dice;
mod legal;
mod robber;
mod setup;

use crate::actions::{BuildMode, GameAction, GameEvent, TradeOffer};
use crate::board::{BoardGeometry, EdgeState, PlayerId, Resource, TileId, VertexState};
use crate::config::GameConfig;
use crate::generator::generate;
use crate::ledger::{self, Holder, LedgerError, ResourceAccounts};
use crate::player::{DevelopmentCard, PlayerState, ResourceHand};
use crate::rules::Occupancy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial snake-draft placement
    Setup,
    /// Waiting for the turn owner to submit a roll
    DiceRoll,
    /// Resolving a 7 or a knight; see `RobberState`
    Robber,
    /// Main part of the turn: build, trade, play cards, end turn
    BuildingTrading,
    /// A development card is waiting for its follow-up selection
    DevCardAction,
    /// Someone has won; every action is rejected
    GameOver,
}

/// Direction of the setup snake draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupRound {
    Forward,
    Reverse,
}

/// What is placed next during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStep {
    Settlement,
    Road,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobberStep {
    Discard,
    Move,
    Steal,
}

/// Transient state while the robber is being resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobberState {
    pub step: RobberStep,
    /// Players who still owe a discard, in the order they must act
    pub pending_discards: Vec<PlayerId>,
    /// Cards owed by each player, fixed when the 7 was rolled
    pub discard_amounts: BTreeMap<PlayerId, u32>,
    pub active_discarder: Option<PlayerId>,
    pub steal_candidates: Vec<PlayerId>,
    /// Player who rolled the 7 or played the knight
    pub original_roller: PlayerId,
}

/// A development card effect waiting for input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevCardActionState {
    RoadBuilding { roads_remaining: u8 },
    MonopolySelect,
    YearOfPlentySelect,
}

/// Why an action was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Build mode does not accept this click")]
    WrongBuildMode,

    #[error("Invalid placement location")]
    InvalidLocation,

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("No development cards left in deck")]
    EmptyDeck,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("A development card was already played this turn")]
    DevCardAlreadyPlayed,

    #[error("Invalid discard")]
    InvalidDiscard,

    #[error("Invalid roll {0}")]
    InvalidRoll(u8),

    #[error("Invalid trade")]
    InvalidTrade,

    #[error("No active trade")]
    NoActiveTrade,

    #[error("Waiting for a trade response")]
    TradePending,

    #[error("Invalid selection")]
    InvalidSelection,

    #[error("Invalid target")]
    InvalidTarget,

    #[error("Game is over")]
    GameOver,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Fatal problems while creating a game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("board has no desert tile for the robber")]
    NoDesert,

    #[error("unsupported player count {0}")]
    InvalidPlayerCount(u8),

    #[error("winning_points must be at least 1")]
    InvalidWinningPoints,

    #[error("invalid tile map: {0}")]
    InvalidTileMap(String),
}

/// Result of an accepted action
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Static board, shared between successive states
    pub board: Arc<BoardGeometry>,
    /// Ownership per vertex, indexed by vertex id
    pub vertex_states: Vec<VertexState>,
    /// Ownership per edge, indexed by edge id
    pub edge_states: Vec<EdgeState>,
    /// All players, indexed by player id
    pub players: Vec<PlayerState>,
    pub bank: ResourceHand,
    pub turn_order: Vec<PlayerId>,
    /// Index into `turn_order` of the turn owner
    pub current_player_index: usize,
    /// Player expected to act (the active discarder while discards are collected)
    pub current_player: PlayerId,
    pub phase: GamePhase,
    pub setup_round: SetupRound,
    pub setup_step: SetupStep,
    pub last_roll: Option<u8>,
    pub dice_rolled: bool,
    pub build_mode: BuildMode,
    pub robber_tile: TileId,
    pub robber: Option<RobberState>,
    /// Remaining development cards; the top of the deck is the end
    pub dev_deck: Vec<DevelopmentCard>,
    pub dev_card_action: Option<DevCardActionState>,
    pub dev_card_played: bool,
    pub trade_offer: Option<TradeOffer>,
    pub winner: Option<PlayerId>,
    /// Turn number (0 during setup)
    pub turn_number: u32,
    pub winning_points: u32,
    rng: ChaCha8Rng,
}

impl GameState {
    /// Create a new game from a configuration.
    ///
    /// Fails if the configuration is out of range (see
    /// [`GameConfig::validate`]) or the generated board has no desert for
    /// the robber.
    pub fn new(config: &GameConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let board = generate(&config.tile_map, &mut rng)?;

        let deserts: Vec<TileId> = board
            .land_tiles()
            .filter(|t| t.kind.is_desert())
            .map(|t| t.id)
            .collect();
        let robber_tile = *deserts.choose(&mut rng).ok_or(SetupError::NoDesert)?;

        let mut dev_deck = DevelopmentCard::standard_deck();
        dev_deck.shuffle(&mut rng);

        let players: Vec<PlayerState> = (0..config.players).map(PlayerState::new).collect();

        Ok(Self {
            vertex_states: vec![VertexState::default(); board.vertices.len()],
            edge_states: vec![EdgeState::default(); board.edges.len()],
            board: Arc::new(board),
            turn_order: players.iter().map(|p| p.id).collect(),
            players,
            bank: ResourceHand::uniform(config.bank_per_resource),
            current_player_index: 0,
            current_player: 0,
            phase: GamePhase::Setup,
            setup_round: SetupRound::Forward,
            setup_step: SetupStep::Settlement,
            last_roll: None,
            dice_rolled: false,
            build_mode: BuildMode::None,
            robber_tile,
            robber: None,
            dev_deck,
            dev_card_action: None,
            dev_card_played: false,
            trade_offer: None,
            winner: None,
            turn_number: 0,
            winning_points: config.winning_points,
            rng,
        })
    }

    /// Standard board and rules with a given player count and seed
    pub fn standard(players: u8, seed: u64) -> Result<Self, SetupError> {
        Self::new(&GameConfig::new(players, seed))
    }

    // ==================== Queries ====================

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id as usize)
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState, ActionError> {
        self.players
            .get_mut(id as usize)
            .ok_or(ActionError::UnknownPlayer(id))
    }

    /// The player whose turn it is
    pub fn turn_owner(&self) -> PlayerId {
        self.turn_order
            .get(self.current_player_index)
            .copied()
            .unwrap_or(self.current_player)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Who must act next: the turn owner, the active discarder, or the
    /// target of a pending trade offer. `None` once the game is over.
    pub fn expected_actor(&self) -> Option<PlayerId> {
        if self.is_finished() {
            return None;
        }
        Some(
            self.trade_offer
                .as_ref()
                .map(|offer| offer.to)
                .unwrap_or(self.current_player),
        )
    }

    /// Read-only view used by the placement rules
    pub fn occupancy(&self) -> Occupancy<'_> {
        Occupancy {
            board: &self.board,
            vertices: &self.vertex_states,
            edges: &self.edge_states,
        }
    }

    /// Bank quantity plus every player's quantity of one resource
    pub fn resource_total(&self, resource: Resource) -> u32 {
        let holders = std::iter::once(Holder::Bank)
            .chain(self.players.iter().map(|p| Holder::Player(p.id)));
        ledger::total_of(self, holders, resource)
    }

    /// Serialize a read-only snapshot
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // ==================== Transitions ====================

    /// Apply an action, producing the next state and the events it caused.
    ///
    /// On `Err` nothing has changed: `self` is never modified.
    pub fn apply_action(
        &self,
        player: PlayerId,
        action: &GameAction,
    ) -> Result<Transition, ActionError> {
        if self.is_finished() {
            return Err(ActionError::GameOver);
        }
        if self.player(player).is_none() {
            return Err(ActionError::UnknownPlayer(player));
        }
        if self.expected_actor() != Some(player) {
            return Err(ActionError::NotYourTurn);
        }

        let mut next = self.clone();
        let mut events = Vec::new();
        match self.phase {
            GamePhase::Setup => next.handle_setup(player, action, &mut events)?,
            GamePhase::DiceRoll => next.handle_dice_roll(player, action, &mut events)?,
            GamePhase::Robber => next.handle_robber(player, action, &mut events)?,
            GamePhase::BuildingTrading => {
                next.handle_building_trading(player, action, &mut events)?
            }
            GamePhase::DevCardAction => next.handle_dev_card_action(player, action, &mut events)?,
            GamePhase::GameOver => return Err(ActionError::GameOver),
        }

        if next.phase != self.phase {
            trace!(from = ?self.phase, to = ?next.phase, action = action.name(), "phase change");
        }
        Ok(Transition {
            state: next,
            events,
        })
    }

    /// Pure reducer: the next state if the action is legal, otherwise an
    /// identical copy of this one.
    pub fn dispatch(&self, player: PlayerId, action: &GameAction) -> GameState {
        match self.apply_action(player, action) {
            Ok(transition) => transition.state,
            Err(err) => {
                debug!(player, action = action.name(), error = %err, "action rejected");
                self.clone()
            }
        }
    }

    // ==================== Shared helpers ====================

    /// Pay a cost to the bank, reporting a short hand as `CannotAfford`
    fn pay_to_bank(&mut self, player: PlayerId, cost: &ResourceHand) -> Result<(), ActionError> {
        ledger::transfer(self, Holder::Player(player), Holder::Bank, cost).map_err(|err| match err {
            LedgerError::Insufficient { .. } => ActionError::CannotAfford,
            other => ActionError::Ledger(other),
        })
    }

    /// Move one card from the bank to a player if the bank has it
    fn pay_from_bank(&mut self, player: PlayerId, resource: Resource) -> bool {
        ledger::transfer(
            self,
            Holder::Bank,
            Holder::Player(player),
            &ResourceHand::single(resource, 1),
        )
        .is_ok()
    }
}

impl ResourceAccounts for GameState {
    fn hand(&self, holder: Holder) -> Option<&ResourceHand> {
        match holder {
            Holder::Bank => Some(&self.bank),
            Holder::Player(id) => self.players.get(id as usize).map(|p| &p.resources),
        }
    }

    fn hand_mut(&mut self, holder: Holder) -> Option<&mut ResourceHand> {
        match holder {
            Holder::Bank => Some(&mut self.bank),
            Holder::Player(id) => self.players.get_mut(id as usize).map(|p| &mut p.resources),
        }
    }
}

//! Settlers - a rules engine for a hex-board trading and building game
//!
//! This crate provides the core game logic, including:
//! - A triangular lattice that holds both tiles and tile corners
//! - Seeded board generation with resources, number tokens and ports
//! - Player state and a resource ledger with atomic transfers
//! - Placement rules and a phase state machine with full rule enforcement
//!
//! # Architecture
//!
//! The engine performs no I/O. Every transition takes a state by reference
//! and returns a new one, so a rejected action can never leave a half-applied
//! state behind. It can be compiled to:
//! - Native Rust for simulations and servers
//! - WebAssembly (feature `wasm`) for a browser renderer
//!
//! # Modules
//!
//! - [`hex`]: Lattice coordinates for tiles and vertices
//! - [`board`]: Static board geometry and per-site ownership
//! - [`generator`]: Tile maps and board generation
//! - [`player`]: Player state, hands and costs
//! - [`ledger`]: Resource transfers between the bank and players
//! - [`rules`]: Placement legality
//! - [`game`]: Game state machine
//! - [`victory`]: Scoring and the win check
//! - [`bot`]: Bot players built on the legal action list

pub mod actions;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod generator;
pub mod hex;
pub mod ledger;
pub mod player;
pub mod rules;
pub mod victory;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{BuildMode, GameAction, GameEvent, TradeOffer};
pub use board::{BoardGeometry, EdgeId, PlayerId, Port, Resource, TileId, TileKind, VertexId};
pub use bot::{Bot, BotDifficulty};
pub use config::{ConfigError, GameConfig};
pub use game::{ActionError, GamePhase, GameState, SetupError, Transition};
pub use generator::TileMap;
pub use hex::LatticePoint;
pub use ledger::{Holder, LedgerError};
pub use player::{DevelopmentCard, PlayerState, ResourceHand};

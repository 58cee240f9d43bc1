//! Volcano Core - Game engine
//!
//! This crate provides the core game logic for Volcanoes:
//! - Board geometry (80-tile subdivided icosahedron with antipodes)
//! - Tile ownership, levels and rule variants
//! - Game state, the turn schedule, eruptions and win detection
//! - Generic path search over tile predicates
//! - Position fingerprints for evaluation caches

pub mod topology;
pub mod tile;
pub mod rules;
pub mod game;
pub mod search;
pub mod fingerprint;

// Re-exports for convenient access
pub use topology::{topology, Topology, TileIndex, TILE_COUNT, HALF_TILE_COUNT};
pub use tile::{Player, Tile};
pub use rules::{Rules, RulesError};
pub use game::{
    move_kind_for_turn, player_for_turn, Board, GameError, GameResult, Move, MoveFilter, MoveKind,
    WinCondition, MAX_ERUPTION_PHASES,
};
pub use search::{PathFinder, PathResult, StandardPolicy, TraversalPolicy, Traversable};
pub use fingerprint::{PositionCache, ZobristKeys};

//! Kitty-corner engine
//!
//! Level 3 - Step-level implementation
//!
//! Builds towards an antipodal chain by claiming face-centre tiles that touch
//! its own territory at a single vertex. Once a kitty-corner chain links a
//! tile to its antipode, it fills in the edge-adjacent tiles along that chain
//! so the chain becomes a real (edge-connected) path.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volcano_core::{topology, Board, Move, PathFinder, Player, TileIndex, TraversalPolicy};

use crate::engine::{Engine, SearchBudget, SearchResult};

/// Steps between tiles sharing exactly one vertex
#[derive(Clone, Copy, Debug, Default)]
pub struct KittyCornerPolicy {
    /// Only the acting player's tiles; otherwise empty tiles are allowed too
    pub player_only: bool,
}

impl TraversalPolicy for KittyCornerPolicy {
    fn neighbors(&self, tile: TileIndex) -> &[TileIndex] {
        topology().kitty_corners(tile)
    }

    fn is_traversable(&self, board: &Board, player: Option<Player>, tile: TileIndex) -> bool {
        let Some(player) = player else { return false };
        let value = board.tile(tile);
        value.is_owned_by(player) || (!self.player_only && value.is_empty())
    }
}

/// Pattern engine following kitty-corner chains between antipodes
pub struct KittyCornerEngine {
    owned_only: PathFinder<KittyCornerPolicy>,
    open: PathFinder<KittyCornerPolicy>,
    /// Centre tile the current plan started from
    best_path_start: Option<TileIndex>,
    rng: ChaCha8Rng,
}

impl KittyCornerEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            owned_only: PathFinder::new(KittyCornerPolicy { player_only: true }),
            open: PathFinder::new(KittyCornerPolicy { player_only: false }),
            best_path_start: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// First kitty-corner chain of the player's tiles joining a tile to its antipode
    fn owned_antipode_chain(&self, board: &Board, evaluations: &mut u64) -> Option<Vec<TileIndex>> {
        board.owned_tiles(board.player()).find_map(|i| {
            *evaluations += 1;
            let result = self.owned_only.find_path(board, i, topology().antipode(i));
            result.found.then_some(result.path)
        })
    }

    /// Edge-adjacent support for an existing chain, empty tiles first
    fn support_move(&mut self, board: &Board, moves: &[Move], chain: &[TileIndex]) -> Option<Move> {
        let touches_chain = |mv: &&Move| match **mv {
            Move::Tile(t) => chain.iter().any(|&c| topology().adjacent(c).contains(&t)),
            Move::AllGrow => false,
        };

        let supporting: Vec<Move> = moves.iter().filter(touches_chain).copied().collect();
        let empty: Vec<Move> = supporting
            .iter()
            .copied()
            .filter(|mv| matches!(mv, Move::Tile(t) if board.tile(*t).is_empty()))
            .collect();

        let pool = if empty.is_empty() { supporting } else { empty };
        pool.choose(&mut self.rng).copied()
    }

    /// Next empty tile along the open chain from the planned start
    fn planned_move(&self, board: &Board, moves: &[Move], evaluations: &mut u64) -> Option<Move> {
        let start = self.best_path_start?;
        let player = board.player();
        if !board.tile(start).is_owned_by(player) {
            return None;
        }

        *evaluations += 1;
        let plan = self.open.find_path(board, start, topology().antipode(start));
        for tile in plan.path {
            let value = board.tile(tile);
            if !value.is_owned_by(player) && !value.is_empty() {
                break;
            }
            if value.is_empty() && moves.contains(&Move::Tile(tile)) {
                return Some(Move::Tile(tile));
            }
        }
        None
    }

    /// Face-centre move, preferring tiles that touch the player's territory at one vertex
    fn centre_move(&mut self, board: &Board, moves: &[Move]) -> Option<Move> {
        let player = board.player();
        let centres: Vec<TileIndex> = moves
            .iter()
            .filter_map(|mv| match *mv {
                Move::Tile(t) if topology().is_face_center(t) => Some(t),
                _ => None,
            })
            .collect();

        let mut single_contact = Vec::new();
        let mut any_contact = Vec::new();
        for &t in &centres {
            if !board.tile(t).is_empty() {
                continue;
            }
            let contacts = topology()
                .kitty_corners(t)
                .iter()
                .filter(|&&k| board.tile(k).is_owned_by(player))
                .count();
            if contacts > 0 {
                any_contact.push(t);
            }
            if contacts == 1 {
                single_contact.push(t);
            }
        }

        let pick = [single_contact, any_contact, centres]
            .into_iter()
            .find(|pool| !pool.is_empty())
            .and_then(|pool| pool.choose(&mut self.rng).copied())?;

        self.best_path_start = Some(pick);
        Some(Move::Tile(pick))
    }
}

impl Default for KittyCornerEngine {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Engine for KittyCornerEngine {
    fn name(&self) -> &'static str {
        "kitty-corner"
    }

    fn best_move(&mut self, board: &Board, _budget: &SearchBudget) -> SearchResult {
        let started = Instant::now();
        let moves = board.all_legal_moves();
        let mut evaluations = 0;

        let best_move = if moves.iter().any(|mv| matches!(mv, Move::AllGrow)) {
            Some(Move::AllGrow)
        } else if let Some(chain) = self.owned_antipode_chain(board, &mut evaluations) {
            self.support_move(board, &moves, &chain)
        } else {
            match self.planned_move(board, &moves, &mut evaluations) {
                Some(mv) => Some(mv),
                None => self.centre_move(board, &moves),
            }
        };

        let best_move = best_move.or_else(|| moves.choose(&mut self.rng).copied());
        tracing::debug!(engine = self.name(), ?best_move, "pattern move chosen");

        SearchResult {
            best_move,
            evaluations,
            elapsed: started.elapsed(),
            ..Default::default()
        }
    }
}

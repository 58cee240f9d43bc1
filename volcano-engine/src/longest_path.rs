//! Longest-path engine
//!
//! Level 3 - Step-level implementation
//!
//! Tries every legal move on a copy of the board and scores the result by
//! the longest path that starts on the tile just played and runs through the
//! mover's own territory. Moves are shuffled first so equal scores are broken
//! at random.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volcano_core::{Board, Move, PathFinder, Player, PositionCache, TileIndex, TraversalPolicy};

use crate::engine::{Engine, SearchBudget, SearchResult};

/// Entries kept before the cache is flushed
const CACHE_CAPACITY: usize = 1 << 16;

/// Score given to a move that wins outright
pub const WIN_SCORE: i32 = i32::MAX;

/// Any tile the acting player owns, magma chambers included
#[derive(Clone, Copy, Debug, Default)]
pub struct TerritoryPolicy;

impl TraversalPolicy for TerritoryPolicy {
    fn is_traversable(&self, board: &Board, player: Option<Player>, tile: TileIndex) -> bool {
        matches!(player, Some(p) if board.tile(tile).is_owned_by(p))
    }
}

/// Greedy engine maximising the territory path through the last move
pub struct LongestPathEngine {
    finder: PathFinder<TerritoryPolicy>,
    /// Scores keyed by position, tagged with the tile they were measured from
    cache: PositionCache<(TileIndex, i32)>,
    rng: ChaCha8Rng,
}

impl LongestPathEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            finder: PathFinder::new(TerritoryPolicy),
            cache: PositionCache::with_capacity(1024),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Longest territory path (in tiles) from `from` after a move by `player`
    pub fn evaluate(&self, board: &Board, player: Player, from: TileIndex) -> i32 {
        if board.result().winner() == Some(player) {
            return WIN_SCORE;
        }

        board
            .owned_tiles(player)
            .map(|target| self.finder.find_path(board, from, target).path.len() as i32)
            .max()
            .unwrap_or(0)
    }

    fn cached_evaluate(&mut self, board: &Board, player: Player, from: TileIndex) -> (i32, bool) {
        if let Some((tile, score)) = self.cache.get(board) {
            if tile == from {
                return (score, true);
            }
        }

        let score = self.evaluate(board, player, from);
        if self.cache.len() >= CACHE_CAPACITY {
            self.cache.clear();
        }
        self.cache.set(board, (from, score));
        (score, false)
    }
}

impl Default for LongestPathEngine {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Engine for LongestPathEngine {
    fn name(&self) -> &'static str {
        "longest-path"
    }

    fn best_move(&mut self, board: &Board, budget: &SearchBudget) -> SearchResult {
        let started = Instant::now();
        let player = board.player();

        let mut moves = board.all_legal_moves();
        moves.shuffle(&mut self.rng);

        let mut result = SearchResult {
            score: i32::MIN,
            ..Default::default()
        };

        for mv in moves {
            // Always finish at least one candidate so a move is returned
            if result.best_move.is_some() && budget.exhausted(started) {
                result.interrupted = true;
                break;
            }

            let Move::Tile(from) = mv else { continue };
            let child = match board.child(mv) {
                Ok(child) => child,
                Err(err) => {
                    tracing::debug!(%mv, %err, "skipping candidate");
                    continue;
                }
            };

            let (score, hit) = self.cached_evaluate(&child, player, from);
            result.evaluations += 1;
            result.cache_hits += hit as u64;

            if result.best_move.is_none() || score > result.score {
                result.best_move = Some(mv);
                result.score = score;
            }
        }

        result.elapsed = started.elapsed();
        tracing::debug!(
            engine = self.name(),
            evaluations = result.evaluations,
            score = result.score,
            interrupted = result.interrupted,
            "search finished"
        );
        result
    }
}

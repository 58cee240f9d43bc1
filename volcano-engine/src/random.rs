//! Random engine
//!
//! Level 3 - Step-level implementation

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volcano_core::Board;

use crate::engine::{Engine, SearchBudget, SearchResult};

/// Plays a random expansion move, or any legal move once the board is full
pub struct RandomEngine {
    rng: ChaCha8Rng,
}

impl RandomEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &'static str {
        "random"
    }

    fn best_move(&mut self, board: &Board, _budget: &SearchBudget) -> SearchResult {
        let started = Instant::now();
        let moves = board.expansion_moves();

        SearchResult {
            best_move: moves.choose(&mut self.rng).copied(),
            elapsed: started.elapsed(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volcano_core::{Move, Player, Rules, Tile, TILE_COUNT};

    #[test]
    fn test_prefers_empty_tiles() {
        let mut tiles = [Tile::claimed(Player::One, 2); TILE_COUNT];
        tiles[17] = Tile::Empty;
        let board = Board::with_position(Rules::default(), tiles, 1).unwrap();

        let mut engine = RandomEngine::new(4);
        for _ in 0..5 {
            let result = engine.best_move(&board, &SearchBudget::unlimited());
            assert_eq!(result.best_move, Some(Move::Tile(17)));
        }
    }

    #[test]
    fn test_full_board_falls_back_to_growth() {
        let tiles = [Tile::claimed(Player::One, 2); TILE_COUNT];
        let board = Board::with_position(Rules::default(), tiles, 1).unwrap();

        let mv = RandomEngine::new(8).best_move(&board, &SearchBudget::unlimited()).best_move;
        assert!(board.is_legal_move(mv.unwrap()));
    }

    #[test]
    fn test_seeded_engines_agree() {
        let board = Board::new(Rules::default()).unwrap();
        let a = RandomEngine::new(99).best_move(&board, &SearchBudget::unlimited()).best_move;
        let b = RandomEngine::new(99).best_move(&board, &SearchBudget::unlimited()).best_move;
        assert_eq!(a, b);
    }
}

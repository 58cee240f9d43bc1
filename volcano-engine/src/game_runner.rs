//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use serde::Serialize;
use volcano_core::{Board, GameError, GameResult, Move, Player, Rules, TileIndex, WinCondition};

use crate::config::EngineConfig;
use crate::engine::Engine;

/// Outcome of a single game
#[derive(Clone, Debug, Serialize)]
pub struct GameOutcome {
    /// Final game result; `Ongoing` when the turn limit or a stalemate stopped play
    pub result: GameResult,
    pub win_condition: WinCondition,
    pub winning_path: Vec<TileIndex>,
    /// Turn counter when play stopped
    pub turns: u32,
    /// Engine moves in order (AllGrow plies are implicit)
    pub moves: Vec<Move>,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Player> {
        self.result.winner()
    }

    /// No winner: runaway eruption, turn limit or no legal move
    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    fn from_board(board: &Board, moves: Vec<Move>) -> Self {
        Self {
            result: board.result(),
            win_condition: board.win_condition(),
            winning_path: board.winning_path().to_vec(),
            turns: board.turn(),
            moves,
        }
    }
}

/// Game runner that plays one engine configuration against another
pub struct GameRunner {
    rules: Rules,
    one: EngineConfig,
    two: EngineConfig,
    max_turns: u32,
    /// Random seed counter
    seed_counter: u64,
}

impl GameRunner {
    pub fn new(rules: Rules, one: EngineConfig, two: EngineConfig, max_turns: u32) -> Self {
        let seed_counter = one.seed.unwrap_or(42);
        Self {
            rules,
            one,
            two,
            max_turns,
            seed_counter,
        }
    }

    /// Play a single game with freshly built engines
    pub fn play_game(&mut self) -> Result<GameOutcome, GameError> {
        let seed = self.next_seed();
        let mut one = self.one.kind.build(self.one.seed.unwrap_or(seed));
        let mut two = self.two.kind.build(self.two.seed.unwrap_or(seed).wrapping_add(1));

        let board = Board::new(self.rules.clone())?;
        play_engines(board, [one.as_mut(), two.as_mut()], [&self.one, &self.two], self.max_turns)
    }

    /// Get next seed and increment counter
    fn next_seed(&mut self) -> u64 {
        let seed = self.seed_counter;
        self.seed_counter = self.seed_counter.wrapping_add(1);
        seed
    }

    pub fn reset_seed(&mut self, seed: u64) {
        self.seed_counter = seed;
    }
}

/// Play from `board` until the game ends, the turn limit passes, or the side
/// to move has nothing to play
///
/// `engines[0]` moves for Player One and `engines[1]` for Player Two.
pub fn play_engines(
    mut board: Board,
    engines: [&mut dyn Engine; 2],
    configs: [&EngineConfig; 2],
    max_turns: u32,
) -> Result<GameOutcome, GameError> {
    let [one, two] = engines;
    let mut moves = Vec::new();

    while !board.is_over() && board.turn() <= max_turns {
        let (engine, config) = match board.player() {
            Player::One => (&mut *one, configs[0]),
            Player::Two => (&mut *two, configs[1]),
        };

        let search = engine.best_move(&board, &config.budget());
        let Some(mv) = search.best_move else {
            tracing::info!(turn = board.turn(), player = ?board.player(), "no legal move, stopping");
            break;
        };

        board.apply_move(mv)?;
        moves.push(mv);
    }

    let outcome = GameOutcome::from_board(&board, moves);
    tracing::debug!(result = ?outcome.result, turns = outcome.turns, "game finished");
    Ok(outcome)
}

//! Match play - multiple games between two engines
//!
//! Level 2 - Phase-level implementation

use rayon::prelude::*;
use serde::Serialize;
use volcano_core::{GameError, Player};

use crate::config::{EngineConfig, MatchConfig};
use crate::game_runner::{GameOutcome, GameRunner};

/// Result of a match (multiple games)
#[derive(Clone, Debug, Default, Serialize)]
pub struct MatchResult {
    /// Wins for the engine listed first
    pub first_wins: u32,
    /// Wins for the engine listed second
    pub second_wins: u32,
    /// Games that ended without a winner
    pub draws: u32,
    /// Average game length in turns
    pub avg_turns: f32,
    pub games_played: u32,
    /// Individual game outcomes, in game order
    pub game_outcomes: Vec<GameOutcome>,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    fn rate(&self, count: u32) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            count as f32 / self.games_played as f32
        }
    }

    pub fn first_win_rate(&self) -> f32 {
        self.rate(self.first_wins)
    }

    pub fn second_win_rate(&self) -> f32 {
        self.rate(self.second_wins)
    }

    pub fn draw_rate(&self) -> f32 {
        self.rate(self.draws)
    }

    /// Wins = 1.0, Draws = 0.5, Losses = 0.0
    pub fn score_for_first(&self) -> f32 {
        self.first_wins as f32 + 0.5 * self.draws as f32
    }

    pub fn score_for_second(&self) -> f32 {
        self.second_wins as f32 + 0.5 * self.draws as f32
    }
}

/// Play a match between two engines (Level 2 phase)
///
/// Seats alternate every game. `on_game` is called once per finished game,
/// from worker threads when the match runs in parallel.
pub fn play_match<F>(config: &MatchConfig, on_game: F) -> Result<MatchResult, GameError>
where
    F: Fn(&GameOutcome) + Sync,
{
    if config.games == 0 {
        return Ok(MatchResult::empty());
    }
    config.rules.validate()?;

    let seats = prepare_seats(config.games);
    let play = |seat: &Seat| -> Result<SeatedOutcome, GameError> {
        let outcome = play_seated_game(config, seat)?;
        on_game(&outcome.outcome);
        Ok(outcome)
    };

    let outcomes = if config.parallel {
        seats.par_iter().map(play).collect::<Result<Vec<_>, GameError>>()?
    } else {
        seats.iter().map(play).collect::<Result<Vec<_>, GameError>>()?
    };

    let result = aggregate_results(outcomes);
    tracing::info!(
        first = %config.first.kind,
        second = %config.second.kind,
        first_wins = result.first_wins,
        second_wins = result.second_wins,
        draws = result.draws,
        "match finished"
    );
    Ok(result)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Seating for a single game in a match
#[derive(Clone, Copy, Debug)]
struct Seat {
    /// The first engine plays Player One this game
    first_is_one: bool,
    /// Game index (for seeding)
    game_index: usize,
}

fn prepare_seats(games: usize) -> Vec<Seat> {
    (0..games)
        .map(|i| Seat {
            first_is_one: i % 2 == 0,
            game_index: i,
        })
        .collect()
}

/// Outcome with context about which engine played which side
struct SeatedOutcome {
    outcome: GameOutcome,
    first_is_one: bool,
}

fn play_seated_game(config: &MatchConfig, seat: &Seat) -> Result<SeatedOutcome, GameError> {
    let (one_config, two_config): (&EngineConfig, &EngineConfig) = if seat.first_is_one {
        (&config.first, &config.second)
    } else {
        (&config.second, &config.first)
    };

    let mut runner = GameRunner::new(config.rules.clone(), one_config.clone(), two_config.clone(), config.max_turns);
    runner.reset_seed(config.seed.wrapping_add(seat.game_index as u64));
    let outcome = runner.play_game()?;

    tracing::info!(
        game = seat.game_index + 1,
        one = %one_config.kind,
        two = %two_config.kind,
        result = ?outcome.result,
        turns = outcome.turns,
        "game finished"
    );

    Ok(SeatedOutcome {
        outcome,
        first_is_one: seat.first_is_one,
    })
}

/// Aggregate game outcomes into a match result
fn aggregate_results(outcomes: Vec<SeatedOutcome>) -> MatchResult {
    let mut result = MatchResult::empty();
    let mut total_turns = 0u64;

    for seated in outcomes {
        total_turns += seated.outcome.turns as u64;

        let first_side = if seated.first_is_one { Player::One } else { Player::Two };
        match seated.outcome.result.winner() {
            Some(winner) if winner == first_side => result.first_wins += 1,
            Some(_) => result.second_wins += 1,
            None => result.draws += 1,
        }
        result.game_outcomes.push(seated.outcome);
    }

    result.games_played = result.game_outcomes.len() as u32;
    if result.games_played > 0 {
        result.avg_turns = total_turns as f32 / result.games_played as f32;
    }
    result
}

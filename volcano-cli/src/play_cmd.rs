//! Play command - one game, engine searches run in the background
//!
//! Each engine turn runs on a blocking worker task. The main task waits up to
//! the per-move limit, then raises the cancellation flag and waits for the
//! candidate that is still being evaluated.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::task::JoinHandle;

use volcano_core::{topology, Board, Move, Player, Rules, Tile, TILE_COUNT};
use volcano_engine::{CancellationToken, Engine, EngineKind, SearchBudget, SearchResult};

#[derive(Args)]
pub struct PlayArgs {
    /// Engine playing Player One
    #[arg(long, default_value = "longest-path")]
    pub one: EngineKind,

    /// Engine playing Player Two
    #[arg(long, default_value = "kitty-corner")]
    pub two: EngineKind,

    /// Per-move time limit in milliseconds
    #[arg(long, value_name = "MS", default_value = "1000")]
    pub time_limit: u64,

    /// Maximum turns before stopping
    #[arg(long, default_value = "400")]
    pub max_turns: u32,

    /// Rules JSON file (defaults when omitted)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Print the board after every move
    #[arg(long)]
    pub show_board: bool,
}

/// A move as it was played
#[derive(Clone, Debug)]
pub struct PlayedMove {
    pub turn: u32,
    pub player: Player,
    pub mv: Move,
    pub search: SearchResult,
}

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let rules = crate::load_rules(args.rules.as_deref())?;
    let seed = seed.unwrap_or(42);
    let engines = [args.one.build(seed), args.two.build(seed.wrapping_add(1))];
    let limit = Duration::from_millis(args.time_limit);

    // Create tokio runtime for the background searches
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let show_board = args.show_board;
    let board = runtime.block_on(play_game(rules, engines, limit, args.max_turns, |board, played| {
        print_move(played);
        if show_board {
            println!("{}", render_board(board));
        }
    }))?;

    print_summary(&board);
    Ok(())
}

/// Play one game, reporting each move through `on_move`
pub async fn play_game<F>(
    rules: Rules,
    engines: [Box<dyn Engine>; 2],
    limit: Duration,
    max_turns: u32,
    mut on_move: F,
) -> Result<Board>
where
    F: FnMut(&Board, &PlayedMove),
{
    let mut board = Board::new(rules).context("Invalid rules")?;
    let mut seats = engines.map(Some);

    while !board.is_over() && board.turn() <= max_turns {
        let player = board.player();
        let seat = match player {
            Player::One => 0,
            Player::Two => 1,
        };
        let engine = seats[seat].take().context("Engine still busy")?;

        let (engine, search) = search_in_background(engine, &board, limit).await?;
        seats[seat] = Some(engine);

        let Some(mv) = search.best_move else {
            tracing::info!(turn = board.turn(), ?player, "no legal move, stopping");
            break;
        };

        let played = PlayedMove {
            turn: board.turn(),
            player,
            mv,
            search,
        };
        board
            .apply_move(mv)
            .with_context(|| format!("Engine played an illegal move: {}", mv))?;
        on_move(&board, &played);
    }

    Ok(board)
}

/// Run one search on a blocking worker, cancelling it when the limit passes
async fn search_in_background(
    mut engine: Box<dyn Engine>,
    board: &Board,
    limit: Duration,
) -> Result<(Box<dyn Engine>, SearchResult)> {
    let token = CancellationToken::new();
    let budget = SearchBudget::with_duration(limit).with_cancel(token.clone());
    let snapshot = board.clone();

    let mut handle: JoinHandle<(Box<dyn Engine>, SearchResult)> = tokio::task::spawn_blocking(move || {
        let result = engine.best_move(&snapshot, &budget);
        (engine, result)
    });

    match tokio::time::timeout(limit, &mut handle).await {
        Ok(joined) => joined.context("Search task failed"),
        Err(_) => {
            token.cancel();
            tracing::debug!(?limit, "search over budget, cancelled");
            handle.await.context("Search task failed")
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_move(played: &PlayedMove) {
    println!("{}", format_move(played));
}

fn format_move(played: &PlayedMove) -> String {
    let search = &played.search;
    format!(
        "turn {:>3}  {:?}  {:<4} score {:>4}  {} evals ({}/s, {:.0}% cached)  {} ms{}",
        played.turn,
        played.player,
        played.mv,
        search.score,
        search.evaluations,
        search.evaluations_per_second(),
        search.cache_hit_percentage(),
        search.elapsed.as_millis(),
        if search.interrupted { "  (interrupted)" } else { "" }
    )
}

fn print_summary(board: &Board) {
    println!("\n{}", render_board(board));
    match board.result().winner() {
        Some(winner) => {
            let path: Vec<&str> = board.winning_path().iter().map(|&t| topology().name(t)).collect();
            println!(
                "{:?} wins on turn {} ({:?}): {}",
                winner,
                board.turn(),
                board.win_condition(),
                path.join(" ")
            );
        }
        None => println!("No winner after {} turns ({:?})", board.turn(), board.result()),
    }
}

/// One line per face: `A B C D` tiles as `+n` (One), `-n` (Two) or `.`
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for face in 0..TILE_COUNT / 4 {
        let cells: Vec<String> = (0..4)
            .map(|s| {
                let index = face * 4 + s;
                let mark = if board.is_dormant(index) { "*" } else { "" };
                match board.tile(index) {
                    Tile::Empty => format!("{:>4}", "."),
                    Tile::Claimed { owner: Player::One, level } => format!("{:>4}", format!("+{}{}", level, mark)),
                    Tile::Claimed { owner: Player::Two, level } => format!("{:>4}", format!("-{}{}", level, mark)),
                }
            })
            .collect();
        out.push_str(&format!("{:>3}: {}\n", face + 1, cells.join("")));
    }
    out
}

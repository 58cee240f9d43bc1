//! Integration tests for Volcanoes
//!
//! Tests the full stack: core rules, path search, fingerprint cache, engines
//! and match play

use std::thread;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volcano_core::{
    topology, Board, GameResult, Move, PathFinder, Player, PositionCache, Rules,
    StandardPolicy, Tile, TILE_COUNT,
};
use volcano_engine::{
    play_match, CancellationToken, Engine, EngineConfig, EngineKind, GameRunner, KittyCornerEngine,
    LongestPathEngine, MatchConfig, RandomEngine, SearchBudget,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn dormant_rules() -> Rules {
    Rules {
        allow_dormant_volcanoes: true,
        erupt_overflow_enemy: 2,
        ..Rules::default()
    }
}

fn all_engines(seed: u64) -> Vec<Box<dyn Engine>> {
    vec![
        Box::new(LongestPathEngine::new(seed)),
        Box::new(KittyCornerEngine::new(seed)),
        Box::new(RandomEngine::new(seed)),
    ]
}

/// Play `plies` random legal moves
fn random_position(rules: Rules, plies: usize, seed: u64) -> Board {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut board = Board::new(rules).unwrap();
    for _ in 0..plies {
        if board.is_over() {
            break;
        }
        let moves = board.all_legal_moves();
        let Some(&mv) = moves.choose(&mut rng) else { break };
        board.apply_move(mv).unwrap();
    }
    board
}

// ============================================================================
// CORE
// ============================================================================

#[test]
fn test_topology_is_consistent() {
    let topo = topology();
    for tile in 0..TILE_COUNT {
        assert_eq!(topo.adjacent(tile).len(), 3);
        assert_eq!(topo.antipode(topo.antipode(tile)), tile);
        assert_eq!(topo.tile_by_name(topo.name(tile)), Some(tile));
        for &k in topo.kitty_corners(tile) {
            assert!(!topo.adjacent(tile).contains(&k));
        }
    }
}

#[test]
fn test_fingerprint_tracks_play() {
    for seed in 0..5 {
        let board = random_position(dormant_rules(), 120, seed);
        assert_eq!(board.fingerprint(), board.recompute_fingerprint());

        let rebuilt = Board::with_position(dormant_rules(), *board.tiles(), board.turn()).unwrap();
        assert_eq!(rebuilt.fingerprint(), board.fingerprint());
    }
}

#[test]
fn test_cache_distinguishes_positions() {
    let mut cache = PositionCache::new();
    let board = random_position(Rules::default(), 40, 9);
    assert_eq!(cache.get(&board), None);

    cache.set(&board, 12);
    let mut tiles = *board.tiles();
    let copy = Board::with_position(Rules::default(), tiles, board.turn()).unwrap();
    assert_eq!(cache.get(&copy), Some(12));

    let changed = (0..TILE_COUNT).find(|&i| tiles[i].level() < 9).unwrap();
    tiles[changed] = tiles[changed].stepped_toward(tiles[changed].owner().unwrap_or(Player::One));
    let other = Board::with_position(Rules::default(), tiles, board.turn()).unwrap();
    assert_eq!(cache.get(&other), None);
}

#[test]
fn test_expansion_filter_prefers_empty_tiles() {
    let board = random_position(Rules::default(), 10, 3);
    if board.move_kind() == volcano_core::MoveKind::SingleGrow {
        for mv in board.expansion_moves() {
            let Move::Tile(t) = mv else { panic!("AllGrow on a single-grow turn") };
            assert!(board.tile(t).is_empty());
        }
    }
}

#[test]
fn test_win_path_uses_only_winner_volcanoes() {
    let finder = PathFinder::new(StandardPolicy);
    for seed in 0..20 {
        let board = random_position(Rules::default(), 2000, seed);
        if let Some(winner) = board.result().winner() {
            let path = board.winning_path();
            assert!(finder.has_path(&board, path[0], *path.last().unwrap()));
            for &t in path {
                assert!(board.tile(t).is_owned_by(winner));
                assert!(board.rules().is_volcano(board.tile(t)));
            }
        }
    }
}

// ============================================================================
// ENGINES
// ============================================================================

#[test]
fn test_engines_return_legal_moves() {
    for seed in 0..4 {
        let board = random_position(Rules::default(), 25 + seed as usize * 10, seed);
        if board.is_over() {
            continue;
        }
        for mut engine in all_engines(seed) {
            let result = engine.best_move(&board, &SearchBudget::unlimited());
            let mv = result.best_move.expect("engine returned no move");
            assert!(board.is_legal_move(mv), "{} played {}", engine.name(), mv);
        }
    }
}

#[test]
fn test_cancellation_from_another_thread() {
    let board = random_position(Rules::default(), 30, 1);
    let token = CancellationToken::new();
    let budget = SearchBudget::unlimited().with_cancel(token.clone());

    let canceller = thread::spawn(move || token.cancel());
    canceller.join().unwrap();

    let started = Instant::now();
    let result = LongestPathEngine::new(1).best_move(&board, &budget);
    assert!(result.best_move.is_some());
    assert!(result.interrupted);
    assert_eq!(result.evaluations, 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_seeded_game_is_reproducible() {
    let config = EngineConfig::new(EngineKind::KittyCorner).with_seed(17);
    let mut a = GameRunner::new(dormant_rules(), config.clone(), config.clone(), 200);
    let mut b = GameRunner::new(dormant_rules(), config.clone(), config, 200);

    let first = a.play_game().unwrap();
    let second = b.play_game().unwrap();
    assert_eq!(first.moves, second.moves);
    assert_eq!(first.result, second.result);
}

// ============================================================================
// MATCHES
// ============================================================================

#[test]
fn test_match_with_saved_rules() {
    let path = std::env::temp_dir().join(format!("volcano-integration-{}.json", std::process::id()));
    dormant_rules().save(&path).unwrap();
    let rules = Rules::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut config = MatchConfig::new(EngineKind::KittyCorner, EngineKind::Random, 6).with_rules(rules);
    config.max_turns = 300;

    let result = play_match(&config, |_| {}).unwrap();
    assert_eq!(result.games_played, 6);
    assert_eq!(result.first_wins + result.second_wins + result.draws, 6);

    for outcome in &result.game_outcomes {
        match outcome.result {
            GameResult::OneWins | GameResult::TwoWins => assert!(outcome.winning_path.len() >= 2),
            GameResult::Draw | GameResult::Ongoing => assert!(outcome.winning_path.is_empty()),
        }
    }
}

#[test]
fn test_board_clone_is_independent_across_threads() {
    let board = random_position(Rules::default(), 20, 4);
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let mut local = board.clone();
            thread::spawn(move || {
                let mut engine = RandomEngine::new(seed);
                for _ in 0..10 {
                    if local.is_over() {
                        break;
                    }
                    let Some(mv) = engine.best_move(&local, &SearchBudget::unlimited()).best_move else {
                        break;
                    };
                    local.apply_move(mv).unwrap();
                }
                local.turn()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap() >= board.turn());
    }
    assert_eq!(board.fingerprint(), board.recompute_fingerprint());
    assert!(board.tiles().iter().filter(|t| **t != Tile::Empty).count() <= TILE_COUNT);
}

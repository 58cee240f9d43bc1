//! Engine interface, search budget and cancellation
//!
//! Level 4 - Utilities and configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use volcano_core::{Board, Move};

/// Cooperative stop flag shared between a search and its caller
///
/// Engines poll it between candidate evaluations; a candidate that is
/// already being evaluated always finishes.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Wall-clock limit plus cancellation for one search
#[derive(Clone, Debug, Default)]
pub struct SearchBudget {
    /// No limit when `None`
    pub max_duration: Option<Duration>,
    pub cancel: CancellationToken,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_duration(max_duration: Duration) -> Self {
        Self {
            max_duration: Some(max_duration),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an existing token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Whether a search started at `started` should stop taking new candidates
    pub fn exhausted(&self, started: Instant) -> bool {
        self.cancel.is_cancelled() || self.max_duration.is_some_and(|limit| started.elapsed() >= limit)
    }
}

/// What a search returned
#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchResult {
    /// `None` only when the position has no legal move
    pub best_move: Option<Move>,
    pub score: i32,
    /// Candidate positions evaluated
    pub evaluations: u64,
    /// Evaluations answered from the position cache
    pub cache_hits: u64,
    pub elapsed: Duration,
    /// The budget ran out before every candidate was evaluated
    pub interrupted: bool,
}

impl SearchResult {
    pub fn evaluations_per_second(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.evaluations as f64 / secs) as u64
        } else {
            0
        }
    }

    /// Share of evaluations served from the cache, in percent
    pub fn cache_hit_percentage(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.cache_hits as f64 * 100.0 / self.evaluations as f64
        }
    }
}

/// Move advisor for the player to move
///
/// Engines never see AllGrow plies: the board applies them automatically.
pub trait Engine: Send {
    fn name(&self) -> &'static str;

    fn best_move(&mut self, board: &Board, budget: &SearchBudget) -> SearchResult;
}

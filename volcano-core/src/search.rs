//! Constrained path search over the board topology
//!
//! A [`PathFinder`] answers reachability and shortest-path queries between
//! two tiles. What counts as a neighbour, which tiles may be crossed, and
//! what a step costs are all decided by its [`TraversalPolicy`]; the acting
//! player handed to the policy is the owner of the start tile at query time.
//!
//! Uniform-cost policies are explored breadth-first in discovery order.
//! Policies with non-uniform step costs are explored in cost order instead,
//! so the returned path is always a cheapest one.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::game::Board;
use crate::tile::Player;
use crate::topology::{topology, TileIndex, TILE_COUNT};

const NO_TILE: usize = usize::MAX;

// ============================================================================
// POLICY
// ============================================================================

/// Traversal behaviour for a [`PathFinder`]
pub trait TraversalPolicy {
    /// Tiles reachable in one step from `tile`
    fn neighbors(&self, tile: TileIndex) -> &[TileIndex] {
        topology().adjacent(tile)
    }

    /// Whether the search may enter `tile` on behalf of `player`
    fn is_traversable(&self, board: &Board, player: Option<Player>, tile: TileIndex) -> bool;

    /// Cost of stepping from `from` to `to`
    fn distance(&self, _board: &Board, _from: TileIndex, _to: TileIndex) -> u32 {
        1
    }

    /// Whether every step costs the same; enables plain breadth-first order
    fn uniform_cost(&self) -> bool {
        true
    }
}

/// Win-path policy: the acting player's own tiles, magma chambers excluded
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPolicy;

impl TraversalPolicy for StandardPolicy {
    fn is_traversable(&self, board: &Board, player: Option<Player>, tile: TileIndex) -> bool {
        let value = board.tile(tile);
        match player {
            Some(p) => value.is_owned_by(p) && board.rules().is_volcano(value),
            None => false,
        }
    }
}

/// Ad-hoc policy: standard adjacency with a caller-supplied predicate
pub struct Traversable<F>(pub F);

impl<F> TraversalPolicy for Traversable<F>
where
    F: Fn(&Board, Option<Player>, TileIndex) -> bool,
{
    fn is_traversable(&self, board: &Board, player: Option<Player>, tile: TileIndex) -> bool {
        (self.0)(board, player, tile)
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Outcome of a path query
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    pub found: bool,
    /// Tiles from start to end inclusive; empty when not found or not requested
    pub path: Vec<TileIndex>,
    /// Total step cost of `path`
    pub length: u32,
}

impl PathResult {
    fn not_found() -> Self {
        Self::default()
    }
}

// ============================================================================
// PATH FINDER
// ============================================================================

/// Path search parameterised by a traversal policy
#[derive(Clone, Debug, Default)]
pub struct PathFinder<P = StandardPolicy> {
    policy: P,
}

impl<P: TraversalPolicy> PathFinder<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Find a path from `start` to `end`
    pub fn find_path(&self, board: &Board, start: TileIndex, end: TileIndex) -> PathResult {
        self.search(board, start, end, true)
    }

    /// Connectivity only; skips path reconstruction
    pub fn has_path(&self, board: &Board, start: TileIndex, end: TileIndex) -> bool {
        self.search(board, start, end, false).found
    }

    fn search(&self, board: &Board, start: TileIndex, end: TileIndex, build_path: bool) -> PathResult {
        if start >= TILE_COUNT || end >= TILE_COUNT {
            return PathResult::not_found();
        }
        let player = board.tile(start).owner();

        let mut came_from = [NO_TILE; TILE_COUNT];
        let mut g_score = [u32::MAX; TILE_COUNT];
        g_score[start] = 0;

        let reached = if self.policy.uniform_cost() {
            self.explore_fifo(board, player, start, end, &mut came_from, &mut g_score)
        } else {
            self.explore_by_cost(board, player, start, end, &mut came_from, &mut g_score)
        };

        if !reached {
            return PathResult::not_found();
        }
        if !build_path {
            return PathResult {
                found: true,
                path: Vec::new(),
                length: g_score[end],
            };
        }

        let mut path = vec![end];
        let mut current = end;
        while came_from[current] != NO_TILE {
            current = came_from[current];
            path.push(current);
        }
        path.reverse();

        PathResult {
            found: true,
            path,
            length: g_score[end],
        }
    }

    /// Breadth-first exploration; a tile is closed when dequeued
    fn explore_fifo(
        &self,
        board: &Board,
        player: Option<Player>,
        start: TileIndex,
        end: TileIndex,
        came_from: &mut [usize; TILE_COUNT],
        g_score: &mut [u32; TILE_COUNT],
    ) -> bool {
        let mut closed = [false; TILE_COUNT];
        let mut discovered = [false; TILE_COUNT];
        let mut open = VecDeque::with_capacity(TILE_COUNT);
        open.push_back(start);
        discovered[start] = true;

        while let Some(current) = open.pop_front() {
            if current == end {
                return true;
            }
            closed[current] = true;

            for &neighbor in self.policy.neighbors(current) {
                if closed[neighbor] || !self.policy.is_traversable(board, player, neighbor) {
                    continue;
                }

                let tentative = g_score[current].saturating_add(self.policy.distance(board, current, neighbor));
                if !discovered[neighbor] {
                    discovered[neighbor] = true;
                    open.push_back(neighbor);
                } else if tentative >= g_score[neighbor] {
                    continue;
                }

                came_from[neighbor] = current;
                g_score[neighbor] = tentative;
            }
        }

        false
    }

    /// Cost-ordered exploration; ties go to the earlier discovery
    fn explore_by_cost(
        &self,
        board: &Board,
        player: Option<Player>,
        start: TileIndex,
        end: TileIndex,
        came_from: &mut [usize; TILE_COUNT],
        g_score: &mut [u32; TILE_COUNT],
    ) -> bool {
        let mut closed = [false; TILE_COUNT];
        let mut sequence: u32 = 0;
        let mut open = BinaryHeap::new();
        open.push(Reverse((0u32, sequence, start)));

        while let Some(Reverse((cost, _, current))) = open.pop() {
            if closed[current] || cost > g_score[current] {
                continue;
            }
            if current == end {
                return true;
            }
            closed[current] = true;

            for &neighbor in self.policy.neighbors(current) {
                if closed[neighbor] || !self.policy.is_traversable(board, player, neighbor) {
                    continue;
                }

                let tentative = cost.saturating_add(self.policy.distance(board, current, neighbor));
                if tentative < g_score[neighbor] {
                    came_from[neighbor] = current;
                    g_score[neighbor] = tentative;
                    sequence += 1;
                    open.push(Reverse((tentative, sequence, neighbor)));
                }
            }
        }

        false
    }
}

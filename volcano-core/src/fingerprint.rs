//! Position fingerprints and the evaluation cache
//!
//! Every (tile, owner, level) combination gets a random 64-bit mask; a
//! position's fingerprint is the XOR of the masks selected by its tiles.
//! The [`crate::Board`] keeps its fingerprint up to date on every tile
//! write, so lookups here never rescan the board.
//!
//! Distinct positions can share a fingerprint. Collisions are neither
//! detected nor resolved.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::game::Board;
use crate::tile::Tile;
use crate::topology::{TileIndex, TILE_COUNT};

/// Seed for the key table, fixed so fingerprints are reproducible
const FINGERPRINT_SEED: u64 = 0x766f_6c63_616e_6f21;

/// Owner slots: empty, Player One, Player Two
const OWNER_SLOTS: usize = 3;

/// Random masks indexed by (tile, owner slot, level)
#[derive(Debug)]
pub struct ZobristKeys {
    masks: Vec<u64>,
    levels: usize,
}

impl ZobristKeys {
    /// Keys for levels `0..=max_level`
    pub fn new(max_level: u8) -> Self {
        Self::with_seed(max_level, FINGERPRINT_SEED)
    }

    pub fn with_seed(max_level: u8, seed: u64) -> Self {
        let levels = max_level as usize + 1;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let masks = (0..TILE_COUNT * OWNER_SLOTS * levels)
            .map(|_| rng.gen::<u64>())
            .collect();
        Self { masks, levels }
    }

    /// Mask for a tile value at an index
    ///
    /// Levels above the table (only seen mid-cascade) share the top key.
    pub fn key(&self, index: TileIndex, tile: Tile) -> u64 {
        let level = (tile.level() as usize).min(self.levels - 1);
        self.masks[(index * OWNER_SLOTS + tile.owner_slot()) * self.levels + level]
    }

    /// Full XOR over a tile array
    pub fn fingerprint(&self, tiles: &[Tile]) -> u64 {
        tiles
            .iter()
            .enumerate()
            .fold(0, |hash, (i, &tile)| hash ^ self.key(i, tile))
    }
}

// ============================================================================
// POSITION CACHE
// ============================================================================

/// Memo table of evaluations keyed by board fingerprint
///
/// Not synchronised. Each search owns its own cache.
#[derive(Clone, Debug)]
pub struct PositionCache<V> {
    entries: FxHashMap<u64, V>,
}

impl<V: Clone> PositionCache<V> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Stored evaluation for this position, if any
    pub fn get(&self, board: &Board) -> Option<V> {
        self.entries.get(&board.fingerprint()).cloned()
    }

    /// Store an evaluation, replacing whatever shared the fingerprint
    pub fn set(&mut self, board: &Board, evaluation: V) {
        self.entries.insert(board.fingerprint(), evaluation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: Clone> Default for PositionCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;
    use crate::rules::Rules;
    use crate::tile::Player;

    fn position(changes: &[(TileIndex, Tile)]) -> Board {
        let mut tiles = [Tile::Empty; TILE_COUNT];
        for &(i, tile) in changes {
            tiles[i] = tile;
        }
        Board::with_position(Rules::default(), tiles, 4).unwrap()
    }

    #[test]
    fn test_unseen_position_misses() {
        let cache: PositionCache<i32> = PositionCache::new();
        assert_eq!(cache.get(&Board::new(Rules::default()).unwrap()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_identical_position_hits() {
        let stones = [
            (3, Tile::claimed(Player::One, 2)),
            (41, Tile::claimed(Player::Two, 6)),
        ];
        let mut cache = PositionCache::new();
        cache.set(&position(&stones), 17);

        // Built independently, same (owner, level) everywhere
        assert_eq!(cache.get(&position(&stones)), Some(17));

        // One level different
        let changed = [
            (3, Tile::claimed(Player::One, 3)),
            (41, Tile::claimed(Player::Two, 6)),
        ];
        assert_eq!(cache.get(&position(&changed)), None);

        // Same level, other owner
        let flipped = [
            (3, Tile::claimed(Player::Two, 2)),
            (41, Tile::claimed(Player::Two, 6)),
        ];
        assert_eq!(cache.get(&position(&flipped)), None);
    }

    #[test]
    fn test_same_tiles_reached_by_play_hit() {
        let mut played = Board::new(Rules::default()).unwrap();
        played.apply_move(Move::Tile(5)).unwrap();

        let mut tiles = [Tile::Empty; TILE_COUNT];
        tiles[5] = Tile::claimed(Player::One, 1);
        let built = Board::with_position(Rules::default(), tiles, 2).unwrap();

        let mut cache = PositionCache::new();
        cache.set(&played, -4);
        assert_eq!(cache.get(&built), Some(-4));
    }

    #[test]
    fn test_clear() {
        let mut cache = PositionCache::with_capacity(4);
        let board = Board::new(Rules::default()).unwrap();
        cache.set(&board, 1u8);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert_eq!(cache.get(&board), None);
    }

    #[test]
    fn test_keys_are_reproducible() {
        let a = ZobristKeys::new(10);
        let b = ZobristKeys::new(10);
        let tile = Tile::claimed(Player::Two, 7);
        assert_eq!(a.key(12, tile), b.key(12, tile));
        assert_ne!(a.key(12, tile), a.key(13, tile));
        // Transient over-cap levels fold onto the top key
        assert_eq!(a.key(0, Tile::claimed(Player::One, 14)), a.key(0, Tile::claimed(Player::One, 10)));
    }
}

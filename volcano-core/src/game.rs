//! Board state, move application, eruptions and win detection

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::ZobristKeys;
use crate::rules::{Rules, RulesError};
use crate::search::{PathFinder, StandardPolicy};
use crate::tile::{Player, Tile};
use crate::topology::{topology, TileIndex, HALF_TILE_COUNT, TILE_COUNT};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Eruption phases resolved before a runaway chain reaction is called a draw
pub const MAX_ERUPTION_PHASES: u32 = 100;

/// Length of the turn schedule cycle (two 3-ply blocks)
const SCHEDULE_CYCLE: u32 = 6;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    OneWins,
    TwoWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::OneWins => Some(Player::One),
            GameResult::TwoWins => Some(Player::Two),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }

    fn won_by(player: Player) -> Self {
        match player {
            Player::One => GameResult::OneWins,
            Player::Two => GameResult::TwoWins,
        }
    }
}

/// How the winner was decided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    #[default]
    Normal = 0,
    /// Both players connected on the same AllGrow ply; the previous mover wins
    SimultaneousTiebreak = 1,
}

/// A move: grow a single tile, or the forced global growth ply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Tile(TileIndex),
    AllGrow,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Tile(i) if i < TILE_COUNT => f.pad(topology().name(i)),
            Move::Tile(i) => f.pad(&format!("#{}", i)),
            Move::AllGrow => f.pad("all-grow"),
        }
    }
}

/// Kind of ply scheduled for a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    SingleGrow,
    AllGrow,
}

/// Which move categories [`Board::legal_moves`] should produce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveFilter {
    /// Grow own, non-dormant tiles below `max_growth_value`
    pub growth: bool,
    /// Claim empty tiles
    pub expand: bool,
    /// Attack enemy tiles the capture rules allow
    pub capture: bool,
    pub max_growth_value: u8,
}

impl MoveFilter {
    /// Every category, uncapped growth
    pub fn unrestricted(rules: &Rules) -> Self {
        Self {
            growth: true,
            expand: true,
            capture: true,
            max_growth_value: rules.max_volcano_level,
        }
    }

    /// Claim empty tiles only
    pub fn expansion(rules: &Rules) -> Self {
        Self {
            growth: false,
            expand: true,
            capture: false,
            max_growth_value: rules.max_volcano_level,
        }
    }

    fn is_unrestricted(&self, rules: &Rules) -> bool {
        self.growth && self.expand && self.capture && self.max_growth_value >= rules.max_volcano_level
    }
}

/// Rejected board operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid rules: {0}")]
    InvalidRules(#[from] RulesError),

    #[error("game is already over ({0:?})")]
    GameOver(GameResult),

    #[error("tile index {0} is outside the board")]
    TileOutOfRange(TileIndex),

    #[error("{mv} is not legal for {player:?} on turn {turn}")]
    IllegalMove { mv: Move, player: Player, turn: u32 },

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

// ============================================================================
// TURN SCHEDULE
// ============================================================================

/// Which player moves on a given turn
///
/// Turns form 3-ply blocks of {single, AllGrow, single}, alternating
/// players. Turn 1 is the last ply of Player One's opening block.
pub fn player_for_turn(turn: u32) -> Player {
    match turn.saturating_sub(1) % SCHEDULE_CYCLE {
        1..=3 => Player::Two,
        _ => Player::One,
    }
}

/// Kind of ply a turn requires
pub fn move_kind_for_turn(turn: u32) -> MoveKind {
    match turn.saturating_sub(1) % SCHEDULE_CYCLE {
        2 | 5 => MoveKind::AllGrow,
        _ => MoveKind::SingleGrow,
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Game position (clone to explore)
///
/// Clones share only the immutable rules and fingerprint keys.
#[derive(Clone, Debug)]
pub struct Board {
    rules: Arc<Rules>,
    keys: Arc<ZobristKeys>,

    tiles: [Tile; TILE_COUNT],
    dormant: [bool; TILE_COUNT],

    /// Player to move
    player: Player,

    /// Ply number, starting at 1
    turn: u32,

    result: GameResult,
    winning_path: Vec<TileIndex>,
    win_condition: WinCondition,

    /// The last single-tile move landed on an already claimed tile
    last_move_increased_tile: bool,

    /// XOR of the keys of every tile, kept current by `set_tile`
    fingerprint: u64,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, turn 1, Player One to move
    pub fn new(rules: Rules) -> Result<Self, GameError> {
        rules.validate()?;
        let keys = ZobristKeys::new(rules.max_volcano_level);
        let tiles = [Tile::Empty; TILE_COUNT];
        let fingerprint = keys.fingerprint(&tiles);

        Ok(Self {
            rules: Arc::new(rules),
            keys: Arc::new(keys),
            tiles,
            dormant: [false; TILE_COUNT],
            player: Player::One,
            turn: 1,
            result: GameResult::Ongoing,
            winning_path: Vec::new(),
            win_condition: WinCondition::Normal,
            last_move_increased_tile: false,
            fingerprint,
        })
    }

    /// Board set up with explicit tiles at a given turn
    ///
    /// Tiles at the eruption level are only accepted under the dormant rule,
    /// and are marked dormant. A position that already holds an antipodal
    /// chain comes back finished. Chains for both players on turn 1 are
    /// rejected, since there is no previous ply to break the tie.
    pub fn with_position(rules: Rules, tiles: [Tile; TILE_COUNT], turn: u32) -> Result<Self, GameError> {
        let mut board = Self::new(rules)?;
        if turn == 0 {
            return Err(GameError::InvalidPosition("turns start at 1".to_string()));
        }

        let max = board.rules.max_volcano_level;
        let dormant_rule = board.rules.allow_dormant_volcanoes;
        for (i, tile) in tiles.into_iter().enumerate() {
            let level = tile.level();
            if level > max || (level == max && !dormant_rule) {
                return Err(GameError::InvalidPosition(format!(
                    "tile {} has level {} (eruption level is {})",
                    topology().name(i),
                    level,
                    max
                )));
            }
            board.set_tile(i, tile);
            board.dormant[i] = level == max;
        }

        board.turn = turn;
        board.player = player_for_turn(turn);

        board.detect_win();
        if board.win_condition == WinCondition::SimultaneousTiebreak && board.player_for_previous_turn().is_none() {
            return Err(GameError::InvalidPosition(
                "both players hold a chain with no previous ply".to_string(),
            ));
        }
        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn tiles(&self) -> &[Tile; TILE_COUNT] {
        &self.tiles
    }

    /// Tile at `index`
    ///
    /// # Panics
    ///
    /// If `index >= TILE_COUNT`. Use [`Board::get_tile`] for unchecked input.
    pub fn tile(&self, index: TileIndex) -> Tile {
        self.tiles[index]
    }

    /// Tile at `index`, or `None` past the end of the board
    pub fn get_tile(&self, index: TileIndex) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    pub fn dormant(&self) -> &[bool; TILE_COUNT] {
        &self.dormant
    }

    /// Whether the tile at `index` is dormant; `false` past the end of the board
    pub fn is_dormant(&self, index: TileIndex) -> bool {
        self.dormant.get(index).copied().unwrap_or(false)
    }

    /// Player to move
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    pub fn winning_path(&self) -> &[TileIndex] {
        &self.winning_path
    }

    pub fn win_condition(&self) -> WinCondition {
        self.win_condition
    }

    pub fn last_move_increased_tile(&self) -> bool {
        self.last_move_increased_tile
    }

    /// Kind of ply due on the current turn
    pub fn move_kind(&self) -> MoveKind {
        move_kind_for_turn(self.turn)
    }

    /// Player who made the ply before the current turn
    pub fn player_for_previous_turn(&self) -> Option<Player> {
        (self.turn > 1).then(|| player_for_turn(self.turn - 1))
    }

    /// Indices of the tiles a player owns
    pub fn owned_tiles(&self, player: Player) -> impl Iterator<Item = TileIndex> + '_ {
        (0..TILE_COUNT).filter(move |&i| self.tiles[i].is_owned_by(player))
    }

    /// Position fingerprint, maintained incrementally
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Fingerprint recomputed over every tile
    pub fn recompute_fingerprint(&self) -> u64 {
        self.keys.fingerprint(&self.tiles)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal moves under a category filter
    ///
    /// A filter that yields nothing is retried once without restrictions, so
    /// the list is only empty when the position has no move at all.
    pub fn legal_moves(&self, filter: MoveFilter) -> Vec<Move> {
        let moves = self.collect_moves(filter);
        if moves.is_empty() && !filter.is_unrestricted(&self.rules) {
            return self.collect_moves(MoveFilter::unrestricted(&self.rules));
        }
        moves
    }

    /// Every legal move
    pub fn all_legal_moves(&self) -> Vec<Move> {
        self.collect_moves(MoveFilter::unrestricted(&self.rules))
    }

    /// Empty tiles to claim, or any legal move once none are left
    pub fn expansion_moves(&self) -> Vec<Move> {
        self.legal_moves(MoveFilter::expansion(&self.rules))
    }

    pub fn is_legal_move(&self, mv: Move) -> bool {
        self.all_legal_moves().contains(&mv)
    }

    fn collect_moves(&self, filter: MoveFilter) -> Vec<Move> {
        if self.move_kind() == MoveKind::AllGrow {
            return vec![Move::AllGrow];
        }

        let rules = &self.rules;
        let opponent = self.player.opponent();
        let mut moves = Vec::new();

        for (i, tile) in self.tiles.iter().enumerate() {
            let growth = filter.growth
                && tile.is_owned_by(self.player)
                && !self.dormant[i]
                && tile.level() < filter.max_growth_value;

            let expand = filter.expand && tile.is_empty();

            let capture = filter.capture
                && tile.is_owned_by(opponent)
                && if rules.is_magma_chamber(*tile) {
                    rules.allow_magma_chamber_captures
                } else {
                    rules.allow_volcano_captures
                };

            if growth || expand || capture {
                moves.push(Move::Tile(i));
            }
        }

        moves
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Apply a move for the player to move
    ///
    /// Returns `true` when a scheduled AllGrow ply was applied right after
    /// it. Rejected moves leave the board untouched.
    pub fn apply_move(&mut self, mv: Move) -> Result<bool, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver(self.result));
        }
        if let Move::Tile(i) = mv {
            if i >= TILE_COUNT {
                return Err(GameError::TileOutOfRange(i));
            }
        }
        if !self.is_legal_move(mv) {
            return Err(GameError::IllegalMove {
                mv,
                player: self.player,
                turn: self.turn,
            });
        }
        Ok(self.play(mv))
    }

    /// Copy of this board with a move applied
    pub fn child(&self, mv: Move) -> Result<Board, GameError> {
        let mut child = self.clone();
        child.apply_move(mv)?;
        Ok(child)
    }

    fn play(&mut self, mv: Move) -> bool {
        let mut eruptions = Vec::new();

        match mv {
            Move::AllGrow => {
                self.last_move_increased_tile = false;
                for i in 0..TILE_COUNT {
                    let tile = self.tiles[i];
                    let Some(owner) = tile.owner() else { continue };
                    if self.dormant[i] {
                        continue;
                    }
                    let grown = tile.stepped_toward(owner);
                    self.set_tile(i, grown);
                    if self.rules.erupts(grown) {
                        eruptions.push(i);
                    }
                }
            }
            Move::Tile(i) => {
                let tile = self.tiles[i];
                self.last_move_increased_tile = !tile.is_empty();
                let stepped = tile.stepped_toward(self.player);
                self.set_tile(i, stepped);
                self.dormant[i] = false;
                if self.rules.erupts(stepped) {
                    eruptions.push(i);
                }
            }
        }

        if !eruptions.is_empty() {
            self.resolve_eruptions(eruptions);
        }

        if !self.is_over() {
            self.detect_win();
        }

        if !self.is_over() {
            self.turn += 1;
            self.player = player_for_turn(self.turn);

            if self.move_kind() == MoveKind::AllGrow {
                self.play(Move::AllGrow);
                return true;
            }
        }

        false
    }

    fn set_tile(&mut self, index: TileIndex, tile: Tile) {
        self.fingerprint ^= self.keys.key(index, self.tiles[index]) ^ self.keys.key(index, tile);
        self.tiles[index] = tile;
    }

    // ========================================================================
    // ERUPTIONS
    // ========================================================================

    /// Resolve eruption phases until the board settles
    ///
    /// Returns the number of phases run. A chain still erupting after
    /// [`MAX_ERUPTION_PHASES`] ends the game as a draw.
    fn resolve_eruptions(&mut self, mut eruptions: Vec<TileIndex>) -> u32 {
        let mut phases = 0;

        while !eruptions.is_empty() {
            if phases == MAX_ERUPTION_PHASES {
                tracing::warn!(
                    turn = self.turn,
                    pending = eruptions.len(),
                    "eruptions did not settle after {} phases, declaring a draw",
                    MAX_ERUPTION_PHASES
                );
                self.result = GameResult::Draw;
                self.winning_path.clear();
                break;
            }
            phases += 1;
            eruptions = self.erupt_phase(&eruptions);
        }

        tracing::debug!(turn = self.turn, phases, "eruptions resolved");
        phases
    }

    /// One eruption phase; returns the tiles erupting in the next phase
    ///
    /// Every erupting tile is reset before any overflow is measured, and
    /// overflow is summed per neighbour before it is applied, so the order
    /// of `erupting` has no effect on the outcome.
    fn erupt_phase(&mut self, erupting: &[TileIndex]) -> Vec<TileIndex> {
        let rules = Arc::clone(&self.rules);
        let topo = topology();

        let mut seen = [false; TILE_COUNT];
        let mut sources = Vec::with_capacity(erupting.len());
        for &i in erupting {
            if std::mem::replace(&mut seen[i], true) {
                continue;
            }
            let Some(owner) = self.tiles[i].owner() else { continue };

            if rules.allow_dormant_volcanoes {
                self.set_tile(i, Tile::claimed(owner, rules.max_volcano_level));
                self.dormant[i] = true;
            } else {
                self.set_tile(i, Tile::claimed(owner, rules.post_eruption_level()));
            }
            sources.push((i, owner));
        }

        let mut deltas = [0i32; TILE_COUNT];
        let mut touched = [false; TILE_COUNT];
        let mut touched_order = Vec::new();
        for &(i, owner) in &sources {
            for &adjacent in topo.adjacent(i) {
                let neighbor = self.tiles[adjacent];
                let amount = match neighbor.owner() {
                    None => rules.erupt_overflow_empty,
                    Some(p) if p == owner => {
                        if self.dormant[adjacent] {
                            continue;
                        }
                        rules.erupt_overflow_friendly
                    }
                    Some(_) => rules.erupt_overflow_enemy,
                };

                deltas[adjacent] += owner.sign() * amount as i32;
                if !std::mem::replace(&mut touched[adjacent], true) {
                    touched_order.push(adjacent);
                }
            }
        }

        let mut next = Vec::new();
        for i in touched_order {
            if deltas[i] != 0 {
                let before = self.tiles[i];
                let mut after = Tile::from_signed_level(before.signed_level() + deltas[i]);

                let flipped = matches!((before.owner(), after.owner()), (Some(a), Some(b)) if a != b);
                if flipped && !rules.erupt_overflow_allow_capture {
                    after = Tile::Empty;
                    self.dormant[i] = false;
                }

                self.set_tile(i, after);
                if rules.erupts(after) {
                    next.push(i);
                }
            }

            if rules.allow_dormant_volcanoes {
                self.dormant[i] = self.tiles[i].level() == rules.max_volcano_level;
            }
        }

        next
    }

    // ========================================================================
    // WIN DETECTION
    // ========================================================================

    /// Path joining `tile` to its antipode, if the pair forms a winning chain
    ///
    /// Both ends must belong to the same player and be volcanoes; the chain
    /// may only cross that player's volcanoes.
    pub fn antipodal_path(&self, tile: TileIndex) -> Option<Vec<TileIndex>> {
        self.antipodal_path_with(&PathFinder::new(StandardPolicy), tile)
    }

    fn antipodal_path_with(&self, finder: &PathFinder, tile: TileIndex) -> Option<Vec<TileIndex>> {
        let antipode = topology().antipode(tile);
        let (here, there) = (self.tiles[tile], self.tiles[antipode]);
        let owner = here.owner()?;

        if !there.is_owned_by(owner) || !self.rules.is_volcano(here) || !self.rules.is_volcano(there) {
            return None;
        }

        let result = finder.find_path(self, tile, antipode);
        result.found.then_some(result.path)
    }

    /// Scan the first half of the board for antipodal chains
    ///
    /// If both players complete a chain on the same ply, the player who
    /// made the previous ply wins with their own chain.
    fn detect_win(&mut self) {
        let finder = PathFinder::new(StandardPolicy);
        let mut tentative: Option<(Player, Vec<TileIndex>)> = None;

        for i in 0..HALF_TILE_COUNT {
            let Some(path) = self.antipodal_path_with(&finder, i) else { continue };
            let owner = self.tiles[i].owner().unwrap_or(self.player);

            match tentative.as_ref().map(|(leader, _)| *leader) {
                None => tentative = Some((owner, path)),
                Some(leader) if leader != owner => {
                    let winner = self.player_for_previous_turn().unwrap_or(owner);
                    let winner_path = if winner == owner {
                        path
                    } else {
                        tentative.take().map(|(_, p)| p).unwrap_or_default()
                    };
                    self.declare_winner(winner, winner_path, WinCondition::SimultaneousTiebreak);
                    return;
                }
                Some(_) => {}
            }
        }

        if let Some((owner, path)) = tentative {
            self.declare_winner(owner, path, WinCondition::Normal);
        }
    }

    fn declare_winner(&mut self, winner: Player, path: Vec<TileIndex>, condition: WinCondition) {
        tracing::info!(
            turn = self.turn,
            ?winner,
            ?condition,
            path_len = path.len(),
            "antipodal chain completed"
        );
        self.result = GameResult::won_by(winner);
        self.winning_path = path;
        self.win_condition = condition;
    }
}

// ============================================================================
// TESTS
// ============================================================================

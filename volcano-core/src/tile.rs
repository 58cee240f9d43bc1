//! Tile ownership and levels

use serde::{Deserialize, Serialize};

/// Player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Direction this player's growth moves a signed level (+1 / -1)
    pub fn sign(self) -> i32 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }
}

/// A single board tile
///
/// Ownership is explicit: an unclaimed tile has no level at all, and a
/// claimed tile always has a level of at least one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Claimed { owner: Player, level: u8 },
}

impl Tile {
    pub fn claimed(owner: Player, level: u8) -> Self {
        if level == 0 {
            Tile::Empty
        } else {
            Tile::Claimed { owner, level }
        }
    }

    pub fn owner(&self) -> Option<Player> {
        match *self {
            Tile::Empty => None,
            Tile::Claimed { owner, .. } => Some(owner),
        }
    }

    pub fn level(&self) -> u8 {
        match *self {
            Tile::Empty => 0,
            Tile::Claimed { level, .. } => level,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tile::Empty)
    }

    pub fn is_owned_by(&self, player: Player) -> bool {
        self.owner() == Some(player)
    }

    /// Signed level: positive for Player One, negative for Player Two
    pub fn signed_level(&self) -> i32 {
        match *self {
            Tile::Empty => 0,
            Tile::Claimed { owner, level } => owner.sign() * level as i32,
        }
    }

    /// Inverse of [`Tile::signed_level`]; magnitudes saturate at `u8::MAX`
    pub fn from_signed_level(value: i32) -> Self {
        let level = value.unsigned_abs().min(u8::MAX as u32) as u8;
        match value.signum() {
            1 => Tile::Claimed { owner: Player::One, level },
            -1 => Tile::Claimed { owner: Player::Two, level },
            _ => Tile::Empty,
        }
    }

    /// One step toward `player`: grows an own or empty tile, shrinks an enemy tile
    pub fn stepped_toward(&self, player: Player) -> Self {
        Tile::from_signed_level(self.signed_level() + player.sign())
    }

    /// Owner index used for fingerprint keys (0 = empty)
    pub(crate) fn owner_slot(&self) -> usize {
        match self.owner() {
            None => 0,
            Some(Player::One) => 1,
            Some(Player::Two) => 2,
        }
    }
}

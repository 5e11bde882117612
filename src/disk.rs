use anyhow::{anyhow, Result};

use std::fmt;
use std::str::FromStr;

use crate::bitboard::GameState;

/// The token occupying a cell, or the side to move
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Disk {
    /// Moves first, shown as `X`
    PlayerOne,
    /// Shown as `O`
    PlayerTwo,
    Empty,
}

impl Disk {
    /// Swaps between `PlayerOne` and `PlayerTwo`, leaving `Empty` alone
    pub fn alternate(&mut self) {
        *self = self.counterpart();
    }

    /// Gives `PlayerTwo` for `PlayerOne` and vice versa
    pub fn counterpart(self) -> Self {
        match self {
            Disk::PlayerOne => Disk::PlayerTwo,
            Disk::PlayerTwo => Disk::PlayerOne,
            Disk::Empty => Disk::Empty,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Disk::Empty
    }

    /// Returns whether the game state is a victory for this disk
    pub fn is_victory(self, state: GameState) -> bool {
        match self {
            Disk::PlayerOne => state == GameState::FirstVictory,
            Disk::PlayerTwo => state == GameState::SecondVictory,
            Disk::Empty => false,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Disk::PlayerOne => 'X',
            Disk::PlayerTwo => 'O',
            Disk::Empty => ' ',
        }
    }

    // index into the per-player occupancy masks
    pub(crate) fn index(self) -> Option<usize> {
        match self {
            Disk::PlayerOne => Some(0),
            Disk::PlayerTwo => Some(1),
            Disk::Empty => None,
        }
    }
}

impl Default for Disk {
    fn default() -> Self {
        Disk::Empty
    }
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl FromStr for Disk {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "X" | "x" => Ok(Disk::PlayerOne),
            "O" | "o" => Ok(Disk::PlayerTwo),
            other => Err(anyhow!("could not parse '{}' as a disk, expected X or O", other)),
        }
    }
}

use anyhow::{anyhow, Result};

use std::ops::{Deref, DerefMut};

use crate::{disk::Disk, HEIGHT, WIDTH};

mod static_masks {
    use crate::{HEIGHT, WIDTH};

    /// Repeats the excluded column bits on every row and returns the complement
    pub const fn row_mask(row_exclusion_bits: u8) -> u64 {
        let mut exclusion = row_exclusion_bits as u64;
        let mut row = 1;
        while row < HEIGHT {
            exclusion |= exclusion << WIDTH;
            row += 1;
        }
        !exclusion
    }

    pub const fn full_board_mask() -> u64 {
        u64::MAX >> (64 - WIDTH * HEIGHT)
    }
}

// a horizontal or up-right chain of 4 cannot start in the rightmost 3 columns
const RIGHTWARD_CHAIN_MASK: u64 = static_masks::row_mask(0b1110_0000);
// an up-left chain of 4 cannot start in the leftmost 3 columns
const LEFTWARD_CHAIN_MASK: u64 = static_masks::row_mask(0b0000_0111);
// a horizontal pair never starts in the last column, anything there wrapped from the next row
const HORIZONTAL_ADJACENCY_MASK: u64 = static_masks::row_mask(1 << 7);
const FULL_BOARD_MASK: u64 = static_masks::full_board_mask();

/// Row strides between neighbouring cells in the packed layout
const VERTICAL: u32 = WIDTH as u32;
const UP_RIGHT: u32 = WIDTH as u32 + 1;
const UP_LEFT: u32 = WIDTH as u32 - 1;

/// Outcome of a position
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GameState {
    FirstVictory,
    SecondVictory,
    Tie,
    Incomplete,
}

impl GameState {
    pub fn is_over(self) -> bool {
        self != GameState::Incomplete
    }
}

/// Packed board with one 64 bit occupancy mask per player
///
/// Bit `8 * row + column` of a player's mask is set when that player has a disk at
/// `(row, column)`, with row 0 at the bottom. The column heights double as the next free
/// row of every column.
///
/// # Make/unmake
/// Search routines explore hypothetical moves in place with [`BitBoard::probe`] (or a
/// matched [`BitBoard::add_disk`]/[`BitBoard::pop_disk`] pair) and must restore the board
/// before returning.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BitBoard {
    locations: [u64; 2],
    column_heights: [u8; WIDTH],
}

impl BitBoard {
    pub fn new() -> Self {
        Self {
            locations: [0; 2],
            column_heights: [0; WIDTH],
        }
    }

    /// Replays a string of 1-indexed columns, alternating disks starting with `PlayerOne`
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut disk = Disk::PlayerOne;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    let column = column - 1;
                    // abort if the position was already won
                    if board.check_win() != GameState::Incomplete {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    if !board.add_disk(disk, column) {
                        return Err(anyhow!("Invalid move, column {} full", column + 1));
                    }
                    disk.alternate();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Occupancy mask of the given disk, empty for `Disk::Empty`
    pub fn locations(&self, disk: Disk) -> u64 {
        disk.index().map_or(0, |i| self.locations[i])
    }

    pub fn column_heights(&self) -> [u8; WIDTH] {
        self.column_heights
    }

    pub fn height(&self, column: usize) -> usize {
        self.column_heights[column] as usize
    }

    pub fn disks_added(&self) -> usize {
        self.column_heights.iter().map(|&h| h as usize).sum()
    }

    pub fn disk(&self, row: usize, column: usize) -> Disk {
        let bit: u64 = 1 << (row * WIDTH + column);
        if self.locations[0] & bit != 0 {
            Disk::PlayerOne
        } else if self.locations[1] & bit != 0 {
            Disk::PlayerTwo
        } else {
            Disk::Empty
        }
    }

    pub fn valid_move(&self, column: usize) -> bool {
        column < WIDTH && (self.column_heights[column] as usize) < HEIGHT
    }

    /// Drops a disk into the column, returns whether there was room for it
    pub fn add_disk(&mut self, disk: Disk, column: usize) -> bool {
        let index = match disk.index() {
            Some(index) => index,
            None => return false,
        };
        if !self.valid_move(column) {
            return false;
        }
        let row = self.column_heights[column] as usize;
        self.locations[index] |= 1 << (row * WIDTH + column);
        self.column_heights[column] += 1;
        true
    }

    /// Removes the top disk of the column, assuming it belongs to `disk`
    ///
    /// Only valid as the undo of an immediately preceding successful `add_disk`
    /// with the same arguments.
    pub fn pop_disk(&mut self, disk: Disk, column: usize) {
        debug_assert!(self.column_heights[column] > 0, "pop from empty column {}", column);
        if let Some(index) = disk.index() {
            self.column_heights[column] -= 1;
            let row = self.column_heights[column] as usize;
            self.locations[index] &= !(1 << (row * WIDTH + column));
        }
    }

    /// Plays a hypothetical move that is undone when the returned guard is dropped
    ///
    /// Returns `None` without touching the board if the move is illegal.
    pub fn probe(&mut self, disk: Disk, column: usize) -> Option<Probe<'_>> {
        if self.add_disk(disk, column) {
            Some(Probe {
                board: self,
                disk,
                column,
            })
        } else {
            None
        }
    }

    /// Whether the mask contains four set bits in a line
    pub fn is_winning_mask(locations: u64) -> bool {
        Self::check_vertical(locations)
            || Self::check_horizontal(locations)
            || Self::check_diagonal(locations)
    }

    pub fn check_vertical(locations: u64) -> bool {
        // bits of the top 3 rows shift out, so no mask is needed
        let mut m = locations & (locations >> VERTICAL);
        m &= m >> (2 * VERTICAL);
        m != 0
    }

    pub fn check_horizontal(locations: u64) -> bool {
        let mut m = locations & (locations >> 1);
        m &= m >> 2;
        m & RIGHTWARD_CHAIN_MASK != 0
    }

    pub fn check_diagonal(locations: u64) -> bool {
        let mut m = locations & (locations >> UP_RIGHT);
        m &= m >> (2 * UP_RIGHT);
        if m & RIGHTWARD_CHAIN_MASK != 0 {
            return true;
        }

        m = locations & (locations >> UP_LEFT);
        m &= m >> (2 * UP_LEFT);
        m & LEFTWARD_CHAIN_MASK != 0
    }

    /// Returns the victory of either player, or `Incomplete`
    ///
    /// `PlayerOne` is checked first.
    pub fn check_win(&self) -> GameState {
        if Self::is_winning_mask(self.locations[0]) {
            GameState::FirstVictory
        } else if Self::is_winning_mask(self.locations[1]) {
            GameState::SecondVictory
        } else {
            GameState::Incomplete
        }
    }

    /// Whether every cell holds a disk, regardless of any four-in-a-row
    pub fn check_tie(&self) -> bool {
        (self.locations[0] | self.locations[1]) & FULL_BOARD_MASK == FULL_BOARD_MASK
    }

    /// Returns a victory, a tie or `Incomplete`, in that order of precedence
    pub fn state(&self) -> GameState {
        match self.check_win() {
            GameState::Incomplete if self.check_tie() => GameState::Tie,
            state => state,
        }
    }

    // sums popcounts of progressively longer runs, the k-th iteration weighted by k
    fn chain_score(mut locations: u64, shift: u32, keep_mask: u64) -> i32 {
        let mut score = 0;
        let mut weight = 1;
        while locations != 0 {
            locations &= locations >> shift;
            locations &= keep_mask;
            score += weight * locations.count_ones() as i32;
            weight += 1;
        }
        score
    }

    /// Heuristic rewarding adjacent disks in all four directions
    pub fn adjacency_score(&self, disk: Disk) -> i32 {
        let locations = self.locations(disk);
        Self::chain_score(locations, 1, HORIZONTAL_ADJACENCY_MASK)
            + Self::chain_score(locations, VERTICAL, u64::MAX)
            + Self::chain_score(locations, UP_LEFT, u64::MAX)
            + Self::chain_score(locations, UP_RIGHT, u64::MAX)
    }

    /// Static evaluation from the point of view of `disk`
    pub fn heuristic(&self, disk: Disk) -> i32 {
        self.adjacency_score(disk) - self.adjacency_score(disk.counterpart())
    }
}

/// A hypothetical disk on a [`BitBoard`], removed again on drop
pub struct Probe<'a> {
    board: &'a mut BitBoard,
    disk: Disk,
    column: usize,
}

impl Probe<'_> {
    /// The disk that was dropped
    pub fn probed_disk(&self) -> Disk {
        self.disk
    }

    pub fn probed_column(&self) -> usize {
        self.column
    }
}

impl Deref for Probe<'_> {
    type Target = BitBoard;

    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl DerefMut for Probe<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.board
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        self.board.pop_disk(self.disk, self.column);
    }
}

//! An agent for playing four-in-a-row on an 8x8 board
//!
//! Positions are packed into one 64 bit mask per player, which makes win detection and
//! the scoring heuristic a handful of shifts. The agent picks a column with a depth-limited
//! negamax search using alpha-beta pruning, examining the center columns first.
//!
//! # Basic Usage
//!
//! ```
//! use four_in_a_row::{agent::Agent, bitboard::BitBoard, disk::Disk};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // PlayerOne has three disks stacked in the third column
//! let board = BitBoard::from_moves("37383")?;
//! let mut agent = Agent::new(board, Disk::PlayerOne).with_depth(4);
//!
//! assert_eq!(agent.current_winning_moves(), vec![2]);
//! assert_eq!(agent.choose_column(), 2);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod disk;

pub mod bitboard;

pub mod arrayboard;

pub mod agent;

pub mod timed_agent;

mod test;

pub use agent::{Agent, ColumnChooser};
pub use arrayboard::ArrayBoard;
pub use bitboard::{BitBoard, GameState};
pub use disk::Disk;
pub use timed_agent::TimedAgent;

/// The width of the game board in tiles
pub const WIDTH: usize = 8;

/// The height of the game board in tiles
pub const HEIGHT: usize = 8;

// ensure that the given dimensions fit in a u64 for the bitboard representation
const_assert!(WIDTH * HEIGHT <= 64);

use anyhow::{anyhow, Result};
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::fmt;
use std::io::{stdout, Write};

use crate::{
    bitboard::{BitBoard, GameState},
    disk::Disk,
    HEIGHT, WIDTH,
};

/// Plain grid board used for display and move input
///
/// Move search works on [`BitBoard`], which is built from this board by replaying each
/// column bottom-up.
#[derive(Clone, Debug)]
pub struct ArrayBoard {
    cells: [Disk; WIDTH * HEIGHT], // cells are stored left-to-right, bottom-to-top
    heights: [usize; WIDTH],
    current: Disk,
    /// 1-indexed columns played through `play_checked`
    pub game: String,
    num_moves: usize,
}

impl ArrayBoard {
    pub fn new() -> Self {
        Self {
            cells: [Disk::Empty; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            current: Disk::PlayerOne,
            game: String::new(),
            num_moves: 0,
        }
    }

    pub fn from_moves(moves: &str) -> Result<Self> {
        let mut board = Self::new();

        for column_char in moves.chars() {
            match column_char.to_digit(10) {
                Some(column) => {
                    board.play_checked(column as usize)?;
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Plays the disk of the side to move, leaving the board untouched on error
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<GameState> {
        if self.state().is_over() {
            return Err(anyhow!("Invalid move, the game is over"));
        }
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if !self.add_disk(self.current, column) {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }
        self.current.alternate();
        self.game.push_str(&column_one_indexed.to_string());

        Ok(self.state())
    }

    /// The disk that plays next through `play_checked`
    pub fn current(&self) -> Disk {
        self.current
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn disk(&self, row: usize, column: usize) -> Disk {
        self.cells[column + WIDTH * row]
    }

    pub fn valid_move(&self, column: usize) -> bool {
        column < WIDTH && self.heights[column] < HEIGHT
    }

    /// Returns whether adding the disk was successful
    pub fn add_disk(&mut self, disk: Disk, column: usize) -> bool {
        if disk.is_empty() || !self.valid_move(column) {
            return false;
        }
        self.cells[column + WIDTH * self.heights[column]] = disk;
        self.heights[column] += 1;
        self.num_moves += 1;
        true
    }

    /// Removes the top disk of the column, if any
    pub fn pop_disk(&mut self, column: usize) {
        if self.heights[column] == 0 {
            return;
        }
        self.heights[column] -= 1;
        self.cells[column + WIDTH * self.heights[column]] = Disk::Empty;
        self.num_moves -= 1;
    }

    // whether the 3 cells beyond (row, column) along the direction match its disk
    fn line_from(&self, row: usize, column: usize, d_row: isize, d_column: isize) -> bool {
        let disk = self.disk(row, column);
        (1..4).all(|offset| {
            let r = row as isize + offset * d_row;
            let c = column as isize + offset * d_column;
            r >= 0
                && r < HEIGHT as isize
                && c >= 0
                && c < WIDTH as isize
                && self.disk(r as usize, c as usize) == disk
        })
    }

    /// Scans every cell for a four-in-a-row, returning the victory or `Incomplete`
    pub fn check_win(&self) -> GameState {
        for row in 0..HEIGHT {
            for column in 0..WIDTH {
                let disk = self.disk(row, column);
                if disk.is_empty() {
                    continue;
                }
                let won = [(1, 0), (0, 1), (1, -1), (1, 1)]
                    .iter()
                    .any(|&(d_row, d_column)| self.line_from(row, column, d_row, d_column));
                if won {
                    return match disk {
                        Disk::PlayerOne => GameState::FirstVictory,
                        _ => GameState::SecondVictory,
                    };
                }
            }
        }
        GameState::Incomplete
    }

    /// Whether the board is full, even if the last disk won
    pub fn check_tie(&self) -> bool {
        self.heights.iter().all(|&h| h == HEIGHT)
    }

    pub fn state(&self) -> GameState {
        match self.check_win() {
            GameState::Incomplete if self.check_tie() => GameState::Tie,
            state => state,
        }
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..HEIGHT {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (idx, cell) in self.cells.iter().enumerate() {
            let (pos_x, pos_y) = (
                origin_x + (idx % WIDTH) as u16,
                origin_y - (idx / WIDTH) as u16,
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style(match cell {
                        Disk::Empty => 'O',
                        disk => disk.to_char(),
                    })
                    .attribute(Attribute::Bold)
                    .on(Color::DarkBlue)
                    .with(match cell {
                        Disk::PlayerOne => Color::Red,
                        Disk::PlayerTwo => Color::Yellow,
                        Disk::Empty => Color::DarkBlue,
                    }),
                ))?;
        }
        stdout
            .queue(MoveTo(origin_x + WIDTH as u16, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for ArrayBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&BitBoard> for ArrayBoard {
    fn from(bitboard: &BitBoard) -> Self {
        let mut board = Self::new();
        for column in 0..WIDTH {
            for row in 0..bitboard.height(column) {
                board.add_disk(bitboard.disk(row, column), column);
            }
        }
        if board.num_moves % 2 == 1 {
            board.current = Disk::PlayerTwo;
        }
        board
    }
}

impl From<&ArrayBoard> for BitBoard {
    fn from(board: &ArrayBoard) -> Self {
        let mut bitboard = BitBoard::new();
        for column in 0..WIDTH {
            for row in 0..board.height(column) {
                bitboard.add_disk(board.disk(row, column), column);
            }
        }
        bitboard
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ArrayBoard::from(self), f)
    }
}

impl fmt::Display for ArrayBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            for column in 0..WIDTH {
                write!(f, "{}|", self.disk(row, column))?;
            }
            writeln!(f)?;
            writeln!(f, "{}", "--".repeat(WIDTH))?;
        }
        for column in 1..=WIDTH {
            write!(f, "{} ", column)?;
        }
        writeln!(f)
    }
}

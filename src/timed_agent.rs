use chrono::{DateTime, Local, TimeZone};

use std::fmt;
use std::time::{Duration, Instant};

use crate::{agent::ColumnChooser, bitboard::BitBoard, disk::Disk};

/// Wraps a [`ColumnChooser`], reporting how long every decision takes
pub struct TimedAgent<C> {
    inner: C,
    moves: u32,
    total_time: Duration,
    last_planned: Option<(DateTime<Local>, DateTime<Local>)>,
}

// weekday, month, space padded day, time and year, e.g. "Tue Mar  5 09:07:02 2024"
const CLOCK_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn clock_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format(CLOCK_FORMAT).to_string()
}

impl<C: ColumnChooser> TimedAgent<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            moves: 0,
            total_time: Duration::default(),
            last_planned: None,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// The number of moves timed so far
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Local start and finish time of the latest decision
    pub fn last_planned(&self) -> Option<(DateTime<Local>, DateTime<Local>)> {
        self.last_planned
    }

    /// Mean time taken per move in nanoseconds, 0 before the first move
    pub fn average_time(&self) -> f64 {
        if self.moves == 0 {
            return 0.0;
        }
        self.total_time.as_nanos() as f64 / self.moves as f64
    }
}

impl<C: ColumnChooser> ColumnChooser for TimedAgent<C> {
    fn pick_column(&mut self, board: &BitBoard, player: Disk) -> usize {
        let started_at = Local::now();
        println!("Started planning move for {} at: {}", player, clock_time(&started_at));
        let start = Instant::now();

        let column = self.inner.pick_column(board, player);

        let taken = start.elapsed();
        let finished_at = Local::now();
        self.moves += 1;
        self.total_time += taken;
        self.last_planned = Some((started_at, finished_at));
        println!(
            "Finished planning move at: {}, took {:.6} seconds",
            clock_time(&finished_at),
            taken.as_secs_f64()
        );
        column
    }
}

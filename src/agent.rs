//! A depth-limited negamax agent for picking columns

use log::debug;

use crate::{bitboard::BitBoard, disk::Disk, WIDTH};

/// Look-ahead used unless overridden with [`Agent::with_depth`]
pub const DEFAULT_DEPTH: usize = 10;
/// The minimum score of a position, also the score of having no legal move
pub const DEFAULT_ALPHA: i32 = -(1 << 30);
/// The maximum score of a position, given to an immediate win
pub const DEFAULT_BETA: i32 = 1 << 30;

/// Maps an index in `0..WIDTH` to a column alternating away from the center,
/// right of center first
pub const fn alternating_column(index: usize) -> usize {
    let offset = (index + 1) / 2;
    if index % 2 == 0 {
        WIDTH / 2 + offset
    } else {
        WIDTH / 2 - offset
    }
}

/// Returns the columns from the middle outwards, as the middle columns take part
/// in more lines and prune the search sooner
pub const fn move_order() -> [usize; WIDTH] {
    let mut move_order = [0; WIDTH];
    let mut i = 0;
    while i < WIDTH {
        move_order[i] = alternating_column(i);
        i += 1;
    }
    move_order
}

const MOVE_ORDER: [usize; WIDTH] = move_order();

/// Anything that picks a column for a player on a given board
pub trait ColumnChooser {
    /// Returns the 0-indexed column `player` should play on `board`
    fn pick_column(&mut self, board: &BitBoard, player: Disk) -> usize;
}

/// How an [`Agent`] arrived at its column
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Choice {
    /// The column wins immediately
    Win(usize),
    /// The column stops an immediate win of the opponent
    Block(usize),
    /// The column scored best in the tree search, with the score of every column
    /// (illegal columns score below [`DEFAULT_ALPHA`])
    Search { column: usize, scores: [i32; WIDTH] },
}

impl Choice {
    pub fn column(&self) -> usize {
        match *self {
            Choice::Win(column) | Choice::Block(column) => column,
            Choice::Search { column, .. } => column,
        }
    }
}

/// An agent playing one side of a board
///
/// # Position Scoring
/// Positions are scored from the point of view of the player about to move. An
/// immediate win scores [`DEFAULT_BETA`]. At the search horizon the score is the
/// difference of both players' [`BitBoard::adjacency_score`]. Every ply on the way back
/// up the tree negates the child's score and adds one, so among equal outcomes the
/// nearer win (or the farther loss) is preferred.
///
/// # Notes
/// The board is probed in place while searching and is always restored before any
/// method returns.
#[derive(Clone, Debug)]
pub struct Agent {
    board: BitBoard,
    player: Disk,
    depth: usize,
    verbose: bool,

    /// The number of positions evaluated by this `Agent` so far (for diagnostics only)
    pub node_count: usize,
}

impl Agent {
    /// Creates an `Agent` playing `player` on `board`, searching [`DEFAULT_DEPTH`] plies
    pub fn new(board: BitBoard, player: Disk) -> Self {
        Self {
            board,
            player,
            depth: DEFAULT_DEPTH,
            verbose: false,
            node_count: 0,
        }
    }

    /// Sets the look-ahead of the top-level search, at least 1
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// Makes [`ColumnChooser::pick_column`] print the column scores to stdout
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn set_board(&mut self, board: BitBoard) {
        self.board = board;
    }

    pub fn set_player(&mut self, player: Disk) {
        self.player = player;
    }

    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    pub fn player(&self) -> Disk {
        self.player
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the columns where the agent's player wins immediately, in ascending order
    pub fn current_winning_moves(&mut self) -> Vec<usize> {
        winning_moves(&mut self.board, self.player)
    }

    /// Scores the position for the agent's player before their move
    ///
    /// See [Position Scoring]. `depth` is the number of moves to look ahead after the
    /// player's move; the search is cut off once `alpha >= beta`.
    ///
    /// [Position Scoring]: #position-scoring
    pub fn evaluate_position(&mut self, depth: usize, alpha: i32, beta: i32) -> i32 {
        negamax(
            &mut self.board,
            &mut self.node_count,
            self.player,
            depth,
            alpha,
            beta,
        )
    }

    /// Decides on a column: an immediate win, a block of the opponent's
    /// immediate win, or else the best scoring column of the tree search
    pub fn choose(&mut self) -> Choice {
        if let Some(&column) = self.current_winning_moves().first() {
            debug!("{:?} wins in column {}", self.player, column);
            return Choice::Win(column);
        }
        // only the first threat is blocked, a second one cannot be stopped anyway
        let opponent = self.player.counterpart();
        if let Some(&column) = winning_moves(&mut self.board, opponent).first() {
            debug!("{:?} blocks column {}", self.player, column);
            return Choice::Block(column);
        }

        let nodes_before = self.node_count;
        let mut best_column = WIDTH / 2;
        // alpha carries over between the top-level columns
        let mut alpha = DEFAULT_ALPHA;
        let mut scores = [DEFAULT_ALPHA - 1; WIDTH];
        for &column in MOVE_ORDER.iter() {
            if let Some(score) = score_after_move(
                &mut self.board,
                &mut self.node_count,
                self.player,
                column,
                &mut alpha,
                DEFAULT_BETA,
                self.depth,
            ) {
                scores[column] = score;
                if score > scores[best_column] {
                    best_column = column;
                }
            }
        }
        debug!(
            "{:?} searched {} positions at depth {}, scores {:?}, best column {}",
            self.player,
            self.node_count - nodes_before,
            self.depth,
            scores,
            best_column
        );

        Choice::Search {
            column: best_column,
            scores,
        }
    }

    /// Returns the 0-indexed column to play
    pub fn choose_column(&mut self) -> usize {
        self.choose().column()
    }

    /// Returns the 0-indexed column to play, printing the column scores to stdout
    /// when the tree search was needed
    pub fn choose_column_verbose(&mut self) -> usize {
        let choice = self.choose();
        if let Choice::Search { scores, .. } = choice {
            let scores: Vec<String> = scores.iter().map(|s| s.to_string()).collect();
            println!("scores: {}", scores.join(" "));
        }
        choice.column()
    }
}

impl ColumnChooser for Agent {
    fn pick_column(&mut self, board: &BitBoard, player: Disk) -> usize {
        self.board = *board;
        self.player = player;
        if self.verbose {
            self.choose_column_verbose()
        } else {
            self.choose_column()
        }
    }
}

/// Columns where `player` wins immediately, probing each and undoing it
fn winning_moves(board: &mut BitBoard, player: Disk) -> Vec<usize> {
    (0..WIDTH)
        .filter(|&column| {
            board
                .probe(player, column)
                .map_or(false, |next| player.is_victory(next.check_win()))
        })
        .collect()
}

fn has_winning_move(board: &mut BitBoard, player: Disk) -> bool {
    (0..WIDTH).any(|column| {
        board
            .probe(player, column)
            .map_or(false, |next| player.is_victory(next.check_win()))
    })
}

/// Scores the position for `player` before their move
fn negamax(
    board: &mut BitBoard,
    node_count: &mut usize,
    player: Disk,
    depth: usize,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    *node_count += 1;

    // a win on this move beats anything deeper in the tree
    if has_winning_move(board, player) {
        return DEFAULT_BETA;
    }

    if depth == 0 {
        return board.heuristic(player);
    }

    // stays at the minimum if there is no legal move
    let mut score = DEFAULT_ALPHA;
    for &column in MOVE_ORDER.iter() {
        if alpha >= beta {
            break;
        }
        if let Some(child_score) =
            score_after_move(board, node_count, player, column, &mut alpha, beta, depth)
        {
            score = score.max(child_score);
        }
    }
    score
}

/// Scores `player` dropping a disk in `column`, raising `alpha` to the score if it is
/// higher. Returns `None` for an illegal column.
fn score_after_move(
    board: &mut BitBoard,
    node_count: &mut usize,
    player: Disk,
    column: usize,
    alpha: &mut i32,
    beta: i32,
    depth: usize,
) -> Option<i32> {
    let mut next = board.probe(player, column)?;
    // the opponent's window is flipped, one off to account for the tempo bonus
    let opponent_score = negamax(
        &mut next,
        node_count,
        player.counterpart(),
        depth - 1,
        -beta,
        1 - *alpha,
    );
    let score = 1 - opponent_score;
    if score > *alpha {
        *alpha = score;
    }
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anyhow::Result;

    #[test]
    fn columns_alternate_from_center() {
        assert_eq!(move_order(), [4, 3, 5, 2, 6, 1, 7, 0]);
        assert_eq!(alternating_column(0), 4);
        assert_eq!(alternating_column(7), 0);
    }

    #[test]
    fn winning_moves_restore_board() -> Result<()> {
        let board = BitBoard::from_moves("334455")?;
        let mut agent = Agent::new(board, Disk::PlayerOne);
        assert_eq!(agent.current_winning_moves(), vec![1, 5]);
        assert_eq!(*agent.board(), board);

        // PlayerTwo's row sits one above, so its ends are not playable yet
        agent.set_player(Disk::PlayerTwo);
        assert!(agent.current_winning_moves().is_empty());
        assert_eq!(*agent.board(), board);
        Ok(())
    }

    #[test]
    fn vertical_three_wins_on_top() -> Result<()> {
        let board = BitBoard::from_moves("37383")?;
        let mut agent = Agent::new(board, Disk::PlayerOne);
        assert_eq!(agent.current_winning_moves(), vec![2]);
        agent.set_player(Disk::PlayerTwo);
        assert!(agent.current_winning_moves().is_empty());
        Ok(())
    }

    #[test]
    fn immediate_win_scores_beta() -> Result<()> {
        let mut agent = Agent::new(BitBoard::from_moves("37383")?, Disk::PlayerOne);
        assert_eq!(
            agent.evaluate_position(DEFAULT_DEPTH, DEFAULT_ALPHA, DEFAULT_BETA),
            DEFAULT_BETA
        );
        assert_eq!(agent.node_count, 1);
        Ok(())
    }

    #[test]
    fn horizon_uses_adjacency_difference() -> Result<()> {
        let mut agent = Agent::new(BitBoard::from_moves("445")?, Disk::PlayerTwo);
        assert_eq!(agent.evaluate_position(0, DEFAULT_ALPHA, DEFAULT_BETA), -1);
        agent.set_board(BitBoard::from_moves("4455")?);
        agent.set_player(Disk::PlayerOne);
        assert_eq!(agent.evaluate_position(0, DEFAULT_ALPHA, DEFAULT_BETA), 0);
        Ok(())
    }

    #[test]
    fn full_board_scores_alpha_floor() {
        let mut board = BitBoard::new();
        for row in 0..crate::HEIGHT {
            for column in 0..WIDTH {
                let disk = if (column / 2 + row) % 2 == 0 {
                    Disk::PlayerOne
                } else {
                    Disk::PlayerTwo
                };
                board.add_disk(disk, column);
            }
        }
        let mut agent = Agent::new(board, Disk::PlayerOne);
        assert_eq!(agent.evaluate_position(3, DEFAULT_ALPHA, DEFAULT_BETA), DEFAULT_ALPHA);
        assert_eq!(agent.evaluate_position(0, DEFAULT_ALPHA, DEFAULT_BETA), 0);
    }

    #[test]
    fn choose_takes_lowest_win_without_search() -> Result<()> {
        let mut agent = Agent::new(BitBoard::from_moves("334455")?, Disk::PlayerOne);
        assert_eq!(agent.choose(), Choice::Win(1));
        assert_eq!(agent.node_count, 0);
        Ok(())
    }

    #[test]
    fn choose_blocks_opponent() -> Result<()> {
        let board = BitBoard::from_moves("18283")?;
        let mut agent = Agent::new(board, Disk::PlayerTwo);
        assert_eq!(agent.choose(), Choice::Block(3));
        assert_eq!(agent.player(), Disk::PlayerTwo);
        assert_eq!(*agent.board(), board);
        Ok(())
    }

    #[test]
    fn choose_blocks_only_first_threat() -> Result<()> {
        let mut agent = Agent::new(BitBoard::from_moves("38485")?, Disk::PlayerTwo);
        assert_eq!(agent.choose_column(), 1);
        Ok(())
    }

    #[test]
    fn full_column_is_never_chosen() -> Result<()> {
        let board = BitBoard::from_moves("55555555")?;
        let mut agent = Agent::new(board, Disk::PlayerOne).with_depth(2);
        assert_eq!(
            agent.choose(),
            Choice::Search {
                column: 3,
                scores: [-1, -1, -1, 0, DEFAULT_ALPHA - 1, 0, -1, -1],
            }
        );
        assert_eq!(*agent.board(), board);

        let mut agent = agent.with_depth(3);
        assert_eq!(agent.choose_column(), 3);
        Ok(())
    }

    #[test]
    fn empty_board_plays_center() {
        for depth in 1..=5 {
            let mut agent = Agent::new(BitBoard::new(), Disk::PlayerOne).with_depth(depth);
            assert_eq!(agent.choose_column(), 4);
            assert_eq!(*agent.board(), BitBoard::new());
            assert!(agent.node_count > 0);
        }
    }

    #[test]
    fn depth_is_at_least_one() {
        let agent = Agent::new(BitBoard::new(), Disk::PlayerOne).with_depth(0);
        assert_eq!(agent.depth(), 1);
    }

    #[test]
    fn pick_column_rebinds_board_and_player() -> Result<()> {
        let mut agent = Agent::new(BitBoard::new(), Disk::PlayerOne).with_depth(2);
        let board = BitBoard::from_moves("18283")?;
        assert_eq!(agent.pick_column(&board, Disk::PlayerTwo), 3);
        assert_eq!(agent.player(), Disk::PlayerTwo);
        assert_eq!(*agent.board(), board);
        Ok(())
    }
}

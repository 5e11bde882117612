#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use proptest::prelude::*;

    use crate::agent::{Agent, ColumnChooser, DEFAULT_ALPHA, DEFAULT_BETA};
    use crate::{ArrayBoard, BitBoard, Disk, GameState, TimedAgent, HEIGHT, WIDTH};

    // cell by cell scan for four in a line, independent of the packed layout
    fn naive_has_four(mask: u64) -> bool {
        let occupied = |row: isize, column: isize| {
            row >= 0
                && row < HEIGHT as isize
                && column >= 0
                && column < WIDTH as isize
                && mask & (1 << (row as usize * WIDTH + column as usize)) != 0
        };
        for row in 0..HEIGHT as isize {
            for column in 0..WIDTH as isize {
                for &(d_row, d_column) in [(0, 1), (1, 0), (1, 1), (1, -1)].iter() {
                    if (0..4).all(|i| occupied(row + i * d_row, column + i * d_column)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    // plays the columns in turn, skipping full ones and stopping once someone has won
    fn board_from_columns(columns: &[usize]) -> (BitBoard, Disk) {
        let mut board = BitBoard::new();
        let mut disk = Disk::PlayerOne;
        for &column in columns {
            if board.check_win() != GameState::Incomplete {
                break;
            }
            if board.add_disk(disk, column) {
                disk.alternate();
            }
        }
        (board, disk)
    }

    fn column_count(board: &BitBoard, column: usize) -> usize {
        let column_mask = (0..HEIGHT).fold(0u64, |mask, row| mask | 1 << (row * WIDTH + column));
        let occupied = board.locations(Disk::PlayerOne) | board.locations(Disk::PlayerTwo);
        (occupied & column_mask).count_ones() as usize
    }

    proptest! {
        #[test]
        fn add_then_pop_restores(columns in prop::collection::vec(0..WIDTH, 0..48)) {
            let (mut board, _) = board_from_columns(&columns);
            let before = board;
            for column in 0..WIDTH {
                for &disk in [Disk::PlayerOne, Disk::PlayerTwo].iter() {
                    if board.add_disk(disk, column) {
                        board.pop_disk(disk, column);
                    }
                    prop_assert_eq!(board, before);
                }
            }
        }

        #[test]
        fn heights_match_occupancy(columns in prop::collection::vec(0..WIDTH, 0..80)) {
            let (board, _) = board_from_columns(&columns);
            prop_assert_eq!(board.locations(Disk::PlayerOne) & board.locations(Disk::PlayerTwo), 0);
            for column in 0..WIDTH {
                prop_assert!(board.height(column) <= HEIGHT);
                prop_assert_eq!(column_count(&board, column), board.height(column));
            }
            prop_assert_eq!(BitBoard::from(&ArrayBoard::from(&board)), board);
        }

        #[test]
        fn packed_win_matches_scan(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
            // roughly one cell in eight is set
            let mask = a & b & c;
            prop_assert_eq!(BitBoard::is_winning_mask(mask), naive_has_four(mask));
        }

        #[test]
        fn winning_moves_leave_board_untouched(columns in prop::collection::vec(0..WIDTH, 0..40)) {
            let (board, _) = board_from_columns(&columns);
            for &disk in [Disk::PlayerOne, Disk::PlayerTwo].iter() {
                let mut agent = Agent::new(board, disk);
                let moves = agent.current_winning_moves();
                prop_assert_eq!(*agent.board(), board);
                prop_assert!(moves.windows(2).all(|w| w[0] < w[1]));
                for &column in moves.iter() {
                    let mut next = board;
                    prop_assert!(next.add_disk(disk, column));
                    prop_assert!(disk.is_victory(next.check_win()));
                }
            }
        }

        #[test]
        fn search_leaves_board_untouched(columns in prop::collection::vec(0..WIDTH, 0..30)) {
            let (board, disk) = board_from_columns(&columns);
            prop_assume!(board.state() == GameState::Incomplete);
            let mut agent = Agent::new(board, disk).with_depth(2);
            let score = agent.evaluate_position(2, DEFAULT_ALPHA, DEFAULT_BETA);
            prop_assert!(score >= DEFAULT_ALPHA && score <= DEFAULT_BETA);
            prop_assert_eq!(*agent.board(), board);
            let column = agent.choose_column();
            prop_assert!(board.valid_move(column));
            prop_assert_eq!(*agent.board(), board);
        }
    }

    #[test]
    pub fn exhaustive_lines_match_scan() {
        // every subset of a 4x4 window, at three corners of the board
        for &(row_offset, column_offset) in [(0, 0), (0, WIDTH - 4), (HEIGHT - 4, WIDTH - 4)].iter() {
            for subset in 0u32..1 << 16 {
                let mut mask = 0u64;
                for bit in 0..16 {
                    if subset & (1 << bit) != 0 {
                        let (row, column) = (row_offset + bit / 4, column_offset + bit % 4);
                        mask |= 1 << (row * WIDTH + column);
                    }
                }
                assert_eq!(BitBoard::is_winning_mask(mask), naive_has_four(mask));
            }
        }
    }

    #[test]
    pub fn self_play_stays_consistent() -> Result<()> {
        let mut board = ArrayBoard::new();
        let mut agent = TimedAgent::new(Agent::new(BitBoard::new(), Disk::PlayerOne).with_depth(2));

        while board.state() == GameState::Incomplete {
            let bitboard = BitBoard::from(&board);
            assert_eq!(bitboard.state(), board.state());
            let column = agent.pick_column(&bitboard, board.current());
            board.play_checked(column + 1)?;
            assert_eq!(BitBoard::from(&board).state(), board.state());
            if board.num_moves() > WIDTH * HEIGHT {
                return Err(anyhow!("game did not finish: {}", board.game));
            }
        }
        assert_eq!(agent.moves() as usize, board.num_moves());
        assert_eq!(BitBoard::from_moves(&board.game)?.state(), board.state());
        Ok(())
    }

    #[test]
    pub fn takes_win_over_block() -> Result<()> {
        // PlayerOne has three on the bottom row, PlayerTwo three in column 5, PlayerOne to move
        let board = BitBoard::from_moves("152535")?;
        let mut agent = Agent::new(board, Disk::PlayerTwo);
        assert_eq!(agent.current_winning_moves(), vec![4]);

        agent.set_player(Disk::PlayerOne);
        assert_eq!(agent.current_winning_moves(), vec![3]);
        assert_eq!(agent.choose_column(), 3);
        assert_eq!(agent.node_count, 0);
        Ok(())
    }

    #[test]
    pub fn agent_blocks_vertical_threat() -> Result<()> {
        let mut board = ArrayBoard::from_moves("37383")?;
        let mut agent = Agent::new(BitBoard::new(), Disk::PlayerOne).with_depth(3);
        // PlayerTwo to move must block the column
        let column = agent.pick_column(&BitBoard::from(&board), board.current());
        assert_eq!(column, 2);
        board.play_checked(column + 1)?;
        assert_eq!(board.state(), GameState::Incomplete);
        Ok(())
    }
}

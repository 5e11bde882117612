use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use std::fs::File;
use std::io::{stdin, stdout, BufWriter, Stdin, Write};
use std::path::{Path, PathBuf};

use four_in_a_row::{agent::DEFAULT_DEPTH, *};

/// Play four-in-a-row on an 8x8 board against the computer
#[derive(Parser)]
#[command(name = "four_in_a_row_cli", about = "Play four-in-a-row against the computer")]
struct Cli {
    /// Disk to play as: X (moves first) or O. Asked for when missing
    #[arg(long)]
    player: Option<Disk>,

    /// Number of moves the computer looks ahead
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Let the computer play both sides
    #[arg(long)]
    self_play: bool,

    /// File the human's column choices are written to when the game ends
    #[arg(long, default_value = "inputs")]
    log: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let stdin = stdin();

    println!("Welcome to four-in-a-row!\n");

    let human = if cli.self_play {
        None
    } else {
        let disk = match cli.player {
            Some(disk) => disk,
            None => ask_player(&stdin)?,
        };
        println!("You've selected to play as {}. Begin!", disk);
        Some(disk)
    };
    info!("computer searching {} moves ahead", cli.depth);

    let mut agent = TimedAgent::new(
        Agent::new(BitBoard::new(), Disk::PlayerTwo)
            .with_depth(cli.depth)
            .with_verbose(true),
    );
    let mut board = ArrayBoard::new();
    // columns entered by the human, 1-indexed
    let mut inputs = Vec::new();

    // game loop
    loop {
        board.display()?;

        let current = board.current();
        let column = if Some(current) == human {
            println!("The current disk is: {}", current);
            match read_column(&stdin)? {
                Some(column) => column,
                // stdin closed
                None => break,
            }
        } else {
            let spinner = thinking_spinner();
            let column = agent.pick_column(&BitBoard::from(&board), current);
            spinner.finish_and_clear();
            column + 1
        };

        let state = match board.play_checked(column) {
            Ok(state) => state,
            Err(err) => {
                println!("{}", err);
                // try the move again
                continue;
            }
        };
        if Some(current) == human {
            inputs.push(column);
        }
        println!("Chosen column: {}\n", column);

        let winner = match state {
            GameState::Incomplete => continue,
            GameState::Tie => {
                board.display()?;
                println!("The game is a tie!");
                break;
            }
            GameState::FirstVictory => Disk::PlayerOne,
            GameState::SecondVictory => Disk::PlayerTwo,
        };
        board.display()?;
        match winner {
            Disk::PlayerOne => println!("Player 1 (X) wins!"),
            _ => println!("Player 2 (O) wins!"),
        }
        match human {
            Some(disk) if disk == winner => println!("You win!"),
            Some(_) => println!("You lose!"),
            None => {}
        }
        break;
    }

    println!("Average time taken: {:.0} ns", agent.average_time());
    write_inputs(&cli.log, &inputs)?;
    Ok(())
}

fn ask_player(stdin: &Stdin) -> Result<Disk> {
    loop {
        print!("Please choose either X or O to play as: ");
        stdout().flush()?;

        let mut buffer = String::new();
        if stdin.read_line(&mut buffer)? == 0 {
            return Err(anyhow!("no disk chosen before input ended"));
        }
        match buffer.parse::<Disk>() {
            Ok(disk) => return Ok(disk),
            Err(_) => println!("Unknown answer given"),
        }
    }
}

/// Reads a 1-indexed column, `None` once stdin is closed
fn read_column(stdin: &Stdin) -> Result<Option<usize>> {
    loop {
        print!("Enter a column from 1 to {}: ", WIDTH);
        stdout().flush()?;

        let mut input_str = String::new();
        if stdin.read_line(&mut input_str)? == 0 {
            return Ok(None);
        }
        match input_str.trim().parse::<usize>() {
            Ok(column) => return Ok(Some(column)),
            Err(_) => println!("Invalid column. Please try again"),
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}"));
    spinner.set_message("AI is thinking...");
    spinner.enable_steady_tick(100);
    spinner
}

fn write_inputs(path: &Path, inputs: &[usize]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create move log {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for column in inputs {
        writeln!(writer, "{}", column)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write move log {}", path.display()))?;
    Ok(())
}

//! Sphergo command line front end.
//!
//! ## Usage
//!
//! - `sphergo` - Show a demo game
//! - `sphergo demo` - Same as above
//! - `sphergo selfplay --moves 20 --seed 1` - AI vs AI for N moves

use anyhow::Result;
use clap::{Parser, Subcommand};

use sphergo::board::{Board, Color};
use sphergo::game::{Game, PlayerKind};
use sphergo::search::Searcher;
use sphergo::topology::topology;

/// A Go-like capture game on a spherical 302-cell board
#[derive(Parser)]
#[command(name = "sphergo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short showcase of the rules engine and the searcher
    Demo,
    /// Let the machine play both sides
    Selfplay {
        /// Number of moves to play
        #[arg(long, default_value_t = 20)]
        moves: usize,
        /// Seed for the move searcher
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Selfplay { moves, seed }) => run_selfplay(moves, seed),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_demo() -> Result<()> {
    println!("Sphergo: territorial capture on a spherical board\n");

    println!("=== Rules Demo ===");
    let mut board = Board::new();
    board.play(0, Color::Black)?;
    board.switch_player();
    let reply = topology().decode(&[30, 31]).expect("edge cell");
    board.play(reply, Color::White)?;
    board.switch_player();
    println!("{board}");

    println!("\n=== Search Demo ===");
    let mut searcher = Searcher::new();
    if let Some(point) = searcher.select_move(&board) {
        println!(
            "Suggested continuation for black: {point} (label {:?})",
            topology().label(point)
        );
    }
    Ok(())
}

fn run_selfplay(moves: usize, seed: Option<u64>) -> Result<()> {
    let mut game = match seed {
        Some(seed) => Game::with_seed(PlayerKind::Human, PlayerKind::Human, seed),
        None => Game::new(PlayerKind::Human, PlayerKind::Human),
    };
    game.start();

    // Both seats stay nominally human so the move budget is enforced
    // here; the searcher supplies every placement.
    let mut searcher = match seed {
        Some(seed) => Searcher::with_seed(seed),
        None => Searcher::new(),
    };
    for turn in 0..moves {
        if game.is_finished() {
            break;
        }
        let side = game.board().current_player();
        let Some(point) = searcher.select_move(game.board()) else {
            break;
        };
        game.play(point)?;
        println!(
            "{:>3}. {side} plays {point} (label {:?})",
            turn + 1,
            topology().label(point)
        );
    }

    let score = game.result();
    println!(
        "\nafter {} moves: black {:.4}, white {:.4}, unclaimed {:.4}",
        game.board().counter(),
        score.black,
        score.white,
        score.unclaimed
    );
    Ok(())
}

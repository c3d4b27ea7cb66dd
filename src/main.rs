use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::Parser;
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use slide_2048::engine::Move;
use slide_2048::session::{Game, MoveResult};

#[derive(Parser, Debug)]
#[command(name = "slide-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// Seed for tile spawns; omit for a random game
    #[arg(long)]
    seed: Option<u64>,

    /// Directions to play non-interactively, e.g. "left,up,right" or "l u r d"
    #[arg(long, value_name = "SCRIPT")]
    moves: Option<String>,

    /// Print observations as JSON lines instead of the grid table
    #[arg(long)]
    json: bool,

    /// URL appended to the share message at game over
    #[arg(long, default_value = "https://example.com/2048")]
    share_url: String,

    /// Only print the final observation
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(&mut rng);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.quiet {
        emit(&game, args.json, &mut out)?;
    }

    match &args.moves {
        Some(script) => {
            // parse everything before playing anything
            let dirs = parse_script(script)?;
            for dir in dirs {
                if step(&mut game, dir, &mut rng, &args, &mut out)? {
                    break;
                }
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line?;
                let cmd = line.trim();
                if cmd.eq_ignore_ascii_case("q") || cmd.eq_ignore_ascii_case("quit") {
                    break;
                }
                match cmd.parse::<Move>() {
                    Ok(dir) => {
                        if step(&mut game, dir, &mut rng, &args, &mut out)? {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}; try up/down/left/right, wasd or hjkl"),
                }
            }
        }
    }

    if args.quiet {
        emit(&game, args.json, &mut out)?;
    }
    if game.is_game_over() {
        writeln!(out, "{}", game.share_text(&args.share_url))?;
    }
    info!("finished: {} moves, score {}", game.moves(), game.score());
    Ok(())
}

fn parse_script(script: &str) -> Result<Vec<Move>, Box<dyn Error>> {
    let mut dirs = Vec::new();
    for token in script.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        dirs.push(token.parse::<Move>()?);
    }
    Ok(dirs)
}

/// Apply one direction and print the observation. Returns true once the game is over.
fn step(
    game: &mut Game,
    dir: Move,
    rng: &mut StdRng,
    args: &Args,
    out: &mut impl Write,
) -> Result<bool, Box<dyn Error>> {
    match game.apply_move(dir, rng) {
        MoveResult::Moved { .. } => {
            if !args.quiet {
                emit(game, args.json, out)?;
            }
        }
        MoveResult::Unchanged => info!("{dir} does not change the grid"),
        MoveResult::GameOver => {}
    }
    Ok(game.is_game_over())
}

fn emit(game: &Game, json: bool, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    if json {
        serde_json::to_writer(&mut *out, &game.snapshot())?;
        writeln!(out)?;
    } else {
        write!(out, "{}", game.grid())?;
        writeln!(out, "Score: {}", game.score())?;
        if game.is_game_over() {
            writeln!(out, "Game over")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

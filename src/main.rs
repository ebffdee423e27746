use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merge_2048::command::{Command, Handled};
use merge_2048::session::GameSession;
use merge_2048::spawn::RngSpawner;

#[derive(Parser, Debug)]
#[command(name = "merge-2048", version, about = "Play 4x4 sliding-tile merge in the terminal")]
struct Args {
    /// Seed for tile spawns (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Tracing filter, e.g. "info", "merge_2048=debug"
    #[arg(long, default_value = "warn")]
    log: String,
    /// Print each state as one JSON line instead of a grid
    #[arg(long)]
    json: bool,
}

const HELP: &str = "moves: w/a/s/d, h/j/k/l or up/down/left/right | u: undo | r: restart | q: quit";

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let spawner = match args.seed {
        Some(seed) => RngSpawner::seeded(seed),
        None => RngSpawner::from_entropy(),
    };
    let mut game = GameSession::new(spawner);
    info!(seed = ?args.seed, "new session");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !args.json {
        writeln!(out, "{HELP}")?;
    }
    render(&mut out, &game, args.json)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read command from stdin")?;
        let cmd = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!(error = %e, "ignored input");
                if !args.json {
                    writeln!(out, "{e} ({HELP})")?;
                }
                continue;
            }
        };
        match game.handle(cmd) {
            Handled::Quit => break,
            Handled::Updated => render(&mut out, &game, args.json)?,
            Handled::Ignored => {}
        }
    }
    info!(score = game.score(), high_score = game.high_score(), "session ended");
    Ok(())
}

fn render<W: Write>(out: &mut W, game: &GameSession, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &game.view()).context("failed to encode state")?;
        writeln!(out)?;
    } else {
        writeln!(out, "Score: {}  High Score: {}", game.score(), game.high_score())?;
        write!(out, "{}", game.board())?;
        if game.is_over() {
            writeln!(out, "Game Over! (r to restart, u to undo)")?;
        }
        writeln!(out)?;
    }
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

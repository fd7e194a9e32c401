//! explore - build (or resume) the breadth-first tree of an endgame and analyze it.
//!
//! ```bash
//! cargo run --release --bin explore -- --fen "4k3/8/8/8/8/8/4Q3/4K3 w" --depth 6
//! cargo run --release --bin explore -- --depth 8 --checkpoint-minutes 5 --json report.json
//! ```
//!
//! Ctrl-C writes a checkpoint and exits; rerunning the same command resumes.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::{info, warn};

use endgame_explorer::chess::EndgameOracle;
use endgame_explorer::explore::{CancelToken, ExploreConfig};
use endgame_explorer::retro::report;
use endgame_explorer::store::SqliteStore;
use endgame_explorer::worker::{spawn_exploration, WorkerEvent};
use endgame_explorer::SearchError;

#[derive(Parser)]
#[command(
    name = "explore",
    version,
    about = "Explore an endgame breadth-first with checkpoints, then run the retrograde analysis"
)]
struct Cli {
    /// Root position (FEN; move counters optional)
    #[arg(long, default_value = "4k3/8/8/8/8/8/4Q3/4K3 w")]
    fen: String,

    /// Target depth in plies
    #[arg(short, long)]
    depth: Option<u32>,

    /// Checkpoint database
    #[arg(long, default_value = "chess_tree.db")]
    db: PathBuf,

    /// Discard any stored exploration and start over
    #[arg(long)]
    fresh: bool,

    /// Checkpoint inside a depth every this many examined moves
    #[arg(long)]
    checkpoint_moves: Option<u64>,

    /// Checkpoint inside a depth every this many minutes
    #[arg(long)]
    checkpoint_minutes: Option<u64>,

    /// JSON file with an ExploreConfig; explicit flags win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the analysis as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<ExploreConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ExploreConfig::default(),
    };
    if let Some(depth) = cli.depth {
        config.target_depth = depth;
    }
    if cli.fresh {
        config.resume = false;
    }
    if let Some(moves) = cli.checkpoint_moves {
        config.checkpoint.every_moves = Some(moves);
    }
    if let Some(minutes) = cli.checkpoint_minutes {
        config.checkpoint.every_interval_secs = Some(minutes.saturating_mul(60));
    }
    Ok(config)
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let oracle = EndgameOracle::new();
    let root = oracle
        .parse_fen(&cli.fen)
        .with_context(|| format!("invalid root position {:?}", cli.fen))?;
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open checkpoint database {}", cli.db.display()))?;

    info!(
        "exploring {} to depth {} (db {}, resume {})",
        cli.fen,
        config.target_depth,
        cli.db.display(),
        config.resume
    );

    let handle = spawn_exploration(oracle, store, root, config, CancelToken::new());
    let on_interrupt = handle.cancel_token();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted! Writing a checkpoint...");
        on_interrupt.cancel();
    })
    .context("Failed to set Ctrl-C handler")?;

    let mut outcome = None;
    for event in handle.events().iter() {
        match event {
            WorkerEvent::Progress(_) | WorkerEvent::Checkpointed { .. } => {}
            WorkerEvent::DepthCompleted {
                depth,
                positions_at_depth,
                stats,
            } => {
                println!(
                    "depth {depth}: {positions_at_depth} new positions ({} total, {} moves)",
                    stats.positions, stats.moves_examined
                );
            }
            WorkerEvent::Finished(output) => {
                outcome = Some(Ok(output));
                break;
            }
            WorkerEvent::Failed(err) => {
                outcome = Some(Err(err));
                break;
            }
        }
    }
    if handle.join().is_none() {
        bail!("exploration worker panicked");
    }

    match outcome {
        Some(Ok(output)) => {
            println!("\n{}", report::render(&output.analysis));
            if let Some(path) = &cli.json {
                let json = serde_json::to_string_pretty(&output.analysis)?;
                fs::write(path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("analysis written to {}", path.display());
            }
            Ok(())
        }
        Some(Err(SearchError::Cancelled {
            last_completed_depth,
        })) => {
            warn!("cancelled after depth {last_completed_depth}; rerun to resume");
            Ok(())
        }
        Some(Err(err)) => Err(err).context("exploration failed"),
        None => bail!("worker exited without a result"),
    }
}

//! analyze - run the retrograde analysis over a stored exploration.
//!
//! ```bash
//! cargo run --release --bin analyze -- --db chess_tree.db --json report.json
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::{info, warn};

use endgame_explorer::chess::EndgameOracle;
use endgame_explorer::retro::{analyze, report};
use endgame_explorer::store::{CheckpointStore, SqliteStore};

#[derive(Parser)]
#[command(name = "analyze", version, about = "Retrograde analysis of a stored exploration")]
struct Cli {
    /// Checkpoint database
    #[arg(long, default_value = "chess_tree.db")]
    db: PathBuf,

    /// Write the analysis as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();
    let cli = Cli::parse();

    if !cli.db.exists() {
        anyhow::bail!("database not found: {}", cli.db.display());
    }
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open {}", cli.db.display()))?;
    let (set, marker) = store.load_all().context("failed to load stored positions")?;
    let marker = marker.context("no progress recorded; nothing to analyze")?;

    if marker.last_completed_depth < marker.target_depth {
        warn!(
            "exploration stopped at depth {} of {}; analyzing what is stored",
            marker.last_completed_depth, marker.target_depth
        );
    }
    info!("loaded {} positions rooted at {}", set.len(), marker.root);

    let analysis = analyze(&EndgameOracle::new(), &set, &marker.root)?;
    println!("{}", report::render(&analysis));

    if let Some(path) = &cli.json {
        fs::write(path, serde_json::to_string_pretty(&analysis)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("analysis written to {}", path.display());
    }
    Ok(())
}

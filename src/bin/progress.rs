//! progress - show how far a stored exploration got.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};

use endgame_explorer::store::{CheckpointStore, SqliteStore};

#[derive(Parser)]
#[command(
    name = "progress",
    version,
    about = "Print the latest checkpoint of a stored exploration"
)]
struct Cli {
    /// Checkpoint database
    #[arg(long, default_value = "chess_tree.db")]
    db: PathBuf,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();
    let cli = Cli::parse();

    if !cli.db.exists() {
        println!("no database at {}", cli.db.display());
        return Ok(());
    }
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open {}", cli.db.display()))?;
    let stats = store.stats()?;

    println!("positions stored: {}", stats.positions);
    println!("edges stored:     {}", stats.edges);
    match stats.latest {
        Some(m) => {
            println!("root:             {}", m.root);
            println!(
                "depth:            {} of {}{}",
                m.last_completed_depth,
                m.target_depth,
                if m.frontier_cursor > 0 {
                    format!(" ({} frontier positions of the next depth done)", m.frontier_cursor)
                } else {
                    String::new()
                }
            );
            println!("moves examined:   {}", m.moves_examined);
            println!("last checkpoint:  {}", m.timestamp.to_rfc3339());
        }
        None => println!("no progress recorded"),
    }
    Ok(())
}

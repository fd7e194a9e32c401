//! SQLite-backed checkpoint store.
//!
//! Layout:
//! - `positions`: one row per identity (depth, arrival moves as JSON, terminal flags, snapshot)
//! - `edges`: one-ply `(parent, child)` pairs, including transpositions
//! - `progress`: append-only marker history; the highest `id` is current
//!
//! Every batch is a single transaction.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::oracle::Outcome;
use crate::position::{Position, PositionKey, PositionSet};
use crate::store::{
    assemble, CheckpointBatch, CheckpointStore, ProgressMarker, StoreError, StoreStats,
};

#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|error| StoreError::Io {
                stage: "store_open_create_dir",
                path: dir.display().to_string(),
                error,
            })?;
        }
        let conn = Connection::open(&path)?;
        let store = Self { path, conn };
        store.migrate()?;
        Ok(store)
    }

    /// A private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS positions (
              key TEXT PRIMARY KEY,
              seq INTEGER NOT NULL,
              depth INTEGER NOT NULL,
              moves TEXT NOT NULL,
              terminal_loss INTEGER NOT NULL,
              terminal_draw INTEGER NOT NULL,
              snapshot TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS edges (
              parent TEXT NOT NULL,
              child TEXT NOT NULL,
              seq INTEGER NOT NULL,
              PRIMARY KEY (parent, child)
            );

            CREATE TABLE IF NOT EXISTS progress (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              root TEXT NOT NULL,
              last_completed_depth INTEGER NOT NULL,
              target_depth INTEGER NOT NULL,
              moves_examined INTEGER NOT NULL,
              frontier_cursor INTEGER NOT NULL,
              timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_positions_seq ON positions(seq);
            CREATE INDEX IF NOT EXISTS idx_edges_seq ON edges(seq);
            "#,
        )?;
        Ok(())
    }
}

impl CheckpointStore for SqliteStore {
    fn upsert_batch(
        &mut self,
        batch: CheckpointBatch<'_>,
        marker: &ProgressMarker,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_pos = tx.prepare_cached(
                r#"
                INSERT OR IGNORE INTO positions(key,seq,depth,moves,terminal_loss,terminal_draw,snapshot)
                VALUES (?1,?2,?3,?4,?5,?6,?7)
                "#,
            )?;
            for (i, p) in batch.positions.iter().enumerate() {
                insert_pos.execute(params![
                    p.key.as_str(),
                    (batch.first_seq + i) as i64,
                    p.depth as i64,
                    serde_json::to_string(&p.moves)?,
                    p.is_terminal_loss(),
                    p.is_terminal_draw(),
                    p.snapshot,
                ])?;
            }

            let mut insert_edge = tx.prepare_cached(
                "INSERT OR IGNORE INTO edges(parent,child,seq) VALUES (?1,?2,?3)",
            )?;
            for (i, (parent, child)) in batch.edges.iter().enumerate() {
                insert_edge.execute(params![
                    parent.as_str(),
                    child.as_str(),
                    (batch.first_edge_seq + i) as i64
                ])?;
            }

            tx.execute(
                r#"
                INSERT INTO progress(root,last_completed_depth,target_depth,moves_examined,frontier_cursor,timestamp)
                VALUES (?1,?2,?3,?4,?5,?6)
                "#,
                params![
                    marker.root.as_str(),
                    marker.last_completed_depth as i64,
                    marker.target_depth as i64,
                    marker.moves_examined as i64,
                    marker.frontier_cursor as i64,
                    marker.timestamp.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        debug!(
            "checkpoint committed to {}: {} positions, {} edges",
            self.path.display(),
            batch.positions.len(),
            batch.edges.len()
        );
        Ok(())
    }

    fn load_all(&self) -> Result<(PositionSet, Option<ProgressMarker>), StoreError> {
        let marker = self.load_progress()?;

        let mut stmt = self.conn.prepare(
            "SELECT key,depth,moves,terminal_loss,terminal_draw,snapshot FROM positions ORDER BY seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut positions = Vec::new();
        for row in rows {
            let (key, depth, moves, loss, draw, snapshot) = row?;
            let outcome = match (loss, draw) {
                (false, false) => Outcome::Ongoing,
                (true, false) => Outcome::LossForMover,
                (false, true) => Outcome::Draw,
                (true, true) => {
                    return Err(StoreError::Corrupt {
                        reason: format!("position {key} is flagged both loss and draw"),
                    })
                }
            };
            positions.push(Position {
                key: PositionKey::new(key),
                depth: depth_from_sql(depth)?,
                moves: serde_json::from_str(&moves)?,
                outcome,
                snapshot,
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT parent,child FROM edges ORDER BY seq")?;
        let edges = stmt
            .query_map([], |row| {
                Ok((
                    PositionKey::new(row.get::<_, String>(0)?),
                    PositionKey::new(row.get::<_, String>(1)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let set = assemble(positions, edges)?;
        debug!("loaded {} positions from {}", set.len(), self.path.display());
        Ok((set, marker))
    }

    fn load_progress(&self) -> Result<Option<ProgressMarker>, StoreError> {
        let raw = self
            .conn
            .query_row(
                r#"
                SELECT root,last_completed_depth,target_depth,moves_examined,frontier_cursor,timestamp
                FROM progress ORDER BY id DESC LIMIT 1
                "#,
                [],
                marker_row,
            )
            .optional()?;
        raw.map(MarkerRow::into_marker).transpose()
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM positions", [])?;
        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM progress", [])?;
        tx.commit()?;
        debug!("cleared all checkpoint data in {}", self.path.display());
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let positions: i64 = self
            .conn
            .query_row("SELECT count(*) FROM positions", [], |r| r.get(0))?;
        let edges: i64 = self
            .conn
            .query_row("SELECT count(*) FROM edges", [], |r| r.get(0))?;
        Ok(StoreStats {
            positions: positions as u64,
            edges: edges as u64,
            latest: self.load_progress()?,
        })
    }
}

struct MarkerRow {
    root: String,
    last_completed_depth: i64,
    target_depth: i64,
    moves_examined: i64,
    frontier_cursor: i64,
    timestamp: String,
}

fn marker_row(row: &Row<'_>) -> rusqlite::Result<MarkerRow> {
    Ok(MarkerRow {
        root: row.get(0)?,
        last_completed_depth: row.get(1)?,
        target_depth: row.get(2)?,
        moves_examined: row.get(3)?,
        frontier_cursor: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

impl MarkerRow {
    fn into_marker(self) -> Result<ProgressMarker, StoreError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| StoreError::Corrupt {
                reason: format!("bad progress timestamp {:?}: {e}", self.timestamp),
            })?
            .with_timezone(&Utc);
        Ok(ProgressMarker {
            root: PositionKey::new(self.root),
            last_completed_depth: depth_from_sql(self.last_completed_depth)?,
            target_depth: depth_from_sql(self.target_depth)?,
            moves_examined: count_from_sql(self.moves_examined)?,
            frontier_cursor: count_from_sql(self.frontier_cursor)?,
            timestamp,
        })
    }
}

fn depth_from_sql(v: i64) -> Result<u32, StoreError> {
    u32::try_from(v).map_err(|_| StoreError::Corrupt {
        reason: format!("depth {v} out of range"),
    })
}

fn count_from_sql(v: i64) -> Result<u64, StoreError> {
    u64::try_from(v).map_err(|_| StoreError::Corrupt {
        reason: format!("counter {v} out of range"),
    })
}

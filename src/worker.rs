//! Background runner: one thread explores and then analyzes, reporting over a channel.
//!
//! The only state shared with the caller is the [`CancelToken`]; everything else flows one
//! way as [`WorkerEvent`]s.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::error::SearchError;
use crate::explore::{
    CancelToken, CheckpointReason, ExploreConfig, ExploreEvent, ExploreObserver, ExploreStats,
    TreeBuilder,
};
use crate::oracle::RuleOracle;
use crate::position::PositionSet;
use crate::retro::{self, Analysis};
use crate::store::CheckpointStore;

/// Messages from the worker thread to its owner.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(ExploreStats),
    DepthCompleted {
        depth: u32,
        positions_at_depth: usize,
        stats: ExploreStats,
    },
    Checkpointed {
        reason: CheckpointReason,
        last_completed_depth: u32,
        frontier_cursor: u64,
    },
    /// Exploration and analysis both succeeded.
    Finished(Box<WorkerOutput>),
    Failed(SearchError),
}

#[derive(Debug)]
pub struct WorkerOutput {
    pub set: PositionSet,
    pub analysis: Analysis,
    pub stats: Option<ExploreStats>,
}

/// Forwards builder events to the channel. A dropped receiver is not an error: the run
/// carries on and still checkpoints.
struct ChannelObserver {
    tx: Sender<WorkerEvent>,
}

impl ExploreObserver for ChannelObserver {
    fn on_event(&mut self, event: &ExploreEvent) {
        let msg = match *event {
            ExploreEvent::Progress(stats) => WorkerEvent::Progress(stats),
            ExploreEvent::DepthCompleted {
                depth,
                positions_at_depth,
                stats,
            } => WorkerEvent::DepthCompleted {
                depth,
                positions_at_depth,
                stats,
            },
            ExploreEvent::Checkpointed {
                reason,
                last_completed_depth,
                frontier_cursor,
                ..
            } => WorkerEvent::Checkpointed {
                reason,
                last_completed_depth,
                frontier_cursor,
            },
        };
        if self.tx.send(msg).is_err() {
            debug!("worker event receiver dropped");
        }
    }
}

pub struct ExplorationHandle<S> {
    events: Receiver<WorkerEvent>,
    cancel: CancelToken,
    thread: JoinHandle<S>,
}

impl<S> ExplorationHandle<S> {
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the thread and take the store back. `None` if the worker panicked.
    pub fn join(self) -> Option<S> {
        match self.thread.join() {
            Ok(store) => Some(store),
            Err(_) => {
                warn!("exploration worker panicked");
                None
            }
        }
    }
}

/// Explore `root` and analyze the result on a background thread.
///
/// The worker owns the oracle and the store for the duration of the run; the store is handed
/// back through [`ExplorationHandle::join`].
pub fn spawn_exploration<O, S>(
    oracle: O,
    mut store: S,
    root: O::State,
    config: ExploreConfig,
    cancel: CancelToken,
) -> ExplorationHandle<S>
where
    O: RuleOracle + Send + 'static,
    O::State: Send + 'static,
    S: CheckpointStore + Send + 'static,
{
    let (tx, rx) = unbounded();
    let token = cancel.clone();

    let thread = thread::spawn(move || {
        let mut observer = ChannelObserver { tx: tx.clone() };
        let result = run(&oracle, &mut store, &root, config, token, &mut observer);
        let msg = match result {
            Ok(output) => WorkerEvent::Finished(Box::new(output)),
            Err(err) => WorkerEvent::Failed(err),
        };
        let _ = tx.send(msg);
        store
    });

    ExplorationHandle {
        events: rx,
        cancel,
        thread,
    }
}

fn run<O, S>(
    oracle: &O,
    store: &mut S,
    root: &O::State,
    config: ExploreConfig,
    cancel: CancelToken,
    observer: &mut ChannelObserver,
) -> Result<WorkerOutput, SearchError>
where
    O: RuleOracle,
    S: CheckpointStore,
{
    let mut builder = TreeBuilder::new(oracle, store, config)
        .with_cancel(cancel)
        .with_observer(observer);
    let set = builder.explore(root)?;
    let stats = builder.last_stats();
    let analysis = retro::analyze(oracle, &set, &oracle.identity(root))?;
    Ok(WorkerOutput {
        set,
        analysis,
        stats,
    })
}

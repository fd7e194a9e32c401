mod common;

use common::{diamond, keys_at};
use endgame_explorer::explore::{CancelToken, ExploreConfig};
use endgame_explorer::store::{CheckpointStore, MemoryStore};
use endgame_explorer::worker::{spawn_exploration, WorkerEvent};
use endgame_explorer::SearchError;

#[test]
fn worker_reports_depths_then_finishes() {
    let oracle = diamond();
    let root = oracle.state("r");
    let handle = spawn_exploration(
        oracle,
        MemoryStore::new(),
        root,
        ExploreConfig::new(4),
        CancelToken::new(),
    );

    let mut depths = Vec::new();
    let mut finished = None;
    for event in handle.events().iter() {
        match event {
            WorkerEvent::DepthCompleted { depth, .. } => depths.push(depth),
            WorkerEvent::Finished(output) => {
                finished = Some(output);
                break;
            }
            WorkerEvent::Failed(err) => panic!("worker failed: {err}"),
            _ => {}
        }
    }
    let store = handle.join().unwrap();

    assert_eq!(depths, [1, 2, 3, 4]);
    let output = finished.unwrap();
    assert_eq!(keys_at(&output.set, 4), ["g"]);
    assert_eq!(output.analysis.dead_ends.len(), 1);
    assert_eq!(output.stats.unwrap().moves_examined, 3 + 4 + 2 + 1);
    assert_eq!(
        store.load_progress().unwrap().unwrap().last_completed_depth,
        4
    );
}

#[test]
fn cancelled_worker_reports_failure_and_keeps_checkpoint() {
    let oracle = diamond();
    let root = oracle.state("r");
    let cancel = CancelToken::new();
    cancel.cancel();
    let handle = spawn_exploration(oracle, MemoryStore::new(), root, ExploreConfig::new(4), cancel);

    let failure = handle.events().iter().find_map(|e| match e {
        WorkerEvent::Failed(err) => Some(err),
        _ => None,
    });
    let store = handle.join().unwrap();

    assert!(matches!(
        failure,
        Some(SearchError::Cancelled {
            last_completed_depth: 0
        })
    ));
    assert_eq!(store.load_all().unwrap().0.len(), 1);
}

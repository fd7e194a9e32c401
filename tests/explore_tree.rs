mod common;

use common::{diamond, keys_at, Recorder, TableOracle};
use endgame_explorer::explore::{
    explore, CancelToken, CheckpointPolicy, CheckpointReason, ExploreConfig, ExploreEvent,
    ExploreLimits, FilterFn, TreeBuilder,
};
use endgame_explorer::oracle::Outcome;
use endgame_explorer::position::{Position, PositionKey};
use endgame_explorer::store::{CheckpointStore, MemoryStore, StoreError};
use endgame_explorer::SearchError;

#[test]
fn levels_follow_first_arrival() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 4, true).unwrap();

    assert_eq!(keys_at(&set, 0), ["r"]);
    assert_eq!(keys_at(&set, 1), ["a", "b", "c"]);
    assert_eq!(keys_at(&set, 2), ["d", "e", "m1"]);
    assert_eq!(keys_at(&set, 3), ["f", "m2"]);
    assert_eq!(keys_at(&set, 4), ["g"]);
    assert_eq!(set.len(), 10);

    let d = set.get(&"d".into()).unwrap();
    assert_eq!(d.moves, ["a", "d"]);
    assert_eq!(set.get(&"c".into()).unwrap().outcome, Outcome::Draw);
    assert!(set.get(&"m1".into()).unwrap().is_terminal_loss());
}

#[test]
fn transposition_records_every_parent() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 2, true).unwrap();

    let d = set.seq_of(&"d".into()).unwrap();
    let parents: Vec<&str> = set
        .parents_of(d)
        .iter()
        .map(|&p| set.by_seq(p).key.as_str())
        .collect();
    assert_eq!(parents, ["a", "b"]);
}

#[test]
fn edges_only_span_one_ply() {
    // g leads back to the root; no edge may point from depth 4 to depth 0.
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 6, true).unwrap();

    assert_eq!(set.max_depth(), Some(4));
    for (parent, child) in set.edges() {
        assert_eq!(set.by_seq(parent).depth + 1, set.by_seq(child).depth);
    }
    assert!(set.parents_of(0).is_empty());
}

#[test]
fn repeated_runs_are_identical() {
    let oracle = diamond();
    let mut first_store = MemoryStore::new();
    let mut second_store = MemoryStore::new();
    let first = explore(&oracle, &mut first_store, &oracle.state("r"), 4, false).unwrap();
    let second = explore(&oracle, &mut second_store, &oracle.state("r"), 4, false).unwrap();
    assert_eq!(first, second);

    let a: Vec<&Position> = first.iter().collect();
    let b: Vec<&Position> = second.iter().collect();
    assert_eq!(a, b);
}

#[test]
fn every_reachable_depth_is_populated() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 4, true).unwrap();

    for depth in 1..=4 {
        let has_open_parent = set.positions_at(depth - 1).any(|p| !p.is_terminal());
        if has_open_parent {
            assert!(set.positions_at(depth).next().is_some(), "depth {depth} empty");
        }
    }
}

#[test]
fn target_zero_records_only_the_root() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 0, true).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(oracle.expansion_calls(), 0);
    let marker = store.load_progress().unwrap().unwrap();
    assert_eq!(marker.last_completed_depth, 0);
    assert_eq!(marker.moves_examined, 0);
}

#[test]
fn terminal_root_is_never_expanded() {
    let oracle = TableOracle::new().loss("x");
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("x"), 3, true).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(oracle.expansion_calls(), 0);
    let marker = store.load_progress().unwrap().unwrap();
    assert_eq!(marker.last_completed_depth, 3);
}

#[test]
fn depth_events_and_checkpoints() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let mut recorder = Recorder::default();
    let config = ExploreConfig::new(2).with_checkpoint(CheckpointPolicy::per_depth_only());
    let set = TreeBuilder::new(&oracle, &mut store, config)
        .with_observer(&mut recorder)
        .explore(&oracle.state("r"))
        .unwrap();
    assert_eq!(set.len(), 7);

    let depths: Vec<(u32, usize)> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            ExploreEvent::DepthCompleted {
                depth,
                positions_at_depth,
                ..
            } => Some((*depth, *positions_at_depth)),
            _ => None,
        })
        .collect();
    assert_eq!(depths, [(1, 3), (2, 3)]);

    // Seed plus one per depth.
    assert_eq!(store.writes(), 3);
    assert!(recorder.events.iter().all(|e| !matches!(
        e,
        ExploreEvent::Checkpointed {
            reason: CheckpointReason::MoveThreshold | CheckpointReason::Interval,
            ..
        }
    )));
    let last = store.markers().last().unwrap();
    assert_eq!(last.last_completed_depth, 2);
    assert_eq!(last.moves_examined, 3 + 4);
}

#[test]
fn move_threshold_checkpoints_inside_a_depth() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let mut recorder = Recorder::default();
    let config = ExploreConfig::new(2).with_checkpoint(CheckpointPolicy::every_moves(2));
    TreeBuilder::new(&oracle, &mut store, config)
        .with_observer(&mut recorder)
        .explore(&oracle.state("r"))
        .unwrap();

    let mid_depth = recorder
        .events
        .iter()
        .filter(|e| {
            matches!(
                e,
                ExploreEvent::Checkpointed {
                    reason: CheckpointReason::MoveThreshold,
                    ..
                }
            )
        })
        .count();
    assert!(mid_depth >= 2);
    assert!(store
        .markers()
        .iter()
        .all(|m| m.last_completed_depth <= 2));
}

#[test]
fn filter_prunes_moves() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = TreeBuilder::new(&oracle, &mut store, ExploreConfig::new(2))
        .with_filter(FilterFn(|_from: &Position, mv: &(usize, String)| mv.1 != "b"))
        .explore(&oracle.state("r"))
        .unwrap();

    assert_eq!(keys_at(&set, 1), ["a", "c"]);
    assert_eq!(keys_at(&set, 2), ["d", "e"]);
}

#[test]
fn position_limit_stops_with_checkpoint() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let config = ExploreConfig::new(4).with_limits(ExploreLimits {
        max_positions: 5,
        ..ExploreLimits::default()
    });
    let err = TreeBuilder::new(&oracle, &mut store, config)
        .explore(&oracle.state("r"))
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::LimitExceeded {
            metric: "positions",
            limit: 5,
            ..
        }
    ));
    let (stored, marker) = store.load_all().unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(marker.unwrap().last_completed_depth, 1);
}

#[test]
fn cancelled_before_first_move() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = TreeBuilder::new(&oracle, &mut store, ExploreConfig::new(3))
        .with_cancel(cancel)
        .explore(&oracle.state("r"))
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::Cancelled {
            last_completed_depth: 0
        }
    ));
    assert_eq!(store.load_progress().unwrap().unwrap().last_completed_depth, 0);
}

#[test]
fn store_failure_is_fatal() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    store.fail_next_write();
    let err = explore(&oracle, &mut store, &oracle.state("r"), 2, true).unwrap_err();

    assert!(matches!(err, SearchError::Store(StoreError::Injected)));
    assert!(store.load_progress().unwrap().is_none());
}

#[test]
fn oracle_failure_is_fatal() {
    // "a" names a child that does not exist.
    let oracle = TableOracle::new().node("r", &["a"]);
    let mut store = MemoryStore::new();
    let err = explore(&oracle, &mut store, &oracle.state("r"), 1, true).unwrap_err();
    assert!(matches!(err, SearchError::Oracle(_)));
}

#[test]
fn root_key_is_the_oracle_identity() {
    let oracle = diamond();
    let mut store = MemoryStore::new();
    let set = explore(&oracle, &mut store, &oracle.state("r"), 1, true).unwrap();
    assert_eq!(set.by_seq(0).key, PositionKey::new("r"));
    assert_eq!(set.by_seq(0).depth, 0);
    assert!(set.by_seq(0).moves.is_empty());
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use endgame_explorer::explore::{ExploreEvent, ExploreObserver};
use endgame_explorer::oracle::{OracleError, Outcome, RuleOracle};
use endgame_explorer::position::PositionKey;

#[derive(Debug, Clone)]
struct Node {
    outcome: Outcome,
    children: Vec<String>,
}

/// A game given as an explicit graph: node name -> (outcome, children).
///
/// States are node names. A move is the index into the child list plus the target name, so
/// two moves to the same child stay distinct. Expansion calls (`legal_moves`, `apply_move`)
/// are counted.
#[derive(Debug, Default)]
pub struct TableOracle {
    nodes: FxHashMap<String, Node>,
    expansions: AtomicUsize,
}

impl TableOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, name: &str, children: &[&str]) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node {
                outcome: Outcome::Ongoing,
                children: children.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    pub fn loss(mut self, name: &str) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node {
                outcome: Outcome::LossForMover,
                children: Vec::new(),
            },
        );
        self
    }

    pub fn draw(mut self, name: &str) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node {
                outcome: Outcome::Draw,
                children: Vec::new(),
            },
        );
        self
    }

    pub fn state(&self, name: &str) -> String {
        assert!(self.nodes.contains_key(name), "unknown node {name}");
        name.to_string()
    }

    pub fn expansion_calls(&self) -> usize {
        self.expansions.load(Ordering::Relaxed)
    }

    pub fn reset_calls(&self) {
        self.expansions.store(0, Ordering::Relaxed);
    }

    fn lookup(&self, name: &str) -> Result<&Node, OracleError> {
        self.nodes.get(name).ok_or_else(|| OracleError::MalformedState {
            reason: format!("unknown node {name}"),
        })
    }
}

impl RuleOracle for TableOracle {
    type State = String;
    type Move = (usize, String);

    fn legal_moves(&self, state: &String) -> Result<Vec<(usize, String)>, OracleError> {
        self.expansions.fetch_add(1, Ordering::Relaxed);
        let node = self.lookup(state)?;
        if node.outcome.is_terminal() {
            return Ok(Vec::new());
        }
        Ok(node.children.iter().cloned().enumerate().collect())
    }

    fn apply_move(&self, state: &String, mv: &(usize, String)) -> Result<String, OracleError> {
        self.expansions.fetch_add(1, Ordering::Relaxed);
        let node = self.lookup(state)?;
        match node.children.get(mv.0) {
            Some(child) if *child == mv.1 => Ok(child.clone()),
            _ => Err(OracleError::IllegalMove {
                notation: mv.1.clone(),
                state: state.clone(),
            }),
        }
    }

    fn classify(&self, state: &String) -> Result<Outcome, OracleError> {
        Ok(self.lookup(state)?.outcome)
    }

    fn identity(&self, state: &String) -> PositionKey {
        PositionKey::new(state.clone())
    }

    fn notation(&self, mv: &(usize, String)) -> String {
        mv.1.clone()
    }

    fn snapshot(&self, state: &String) -> String {
        state.clone()
    }

    fn restore(&self, snapshot: &str) -> Result<String, OracleError> {
        if self.nodes.contains_key(snapshot) {
            Ok(snapshot.to_string())
        } else {
            Err(OracleError::BadSnapshot {
                snapshot: snapshot.to_string(),
                reason: "unknown node".to_string(),
            })
        }
    }
}

/// A small game with transpositions, a draw, mates at two depths and a dead end.
///
/// ```text
/// depth 0: r
/// depth 1: a b c(draw)
/// depth 2: d (from a, b)   e (from a)   m1 (loss, from b)
/// depth 3: f (from d)      m2 (loss, from e)
/// depth 4: g (from f)
/// ```
///
/// `e` has a single move into `m2`, so it is a dead end.
pub fn diamond() -> TableOracle {
    TableOracle::new()
        .node("r", &["a", "b", "c"])
        .node("a", &["d", "e"])
        .node("b", &["d", "m1"])
        .draw("c")
        .node("d", &["f"])
        .node("e", &["m2"])
        .loss("m1")
        .node("f", &["g"])
        .loss("m2")
        .node("g", &["r"])
}

/// Records every event it sees.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<ExploreEvent>,
}

impl ExploreObserver for Recorder {
    fn on_event(&mut self, event: &ExploreEvent) {
        self.events.push(event.clone());
    }
}

pub fn keys_at(set: &endgame_explorer::PositionSet, depth: u32) -> Vec<String> {
    set.positions_at(depth)
        .map(|p| p.key.as_str().to_string())
        .collect()
}

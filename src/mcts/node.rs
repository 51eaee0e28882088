//! Search node and edge structures.
//!
//! Uses arena-based allocation with index references (NodeId). An edge is
//! created for every legal move when a node is first reached; its child is
//! only allocated once the move is tried, so an edge without a child is an
//! untried move.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Move, Seat, SeatMap};

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// A move from a parent node to a child.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub mv: Move,

    /// Child node (NONE while the move is untried).
    pub child: NodeId,

    pub visits: u32,

    /// Accumulated score vector, indexed by seat.
    pub total_reward: SeatMap<f64>,

    /// Excluded from selection by score-bound pruning.
    pub pruned: bool,
}

impl Edge {
    pub fn new(mv: Move, seat_count: usize) -> Self {
        Self {
            mv,
            child: NodeId::NONE,
            visits: 0,
            total_reward: SeatMap::with_value(seat_count, 0.0),
            pruned: false,
        }
    }

    /// Mean score for `seat`, zero when unvisited.
    #[must_use]
    pub fn mean_reward(&self, seat: Seat) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward[seat] / f64::from(self.visits)
        }
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        !self.child.is_none()
    }
}

/// A node in the search tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Index of the edge from parent that led to this node.
    pub parent_edge_idx: u16,

    /// Seat to move, `None` at chance nodes.
    pub to_move: Option<Seat>,

    /// Depth in tree (root = 0).
    pub depth: u16,

    pub visits: u32,

    pub is_terminal: bool,

    /// Optimistic score bound per seat.
    pub opti: SeatMap<f64>,

    /// Pessimistic score bound per seat.
    pub pess: SeatMap<f64>,

    /// One edge per legal move.
    pub edges: SmallVec<[Edge; 8]>,
}

impl MCTSNode {
    pub fn new(parent: NodeId, parent_edge_idx: u16, to_move: Option<Seat>, depth: u16, seat_count: usize) -> Self {
        Self {
            parent,
            parent_edge_idx,
            to_move,
            depth,
            visits: 0,
            is_terminal: false,
            opti: SeatMap::with_value(seat_count, 1.0),
            pess: SeatMap::with_value(seat_count, 0.0),
            edges: SmallVec::new(),
        }
    }

    pub fn root(to_move: Option<Seat>, seat_count: usize) -> Self {
        Self::new(NodeId::NONE, 0, to_move, 0, seat_count)
    }

    #[must_use]
    pub fn is_chance(&self) -> bool {
        self.to_move.is_none()
    }

    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        !self.edges.is_empty() && self.edges.iter().all(Edge::is_expanded)
    }

    #[must_use]
    pub fn has_unexpanded(&self) -> bool {
        self.edges.iter().any(|e| !e.is_expanded())
    }

    /// Indices of untried moves.
    pub fn unexpanded_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_expanded())
            .map(|(i, _)| i)
    }

    /// Sum of child visit counts.
    #[must_use]
    pub fn child_visits(&self) -> u32 {
        self.edges.iter().map(|e| e.visits).sum()
    }

    /// Fix both bounds to an exact score.
    pub fn set_exact_bounds(&mut self, score: &SeatMap<f64>) {
        self.opti = score.clone();
        self.pess = score.clone();
    }
}

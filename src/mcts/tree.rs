//! Arena-based search tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references. Besides storage
//! the tree owns score-bound propagation: bounds are exact at terminal
//! nodes and flow upwards as a max for the seat to move and a min for
//! everyone else.

use serde::{Deserialize, Serialize};

use super::node::{MCTSNode, NodeId};
use crate::core::{Seat, SeatMap};

/// Arena-based search tree for one determinization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    nodes: Vec<MCTSNode>,

    /// The root node ID (always 0).
    root: NodeId,

    seat_count: usize,
}

impl MCTSTree {
    pub fn new(root_to_move: Option<Seat>, seat_count: usize) -> Self {
        Self::with_capacity(root_to_move, seat_count, 1024)
    }

    /// A tree with no root, replaced by `new` once the root position is known.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId::new(0),
            seat_count: 0,
        }
    }

    pub fn with_capacity(root_to_move: Option<Seat>, seat_count: usize, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(MCTSNode::root(root_to_move, seat_count));
        Self {
            nodes,
            root: NodeId::new(0),
            seat_count,
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: MCTSNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.seat_count
    }

    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root)
    }

    pub fn root_node_mut(&mut self) -> &mut MCTSNode {
        self.get_mut(self.root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Recompute bounds for every node on `path`, deepest first, and prune
    /// children that can no longer beat their parent's pessimistic bound.
    ///
    /// A child whose optimistic bound equals the parent's pessimistic bound
    /// is kept on purpose: it may tie the best move and still be chosen.
    pub fn propagate_bounds(&mut self, path: &[(NodeId, usize)]) {
        for &(node_id, _) in path.iter().rev() {
            self.recompute_bounds(node_id);
            self.prune_children(node_id);
        }
    }

    fn recompute_bounds(&mut self, node_id: NodeId) {
        let node = self.get(node_id);
        let mover = node.to_move;
        let has_untried = node.has_unexpanded();
        let children: Vec<NodeId> = node
            .edges
            .iter()
            .filter(|e| e.is_expanded())
            .map(|e| e.child)
            .collect();
        if children.is_empty() {
            return;
        }

        let mut opti: SeatMap<f64> = SeatMap::new(self.seat_count, |s| if Some(s) == mover { 0.0 } else { 1.0 });
        let mut pess = opti.clone();
        for child_id in children {
            let child = self.get(child_id);
            for seat in Seat::all(self.seat_count) {
                if Some(seat) == mover {
                    opti[seat] = opti[seat].max(child.opti[seat]);
                    pess[seat] = pess[seat].max(child.pess[seat]);
                } else {
                    opti[seat] = opti[seat].min(child.opti[seat]);
                    pess[seat] = pess[seat].min(child.pess[seat]);
                }
            }
        }

        // Untried moves count as a child with bounds 1 / 0.
        if has_untried {
            for seat in Seat::all(self.seat_count) {
                if Some(seat) == mover {
                    opti[seat] = 1.0;
                } else {
                    pess[seat] = 0.0;
                }
            }
        }

        let node = self.get_mut(node_id);
        node.opti = opti;
        node.pess = pess;
    }

    fn prune_children(&mut self, node_id: NodeId) {
        let Some(mover) = self.get(node_id).to_move else {
            return;
        };
        let floor = self.get(node_id).pess[mover];
        let dominated: Vec<usize> = self
            .get(node_id)
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_expanded() && self.get(e.child).opti[mover] < floor)
            .map(|(i, _)| i)
            .collect();
        let node = self.get_mut(node_id);
        for idx in dominated {
            node.edges[idx].pruned = true;
        }
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let terminal_count = self.nodes.iter().filter(|n| n.is_terminal).count();
        let total_edges: usize = self.nodes.iter().map(|n| n.edges.len()).sum();
        let edges = self.nodes.iter().flat_map(|n| n.edges.iter());
        let expanded_edges = edges.clone().filter(|e| e.is_expanded()).count();
        let pruned_edges = edges.filter(|e| e.pruned).count();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            terminal_count,
            total_edges,
            expanded_edges,
            pruned_edges,
        }
    }
}

/// Shape of one search tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub node_count: usize,
    pub max_depth: u16,
    pub terminal_count: usize,
    pub total_edges: usize,
    /// Edges with a materialized child.
    pub expanded_edges: usize,
    pub pruned_edges: usize,
}

impl TreeStats {
    /// Average edges per node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.node_count as f64
        }
    }

    /// Expanded edges / total edges.
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.total_edges == 0 {
            0.0
        } else {
            self.expanded_edges as f64 / self.total_edges as f64
        }
    }
}

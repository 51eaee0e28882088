//! Sequential search over one determinization.
//!
//! Each iteration walks from the root (select), adds exactly one child for
//! an untried move (expand), scores the reached position (simulate) and
//! adds that score to every edge on the path (backpropagate). Edges store
//! the full score vector; the value of an edge is read for the seat that
//! made the move.
//!
//! Chance nodes (no seat to move) keep one edge per outcome, aligned with
//! the board's `move_weights`, and are passed through by sampling.

use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{GameRng, Move, SeatMap};
use crate::rules::{Board, MovePhase};

use super::budget::{Budget, StopSignal};
use super::config::SearchConfig;
use super::error::SearchError;
use super::node::{Edge, MCTSNode, NodeId};
use super::policy::{builtin_playout, EstimatorAssisted, HeuristicFunction, NoHeuristic, PlayoutPolicy, UctSelection};
use super::stats::SearchStats;
use super::tree::{MCTSTree, TreeStats};

/// Root statistics of one move in one tree.
#[derive(Clone, Debug, PartialEq)]
pub struct RootMoveStats {
    pub mv: Move,
    pub visits: u64,
    /// Accumulated score for the seat making `mv`.
    pub score_sum: f64,
}

/// What one tree reports back to the coordinator.
#[derive(Clone, Debug)]
pub struct TreeOutcome {
    /// Visited root moves, in root edge order.
    pub moves: Vec<RootMoveStats>,
    pub stats: SearchStats,
    pub tree: TreeStats,
}

/// One ISMCTS tree.
///
/// Owns its tree and RNG; policies are shared read-only with other trees.
pub struct TreeSearch<B: Board> {
    num_playouts: u32,
    score_bounds: bool,
    selection: UctSelection,
    heuristic: Arc<dyn HeuristicFunction<B>>,
    playout: EstimatorAssisted<B>,
    tree: MCTSTree,
    rng: GameRng,
    stats: SearchStats,
}

impl<B: Board> TreeSearch<B> {
    pub fn new(config: &SearchConfig, rng: GameRng) -> Self {
        Self {
            num_playouts: config.num_playouts,
            score_bounds: config.score_bounds,
            selection: UctSelection::from_config(config),
            heuristic: Arc::new(NoHeuristic),
            playout: EstimatorAssisted::new(builtin_playout(config.playout)),
            tree: MCTSTree::empty(),
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn with_heuristic(mut self, heuristic: Arc<dyn HeuristicFunction<B>>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Replace the rollout policy. Value estimates are still used at leaves
    /// when the board offers them.
    pub fn with_playout(mut self, playout: Arc<dyn PlayoutPolicy<B>>) -> Self {
        self.playout = EstimatorAssisted::new(playout);
        self
    }

    /// Search from `root` until the budget is spent or `stop` fires.
    pub fn run(&mut self, root: &B, budget: Budget, stop: &StopSignal) -> Result<TreeOutcome, SearchError> {
        let start = Instant::now();
        self.stats.reset();
        self.tree = MCTSTree::new(root.current_player(), root.player_count());

        if root.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }
        let root_id = self.tree.root();
        self.init_edges(root_id, root);
        if self.tree.root_node().edges.is_empty() {
            return Err(SearchError::TerminalRoot);
        }

        while !budget.exhausted(self.stats.iterations) && !stop.is_stopped() {
            self.iteration(root);
            self.stats.iterations += 1;
        }

        self.stats.time_us = start.elapsed().as_micros() as u64;
        self.stats.trees = 1;
        debug!(
            runs = self.stats.iterations,
            elapsed_ms = self.stats.time_us / 1000,
            nodes = self.tree.len(),
            "tree finished"
        );

        Ok(TreeOutcome {
            moves: self.root_moves(),
            stats: self.stats.clone(),
            tree: self.tree.stats(),
        })
    }

    /// Single iteration: select, expand, simulate, backpropagate.
    fn iteration(&mut self, root: &B) {
        let mut board = root.clone();
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut current = self.tree.root();

        // === SELECTION / EXPANSION ===
        while !self.tree.get(current).is_terminal {
            let node = self.tree.get(current);
            let Some(mover) = node.to_move else {
                let edge_idx = self.sample_chance_edge(current, &board);
                path.push((current, edge_idx));
                let mv = self.tree.get(current).edges[edge_idx].mv;
                board.apply_move(&mv);
                current = self.ensure_child(current, edge_idx, &board);
                continue;
            };

            if node.has_unexpanded() {
                let untried: SmallVec<[usize; 8]> = node.unexpanded_edges().collect();
                let edge_idx = untried[self.rng.gen_range_usize(0..untried.len())];
                path.push((current, edge_idx));
                let mv = node.edges[edge_idx].mv;
                board.apply_move(&mv);
                current = self.expand_child(current, edge_idx, &board);
                break;
            }

            let best = self
                .selection
                .best_edges(&self.tree, node, mover, &board, self.heuristic.as_ref());
            if best.is_empty() {
                // Every child is pruned; score this node as it stands.
                self.stats.pruned_stops += 1;
                break;
            }
            let edge_idx = best[self.rng.gen_range_usize(0..best.len())];
            path.push((current, edge_idx));
            let mv = node.edges[edge_idx].mv;
            board.apply_move(&mv);
            current = self.ensure_child(current, edge_idx, &board);
        }

        // === SIMULATION ===
        let score = if self.tree.get(current).is_terminal {
            board.score()
        } else {
            let eval = self.playout.evaluate(&board, self.num_playouts, &mut self.rng);
            self.stats.simulations += u64::from(eval.rollouts);
            if eval.estimated {
                self.stats.estimator_evaluations += 1;
            }
            if eval.estimator_failed {
                if self.stats.estimator_fallbacks == 0 {
                    warn!(playout = self.playout.name(), "score estimator failed, falling back to rollouts");
                }
                self.stats.estimator_fallbacks += 1;
            }
            eval.score
        };

        // === BACKPROPAGATION ===
        self.backpropagate(&path, current, &score);
        if self.score_bounds {
            self.tree.propagate_bounds(&path);
        }
    }

    /// Add one edge per legal move. Chance nodes use the playout move list,
    /// which is what `move_weights` is aligned with.
    fn init_edges(&mut self, node_id: NodeId, board: &B) {
        let seat_count = self.tree.seat_count();
        let phase = if board.current_player().is_some() {
            MovePhase::TreePolicy
        } else {
            MovePhase::Playout
        };
        let moves = board.legal_moves(phase);
        let node = self.tree.get_mut(node_id);
        node.edges.extend(moves.into_iter().map(|mv| Edge::new(mv, seat_count)));
    }

    fn sample_chance_edge(&mut self, node_id: NodeId, board: &B) -> usize {
        let weights = board.move_weights();
        let edge_count = self.tree.get(node_id).edges.len();
        match self.rng.choose_weighted(&weights) {
            Some(idx) if idx < edge_count => idx,
            _ => self.rng.gen_range_usize(0..edge_count),
        }
    }

    /// Allocate the child for `edge_idx`. `board` is the position after the move.
    fn expand_child(&mut self, parent_id: NodeId, edge_idx: usize, board: &B) -> NodeId {
        let depth = self.tree.get(parent_id).depth + 1;
        let mut child = MCTSNode::new(
            parent_id,
            edge_idx as u16,
            board.current_player(),
            depth,
            self.tree.seat_count(),
        );
        let terminal = board.is_terminal();
        if terminal {
            child.is_terminal = true;
            child.set_exact_bounds(&board.score());
        }

        let child_id = self.tree.alloc(child);
        self.tree.get_mut(parent_id).edges[edge_idx].child = child_id;
        if !terminal {
            self.init_edges(child_id, board);
            if self.tree.get(child_id).edges.is_empty() {
                let node = self.tree.get_mut(child_id);
                node.is_terminal = true;
                node.set_exact_bounds(&board.score());
            }
        }

        self.stats.nodes_expanded += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        child_id
    }

    fn ensure_child(&mut self, parent_id: NodeId, edge_idx: usize, board: &B) -> NodeId {
        let child = self.tree.get(parent_id).edges[edge_idx].child;
        if !child.is_none() {
            return child;
        }
        self.expand_child(parent_id, edge_idx, board)
    }

    fn backpropagate(&mut self, path: &[(NodeId, usize)], leaf: NodeId, score: &SeatMap<f64>) {
        self.tree.get_mut(leaf).visits += 1;
        for &(node_id, edge_idx) in path.iter().rev() {
            let node = self.tree.get_mut(node_id);
            if node_id != leaf {
                node.visits += 1;
            }
            let edge = &mut node.edges[edge_idx];
            edge.visits += 1;
            edge.total_reward.accumulate(score);
        }
    }

    fn root_moves(&self) -> Vec<RootMoveStats> {
        self.tree
            .root_node()
            .edges
            .iter()
            .filter(|e| e.visits > 0)
            .map(|e| RootMoveStats {
                mv: e.mv,
                visits: u64::from(e.visits),
                score_sum: e.total_reward[e.mv.player()],
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn tree(&self) -> &MCTSTree {
        &self.tree
    }

    /// Visit share of each root move.
    pub fn action_probabilities(&self) -> Vec<(Move, f64)> {
        if self.tree.is_empty() {
            return Vec::new();
        }
        let root = self.tree.root_node();
        let total = root.child_visits();
        if total == 0 {
            let uniform = 1.0 / root.edges.len().max(1) as f64;
            return root.edges.iter().map(|e| (e.mv, uniform)).collect();
        }
        root.edges
            .iter()
            .map(|e| (e.mv, f64::from(e.visits) / f64::from(total)))
            .collect()
    }

    /// Mean score of each root move for the seat making it.
    pub fn root_means(&self) -> Vec<(Move, f64)> {
        if self.tree.is_empty() {
            return Vec::new();
        }
        self.tree
            .root_node()
            .edges
            .iter()
            .map(|e| (e.mv, e.mean_reward(e.mv.player())))
            .collect()
    }
}

//! Selection, heuristic and playout policies.
//!
//! Policies are trait-based to allow customization:
//! - `UctSelection`: which child to descend into (UCT plus bound biases)
//! - `HeuristicFunction`: domain bonus added to a candidate's UCT value
//! - `PlayoutPolicy`: how a leaf is completed to a terminal score

use std::sync::Arc;

use smallvec::SmallVec;

use crate::core::{GameRng, Move, Seat, SeatMap};
use crate::rules::{Board, MovePhase, RolloutStrength};

use super::config::{PlayoutKind, SearchConfig};
use super::node::MCTSNode;
use super::tree::MCTSTree;

// =============================================================================
// Selection Policy
// =============================================================================

/// UCT selection with optional score-bound biases.
///
/// Value of child i for the seat `p` to move:
/// `mean_i + C * sqrt(ln(N) / n_i) + ob * opti_i[p] - pb * (1 - pess_i[p]) + h(board, move_i)`
#[derive(Clone, Copy, Debug)]
pub struct UctSelection {
    pub exploration_constant: f64,
    pub optimistic_bias: f64,
    pub pessimistic_bias: f64,
}

impl UctSelection {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            exploration_constant: config.exploration_constant,
            optimistic_bias: config.optimistic_bias,
            pessimistic_bias: config.pessimistic_bias,
        }
    }

    /// UCT value of one child.
    #[must_use]
    pub fn value(&self, mean: f64, parent_visits: u32, child_visits: u32) -> f64 {
        if child_visits == 0 {
            return f64::INFINITY;
        }
        let ln_parent = f64::from(parent_visits.max(1)).ln();
        mean + self.exploration_constant * (ln_parent / f64::from(child_visits)).sqrt()
    }

    /// Indices of the unpruned edges sharing the best value. Empty when
    /// every edge has been pruned.
    pub fn best_edges<B: Board>(
        &self,
        tree: &MCTSTree,
        node: &MCTSNode,
        mover: Seat,
        board: &B,
        heuristic: &dyn HeuristicFunction<B>,
    ) -> SmallVec<[usize; 8]> {
        let mut best = f64::NEG_INFINITY;
        let mut ties = SmallVec::new();

        for (i, edge) in node.edges.iter().enumerate() {
            if edge.pruned {
                continue;
            }
            let mut value = self.value(edge.mean_reward(mover), node.visits, edge.visits);
            if edge.is_expanded() {
                let child = tree.get(edge.child);
                value += self.optimistic_bias * child.opti[mover];
                value -= self.pessimistic_bias * (1.0 - child.pess[mover]);
            }
            value += heuristic.evaluate(board, &edge.mv);

            if value > best {
                best = value;
                ties.clear();
                ties.push(i);
            } else if value == best {
                ties.push(i);
            }
        }
        ties
    }
}

// =============================================================================
// Heuristic Function
// =============================================================================

/// Domain bonus for a candidate move during selection.
pub trait HeuristicFunction<B: Board>: Send + Sync {
    fn evaluate(&self, board: &B, mv: &Move) -> f64;
}

/// Adds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHeuristic;

impl<B: Board> HeuristicFunction<B> for NoHeuristic {
    fn evaluate(&self, _board: &B, _mv: &Move) -> f64 {
        0.0
    }
}

// =============================================================================
// Playout Policy
// =============================================================================

/// Result of evaluating one leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafEvaluation {
    pub score: SeatMap<f64>,
    /// Rollouts actually played.
    pub rollouts: u32,
    /// Score came from a value estimator.
    pub estimated: bool,
    /// An estimator was asked and failed.
    pub estimator_failed: bool,
}

impl LeafEvaluation {
    fn rolled_out(score: SeatMap<f64>, rollouts: u32) -> Self {
        Self {
            score,
            rollouts,
            estimated: false,
            estimator_failed: false,
        }
    }
}

/// Completes a position to a terminal score.
pub trait PlayoutPolicy<B: Board>: Send + Sync {
    /// Move to play in `board` during a rollout.
    fn select_move(&self, board: &B, rng: &mut GameRng) -> Option<Move>;

    /// Play `board` to the end and return its score.
    fn complete_rollout(&self, board: &mut B, rng: &mut GameRng) -> SeatMap<f64> {
        while !board.is_terminal() {
            let Some(mv) = self.select_move(board, rng) else {
                break;
            };
            board.apply_move(&mv);
        }
        board.score()
    }

    /// Average of `num_playouts` rollouts, each on its own copy.
    fn evaluate(&self, board: &B, num_playouts: u32, rng: &mut GameRng) -> LeafEvaluation {
        if board.is_terminal() {
            return LeafEvaluation::rolled_out(board.score(), 0);
        }
        let n = num_playouts.max(1);
        let mut total = SeatMap::with_value(board.player_count(), 0.0);
        for _ in 0..n {
            let mut copy = board.clone();
            total.accumulate(&self.complete_rollout(&mut copy, rng));
        }
        total.scale_down(f64::from(n));
        LeafEvaluation::rolled_out(total, n)
    }

    fn name(&self) -> &'static str;
}

/// Uniformly random legal move, or weighted at chance nodes.
pub fn random_move<B: Board>(board: &B, rng: &mut GameRng) -> Option<Move> {
    let moves = board.legal_moves(MovePhase::Playout);
    if board.current_player().is_some() {
        return rng.choose(&moves).copied();
    }
    let weights = board.move_weights();
    match rng.choose_weighted(&weights) {
        Some(idx) => moves.get(idx).copied(),
        None => rng.choose(&moves).copied(),
    }
}

/// Uniformly random rollouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPlayout;

impl<B: Board> PlayoutPolicy<B> for RandomPlayout {
    fn select_move(&self, board: &B, rng: &mut GameRng) -> Option<Move> {
        random_move(board, rng)
    }

    fn name(&self) -> &'static str {
        "random playout"
    }
}

/// Rollouts driven by the board's own move ranking.
#[derive(Clone, Copy, Debug)]
pub struct RuleBasedPlayout {
    pub strength: RolloutStrength,
}

impl RuleBasedPlayout {
    #[must_use]
    pub const fn light() -> Self {
        Self {
            strength: RolloutStrength::Light,
        }
    }

    #[must_use]
    pub const fn heavy() -> Self {
        Self {
            strength: RolloutStrength::Heavy,
        }
    }
}

impl<B: Board> PlayoutPolicy<B> for RuleBasedPlayout {
    fn select_move(&self, board: &B, rng: &mut GameRng) -> Option<Move> {
        if board.current_player().is_none() {
            return random_move(board, rng);
        }
        board
            .best_move(self.strength, rng)
            .or_else(|| random_move(board, rng))
    }

    fn name(&self) -> &'static str {
        match self.strength {
            RolloutStrength::Light => "light rule-based playout",
            RolloutStrength::Heavy => "heavy rule-based playout",
        }
    }
}

/// Built-in playout for a configured kind.
pub fn builtin_playout<B: Board>(kind: PlayoutKind) -> Arc<dyn PlayoutPolicy<B>> {
    match kind {
        PlayoutKind::Random => Arc::new(RandomPlayout),
        PlayoutKind::Light => Arc::new(RuleBasedPlayout::light()),
        PlayoutKind::Heavy => Arc::new(RuleBasedPlayout::heavy()),
    }
}

/// Replaces the rollout at a leaf with the board's value estimate when one
/// is available. Rollout moves themselves always come from `inner`.
pub struct EstimatorAssisted<B: Board> {
    inner: Arc<dyn PlayoutPolicy<B>>,
}

impl<B: Board> EstimatorAssisted<B> {
    pub fn new(inner: Arc<dyn PlayoutPolicy<B>>) -> Self {
        Self { inner }
    }
}

impl<B: Board> Clone for EstimatorAssisted<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Board> PlayoutPolicy<B> for EstimatorAssisted<B> {
    fn select_move(&self, board: &B, rng: &mut GameRng) -> Option<Move> {
        self.inner.select_move(board, rng)
    }

    fn complete_rollout(&self, board: &mut B, rng: &mut GameRng) -> SeatMap<f64> {
        self.inner.complete_rollout(board, rng)
    }

    fn evaluate(&self, board: &B, num_playouts: u32, rng: &mut GameRng) -> LeafEvaluation {
        if board.is_terminal() || !board.has_value_estimator() {
            return self.inner.evaluate(board, num_playouts, rng);
        }
        match board.estimate_score() {
            Ok(score) => LeafEvaluation {
                score,
                rollouts: 0,
                estimated: true,
                estimator_failed: false,
            },
            Err(_) => LeafEvaluation {
                estimator_failed: true,
                ..self.inner.evaluate(board, num_playouts, rng)
            },
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Color, Rank};
    use crate::determinize::DeterminizeError;
    use crate::mcts::node::{Edge, NodeId};
    use crate::nn::EstimatorError;

    /// Counts down to zero; seat 0 wins if the last move was `Ace`.
    #[derive(Clone)]
    struct Countdown {
        left: u32,
        last: Option<Rank>,
        estimate: Option<Result<f64, EstimatorError>>,
    }

    impl Countdown {
        fn new(left: u32) -> Self {
            Self {
                left,
                last: None,
                estimate: None,
            }
        }
    }

    impl Board for Countdown {
        fn current_player(&self) -> Option<Seat> {
            Some(Seat::new((self.left % 2) as u8))
        }
        fn player_count(&self) -> usize {
            2
        }
        fn score(&self) -> SeatMap<f64> {
            let win = if self.last == Some(Rank::Ace) { 1.0 } else { 0.0 };
            SeatMap::from_vec(vec![win, 1.0 - win])
        }
        fn legal_moves(&self, _phase: MovePhase) -> Vec<Move> {
            if self.left == 0 {
                return Vec::new();
            }
            let seat = self.current_player().unwrap_or(Seat::new(0));
            [Rank::Six, Rank::Ace]
                .into_iter()
                .map(|r| Move::card(seat, Card::new(Color::Spades, r)))
                .collect()
        }
        fn apply_move(&mut self, mv: &Move) {
            self.left -= 1;
            self.last = mv.as_card().map(|m| m.card.rank);
        }
        fn is_terminal(&self) -> bool {
            self.left == 0
        }
        fn duplicate(&self, _resample: bool, _rng: &mut GameRng) -> Result<Self, DeterminizeError> {
            Ok(self.clone())
        }
        fn has_value_estimator(&self) -> bool {
            self.estimate.is_some()
        }
        fn estimate_score(&self) -> Result<SeatMap<f64>, EstimatorError> {
            match &self.estimate {
                Some(Ok(v)) => Ok(SeatMap::from_vec(vec![*v, 1.0 - v])),
                Some(Err(e)) => Err(e.clone()),
                None => Err(EstimatorError::Unavailable),
            }
        }
        fn best_move(&self, _strength: RolloutStrength, _rng: &mut GameRng) -> Option<Move> {
            self.legal_moves(MovePhase::Playout).pop()
        }
    }

    fn node_with(visits: &[(u32, f64)]) -> MCTSNode {
        let mut node = MCTSNode::root(Some(Seat::new(0)), 2);
        for (i, (n, total)) in visits.iter().enumerate() {
            let rank = Rank::ALL[i];
            let mut edge = Edge::new(Move::card(Seat::new(0), Card::new(Color::Hearts, rank)), 2);
            edge.visits = *n;
            edge.total_reward[Seat::new(0)] = *total;
            edge.child = NodeId::new(i as u32 + 1);
            node.edges.push(edge);
        }
        node.visits = visits.iter().map(|(n, _)| n).sum();
        node
    }

    fn tree_for(node: &MCTSNode) -> MCTSTree {
        let mut tree = MCTSTree::new(Some(Seat::new(0)), 2);
        for _ in &node.edges {
            tree.alloc(MCTSNode::new(NodeId::new(0), 0, Some(Seat::new(1)), 1, 2));
        }
        tree
    }

    #[test]
    fn test_uct_prefers_unvisited() {
        let uct = UctSelection::from_config(&SearchConfig::default());
        assert_eq!(uct.value(0.5, 10, 0), f64::INFINITY);
        assert!(uct.value(0.9, 100, 50) > uct.value(0.1, 100, 50));
    }

    #[test]
    fn test_best_edges_exploits() {
        let node = node_with(&[(100, 80.0), (100, 20.0)]);
        let tree = tree_for(&node);
        let uct = UctSelection::from_config(&SearchConfig::default());
        let best = uct.best_edges(&tree, &node, Seat::new(0), &Countdown::new(3), &NoHeuristic);
        assert_eq!(best.as_slice(), &[0]);
    }

    #[test]
    fn test_best_edges_reports_ties() {
        let node = node_with(&[(10, 5.0), (10, 5.0)]);
        let tree = tree_for(&node);
        let uct = UctSelection::from_config(&SearchConfig::default());
        let best = uct.best_edges(&tree, &node, Seat::new(0), &Countdown::new(3), &NoHeuristic);
        assert_eq!(best.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_pruned_edges_are_skipped() {
        let mut node = node_with(&[(10, 9.0), (10, 1.0)]);
        node.edges[0].pruned = true;
        node.edges[1].pruned = true;
        let tree = tree_for(&node);
        let uct = UctSelection::from_config(&SearchConfig::default());
        let best = uct.best_edges(&tree, &node, Seat::new(0), &Countdown::new(3), &NoHeuristic);
        assert!(best.is_empty());
    }

    struct PreferSeven;

    impl HeuristicFunction<Countdown> for PreferSeven {
        fn evaluate(&self, _board: &Countdown, mv: &Move) -> f64 {
            match mv.as_card() {
                Some(m) if m.card.rank == Rank::Seven => 10.0,
                _ => 0.0,
            }
        }
    }

    #[test]
    fn test_heuristic_shifts_selection() {
        let node = node_with(&[(100, 80.0), (100, 20.0)]);
        let tree = tree_for(&node);
        let uct = UctSelection::from_config(&SearchConfig::default());
        let best = uct.best_edges(&tree, &node, Seat::new(0), &Countdown::new(3), &PreferSeven);
        assert_eq!(best.as_slice(), &[1]);
    }

    #[test]
    fn test_random_playout_reaches_terminal() {
        let mut board = Countdown::new(5);
        let score = RandomPlayout.complete_rollout(&mut board, &mut GameRng::new(1));
        assert!(board.is_terminal());
        assert_eq!(score[Seat::new(0)] + score[Seat::new(1)], 1.0);
    }

    #[test]
    fn test_rule_based_playout_uses_best_move() {
        let board = Countdown::new(3);
        let eval = RuleBasedPlayout::heavy().evaluate(&board, 2, &mut GameRng::new(1));
        // best_move always plays the ace.
        assert_eq!(eval.score[Seat::new(0)], 1.0);
        assert_eq!(eval.rollouts, 2);
        assert_eq!(board.left, 3);
    }

    #[test]
    fn test_estimator_short_circuits_rollout() {
        let mut board = Countdown::new(3);
        board.estimate = Some(Ok(0.7));
        let policy = EstimatorAssisted::new(Arc::new(RandomPlayout));
        let eval = policy.evaluate(&board, 2, &mut GameRng::new(1));
        assert!(eval.estimated);
        assert_eq!(eval.rollouts, 0);
        assert!((eval.score[Seat::new(0)] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_estimator_failure_falls_back() {
        let mut board = Countdown::new(3);
        board.estimate = Some(Err(EstimatorError::Failed("timeout".into())));
        let policy = EstimatorAssisted::new(Arc::new(RuleBasedPlayout::light()));
        let eval = policy.evaluate(&board, 2, &mut GameRng::new(1));
        assert!(eval.estimator_failed);
        assert!(!eval.estimated);
        assert_eq!(eval.rollouts, 2);
        assert_eq!(eval.score[Seat::new(0)], 1.0);
    }
}

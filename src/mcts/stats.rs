//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics of one tree, or of all trees of a decision once merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Completed iterations.
    pub iterations: u64,

    /// Nodes added to the tree.
    pub nodes_expanded: u64,

    /// Rollouts played to the end.
    pub simulations: u64,

    /// Leaves scored by a value estimator instead of a rollout.
    pub estimator_evaluations: u64,

    /// Leaves where the estimator failed and a rollout was used.
    pub estimator_fallbacks: u64,

    /// Iterations that stopped because every child was pruned.
    pub pruned_stops: u64,

    pub max_depth: u16,

    /// Wall time (microseconds). Merging keeps the longest tree.
    pub time_us: u64,

    /// Trees that contributed.
    pub trees: u32,

    /// Trees excluded after a failure.
    pub failed_trees: u32,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold another tree's statistics into these.
    pub fn merge(&mut self, other: &SearchStats) {
        self.iterations += other.iterations;
        self.nodes_expanded += other.nodes_expanded;
        self.simulations += other.simulations;
        self.estimator_evaluations += other.estimator_evaluations;
        self.estimator_fallbacks += other.estimator_fallbacks;
        self.pruned_stops += other.pruned_stops;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.time_us = self.time_us.max(other.time_us);
        self.trees += other.trees;
        self.failed_trees += other.failed_trees;
    }

    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.iterations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Average iterations per contributing tree.
    #[must_use]
    pub fn iterations_per_tree(&self) -> f64 {
        if self.trees == 0 {
            0.0
        } else {
            self.iterations as f64 / f64::from(self.trees)
        }
    }
}

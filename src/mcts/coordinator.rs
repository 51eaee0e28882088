//! Root-parallel search: one tree per determinization.
//!
//! Tree `i` draws its determinization and all of its own randomness from
//! stream `i` of the decision seed, so a seeded decision does not depend on
//! how the pool schedules trees. Results are merged in tree order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::GameRng;
use crate::rules::Board;

use super::budget::{Budget, SearchPlan, StopSignal};
use super::config::{FailurePolicy, SearchConfig};
use super::error::SearchError;
use super::policy::{HeuristicFunction, PlayoutPolicy};
use super::pool::WorkerPool;
use super::search::{TreeOutcome, TreeSearch};
use super::selector::RootAggregate;
use super::stats::SearchStats;

/// Merged result of all trees of one decision.
#[derive(Clone, Debug, Default)]
pub struct SearchReport {
    pub aggregate: RootAggregate,
    pub stats: SearchStats,
}

enum TreeFailure {
    Panicked(String),
    Error(SearchError),
}

impl TreeFailure {
    fn reason(&self) -> String {
        match self {
            TreeFailure::Panicked(msg) => format!("panicked: {msg}"),
            TreeFailure::Error(err) => err.to_string(),
        }
    }

    fn into_error(self, index: usize) -> SearchError {
        match self {
            TreeFailure::Panicked(reason) => SearchError::WorkerFailed { index, reason },
            TreeFailure::Error(err) => err,
        }
    }
}

/// Schedules the trees of one decision and merges their root statistics.
pub struct ParallelSearch<'a, B: Board> {
    config: &'a SearchConfig,
    heuristic: Arc<dyn HeuristicFunction<B>>,
    playout: Arc<dyn PlayoutPolicy<B>>,
}

impl<'a, B: Board> ParallelSearch<'a, B> {
    pub fn new(
        config: &'a SearchConfig,
        heuristic: Arc<dyn HeuristicFunction<B>>,
        playout: Arc<dyn PlayoutPolicy<B>>,
    ) -> Self {
        Self {
            config,
            heuristic,
            playout,
        }
    }

    /// Run `plan.determinizations` trees from `root`.
    ///
    /// With root parallelisation the trees run on `pool`; otherwise they run
    /// on the calling thread. Failed trees are excluded or escalated
    /// according to the configured [`FailurePolicy`].
    pub fn run(
        &self,
        root: &B,
        plan: &SearchPlan,
        pool: &WorkerPool,
        stop: &StopSignal,
    ) -> Result<SearchReport, SearchError> {
        let base = match self.config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let count = plan.determinizations;
        if matches!(plan.budget, Budget::Deadline(_)) && self.config.root_parallelisation && count > pool.threads() {
            warn!(
                trees = count,
                threads = pool.threads(),
                "fewer workers than trees under a time budget, late trees will get no time"
            );
        }

        let results: Vec<Result<TreeOutcome, TreeFailure>> = if self.config.root_parallelisation {
            let threads = pool.handle()?;
            threads.install(|| {
                (0..count)
                    .into_par_iter()
                    .with_max_len(1)
                    .map(|i| self.run_tree(root, i, &base, plan.budget, stop))
                    .collect()
            })
        } else {
            (0..count)
                .map(|i| self.run_tree(root, i, &base, plan.budget, stop))
                .collect()
        };

        let mut report = SearchReport::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => {
                    report.aggregate.add_tree(&outcome.moves);
                    report.stats.merge(&outcome.stats);
                }
                Err(failure) => match self.config.failure_policy {
                    FailurePolicy::Exclude => {
                        warn!(tree = index, reason = %failure.reason(), "excluding failed search tree");
                        report.stats.failed_trees += 1;
                    }
                    FailurePolicy::Escalate => return Err(failure.into_error(index)),
                },
            }
        }

        debug!(
            trees = report.stats.trees,
            failed = report.stats.failed_trees,
            iterations = report.stats.iterations,
            "determinizations merged"
        );
        Ok(report)
    }

    fn run_tree(
        &self,
        root: &B,
        index: usize,
        base: &GameRng,
        budget: Budget,
        stop: &StopSignal,
    ) -> Result<TreeOutcome, TreeFailure> {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            let mut rng = base.stream(index as u64);
            let board = root.duplicate(!self.config.cheating, &mut rng)?;
            TreeSearch::new(self.config, rng)
                .with_heuristic(Arc::clone(&self.heuristic))
                .with_playout(Arc::clone(&self.playout))
                .run(&board, budget, stop)
        }));
        match attempt {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(err)) => Err(TreeFailure::Error(err)),
            Err(payload) => Err(TreeFailure::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Decision entry point: configuration, pool and policies in one place.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::Move;
use crate::rules::{Board, MovePhase};

use super::budget::{DecisionKind, SearchPlan, StopSignal};
use super::config::SearchConfig;
use super::coordinator::ParallelSearch;
use super::error::SearchError;
use super::policy::{builtin_playout, HeuristicFunction, NoHeuristic, PlayoutPolicy};
use super::pool::WorkerPool;
use super::selector::{MoveSelector, RootAggregate};
use super::stats::SearchStats;

/// Result of one decision.
#[derive(Clone, Debug)]
pub struct Decision {
    pub chosen: Move,
    pub aggregate: RootAggregate,
    pub stats: SearchStats,
    /// `None` when the move was forced and no search ran.
    pub plan: Option<SearchPlan>,
}

impl Decision {
    /// Whether the move was the only legal one.
    #[must_use]
    pub fn was_forced(&self) -> bool {
        self.plan.is_none()
    }
}

/// Chooses moves for positions of one game type.
pub struct DecisionEngine<B: Board> {
    config: SearchConfig,
    pool: WorkerPool,
    heuristic: Arc<dyn HeuristicFunction<B>>,
    playout: Arc<dyn PlayoutPolicy<B>>,
    stop: StopSignal,
}

impl<B: Board> DecisionEngine<B> {
    /// Validate `config` and bind it to `pool`.
    pub fn new(config: SearchConfig, pool: WorkerPool) -> Result<Self, SearchError> {
        config.validate()?;
        let playout = builtin_playout(config.playout);
        Ok(Self {
            config,
            pool,
            heuristic: Arc::new(NoHeuristic),
            playout,
            stop: StopSignal::new(),
        })
    }

    pub fn with_heuristic(mut self, heuristic: Arc<dyn HeuristicFunction<B>>) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_playout(mut self, playout: Arc<dyn PlayoutPolicy<B>>) -> Self {
        self.playout = playout;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Signal that ends the running decision early. It is cleared when the
    /// next decision starts.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Shut down the worker pool. Other engines sharing it are affected too.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    /// Pick a move for the seat to move in `root`.
    pub fn choose_move(&mut self, root: &B, kind: DecisionKind) -> Result<Decision, SearchError> {
        if root.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }
        let legal = root.legal_moves(MovePhase::TreePolicy);
        match legal.as_slice() {
            [] => return Err(SearchError::TerminalRoot),
            [only] => {
                debug!(chosen = ?only, "single legal move");
                return Ok(Decision {
                    chosen: *only,
                    aggregate: RootAggregate::new(),
                    stats: SearchStats::default(),
                    plan: None,
                });
            }
            _ => {}
        }

        let plan = SearchPlan::new(&self.config, kind, root.has_value_estimator(), Instant::now())?;
        self.stop.reset();

        let search = ParallelSearch::new(&self.config, Arc::clone(&self.heuristic), Arc::clone(&self.playout));
        let report = search.run(root, &plan, &self.pool, &self.stop)?;

        let chosen = MoveSelector::new(self.config.final_selection)
            .select(&report.aggregate)
            .map(|best| best.mv)
            .ok_or(SearchError::Exhausted {
                determinizations: plan.determinizations,
            })?;

        debug!(aggregate = ?report.aggregate.entries(), "root statistics");
        info!(
            ?kind,
            strength = ?plan.strength,
            determinizations = plan.determinizations,
            iterations = report.stats.iterations,
            chosen = ?chosen,
            "decision made"
        );

        Ok(Decision {
            chosen,
            aggregate: report.aggregate,
            stats: report.stats,
            plan: Some(plan),
        })
    }
}

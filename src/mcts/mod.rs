//! Information-set Monte Carlo Tree Search.
//!
//! ## Overview
//!
//! Each decision samples several determinizations (complete deals consistent
//! with what the deciding seat knows), grows one independent tree per
//! determinization and merges the root statistics:
//!
//! - **Root parallelisation**: trees run on a shared [`WorkerPool`] and never
//!   share nodes
//! - **Budgets**: a fixed run count per tree, or a shared deadline
//! - **Score bounds**: optional optimistic/pessimistic bounds with pruning
//! - **Playouts**: random, rule-based or replaced by a value estimate
//! - **Reproducible**: a seeded decision gives the same move regardless of
//!   scheduling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jass_ismcts::mcts::{DecisionEngine, DecisionKind, SearchConfig, WorkerPool};
//!
//! let config = SearchConfig::default();
//! let pool = WorkerPool::for_config(&config)?;
//! let mut engine = DecisionEngine::new(config, pool)?;
//!
//! let decision = engine.choose_move(&board, DecisionKind::Card { round: 3 })?;
//! println!("playing {}", decision.chosen);
//! ```

pub mod budget;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod node;
pub mod policy;
pub mod pool;
pub mod search;
pub mod selector;
pub mod stats;
pub mod tree;

pub use budget::{Budget, DecisionKind, SearchPlan, StopSignal};
pub use config::{
    Environment, EnvironmentKind, EstimatorTuning, FailurePolicy, FinalSelectionPolicy, PlayoutKind, RunMode,
    SearchConfig, StrengthLevel,
};
pub use coordinator::{ParallelSearch, SearchReport};
pub use engine::{Decision, DecisionEngine};
pub use error::{ConfigError, SearchError};
pub use node::{Edge, MCTSNode, NodeId};
pub use policy::{
    builtin_playout, random_move, EstimatorAssisted, HeuristicFunction, LeafEvaluation, NoHeuristic,
    PlayoutPolicy, RandomPlayout, RuleBasedPlayout, UctSelection,
};
pub use pool::WorkerPool;
pub use search::{RootMoveStats, TreeOutcome, TreeSearch};
pub use selector::{MoveSelector, MoveTotals, RootAggregate};
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};

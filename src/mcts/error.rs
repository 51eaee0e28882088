//! Error types for search configuration and execution.

use thiserror::Error;

use crate::determinize::DeterminizeError;

/// Invalid parameter combination. Detected before any tree is scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("determinization count would be zero ({0})")]
    ZeroDeterminizations(&'static str),

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("{name} bias must be finite, got {value}")]
    InvalidBias { name: &'static str, value: f64 },

    #[error("num_playouts must be at least 1")]
    ZeroPlayouts,

    #[error("worker pool needs at least one thread")]
    ZeroThreads,

    #[error("run budget must be at least 1")]
    ZeroRuns,

    #[error("safety buffer of {buffer_ms}ms leaves no time of the {thinking_ms}ms budget")]
    BufferExceedsBudget { buffer_ms: u64, thinking_ms: u64 },

    #[error("estimator tuning {0} must be at least 1")]
    ZeroTuning(&'static str),
}

/// Failure to produce a decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid search configuration: {0}")]
    Config(#[from] ConfigError),

    /// No tree explored a single root move.
    #[error("no root move was explored across {determinizations} determinizations")]
    Exhausted { determinizations: usize },

    #[error("cannot search from a terminal position")]
    TerminalRoot,

    #[error("search tree {index} failed: {reason}")]
    WorkerFailed { index: usize, reason: String },

    #[error("worker pool has been shut down")]
    PoolShutDown,

    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("determinization failed: {0}")]
    Determinize(#[from] DeterminizeError),
}

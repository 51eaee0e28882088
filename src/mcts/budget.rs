//! Per-decision budget: how many trees, and when each of them stops.
//!
//! ## Budget modes
//!
//! - **Runs**: every tree executes a fixed iteration count. With the
//!   `HsluServer` preset the count is `fixed_total_runs / determinizations`
//!   so that total work does not depend on the tree count.
//! - **Time**: all trees share one deadline, `now + thinking time - buffer`.
//!   Trees check it between iterations; an iteration in flight finishes.
//!
//! Either mode also honours a [`StopSignal`], which lets the owner end a
//! decision early. Trees observe it at the same points as the deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cards::HAND_SIZE;

use super::config::{RunMode, SearchConfig, StrengthLevel};
use super::error::ConfigError;

/// What is being decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    /// Declaring trumpf before the first card.
    Trumpf,
    /// Playing a card; `round` counts completed tricks.
    Card { round: u32 },
}

/// Cooperative cancellation shared by all trees of a decision.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// When a single tree stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Budget {
    Runs(u64),
    Deadline(Instant),
}

impl Budget {
    /// Whether a tree that completed `done` iterations must stop.
    #[must_use]
    pub fn exhausted(&self, done: u64) -> bool {
        match self {
            Budget::Runs(limit) => done >= *limit,
            Budget::Deadline(deadline) => Instant::now() >= *deadline,
        }
    }
}

/// Resolved budget for one decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPlan {
    pub kind: DecisionKind,
    pub strength: StrengthLevel,
    pub determinizations: usize,
    pub budget: Budget,
}

impl SearchPlan {
    /// Derive the plan from the configuration.
    pub fn new(
        config: &SearchConfig,
        kind: DecisionKind,
        has_estimator: bool,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (strength, rounds) = match kind {
            DecisionKind::Trumpf => (config.trumpf_strength, config.trumpf_round_multiplier),
            DecisionKind::Card { round } => {
                (config.card_strength, (HAND_SIZE as u32).saturating_sub(round))
            }
        };
        if rounds == 0 {
            return Err(ConfigError::ZeroDeterminizations("no rounds remaining"));
        }

        let mut determinizations = if config.root_parallelisation {
            rounds as usize * strength.factor() as usize
        } else {
            1
        };

        let budget = match config.run_mode {
            RunMode::Time => {
                if has_estimator && config.root_parallelisation {
                    determinizations *= config.estimator_tuning.determinization_multiplier as usize;
                }
                let thinking = strength.max_thinking_time_ms().saturating_sub(config.safety_buffer_ms);
                Budget::Deadline(now + Duration::from_millis(thinking))
            }
            RunMode::Runs => {
                let mut runs = strength.runs();
                if has_estimator {
                    runs /= u64::from(config.estimator_tuning.runs_divisor);
                }
                if strength.uses_fixed_total() {
                    runs = config.fixed_total_runs / determinizations as u64;
                }
                if runs == 0 {
                    return Err(ConfigError::ZeroRuns);
                }
                Budget::Runs(runs)
            }
        };

        Ok(Self {
            kind,
            strength,
            determinizations,
            budget,
        })
    }

    /// Iterations summed over all trees, in run mode.
    #[must_use]
    pub fn total_runs(&self) -> Option<u64> {
        match self.budget {
            Budget::Runs(per_tree) => Some(per_tree * self.determinizations as u64),
            Budget::Deadline(_) => None,
        }
    }
}

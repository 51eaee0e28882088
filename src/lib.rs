//! # jass-ismcts
//!
//! An information-set Monte Carlo Tree Search engine for four-player Jass.
//!
//! ## Design Principles
//!
//! 1. **Root Parallel**: One independent tree per determinization. Trees
//!    share no nodes; their root statistics are merged once all finish.
//!
//! 2. **Reproducible**: Every tree draws from its own stream of the decision
//!    seed, so a seeded decision does not depend on thread scheduling.
//!
//! 3. **Game Contract**: The search only talks to the `Board` trait. Jass
//!    rules, heuristics and determinization live behind it.
//!
//! ## Modules
//!
//! - `core`: Seats, moves and the deterministic RNG
//! - `cards`: The 36-card deck, card sets and playing modes
//! - `rules`: The `Board` trait consumed by the search
//! - `determinize`: Information sets and sampling of hidden hands
//! - `nn`: Score and card estimator traits
//! - `mcts`: Tree search, worker pool and decision engine
//! - `games`: The Jass implementation and a ready-made player

pub mod core;
pub mod cards;
pub mod rules;
pub mod determinize;
pub mod nn;
pub mod mcts;
pub mod games;

// Re-export commonly used types
pub use crate::core::{CardMove, GameRng, Move, MoveKind, Seat, SeatMap, TrumpfMove};

pub use crate::cards::{Card, CardSet, Color, Mode, Rank};

pub use crate::rules::{Board, MovePhase, RolloutStrength};

pub use crate::determinize::{Deal, DeterminizeError, Determinizer, InformationSet};

pub use crate::nn::{CardsEstimator, EstimatorError, ScoreEstimator};

pub use crate::mcts::{
    ConfigError, Decision, DecisionEngine, DecisionKind, Environment, EnvironmentKind, FinalSelectionPolicy,
    PlayoutKind, RunMode, SearchConfig, SearchError, SearchStats, StopSignal, StrengthLevel, WorkerPool,
};

pub use crate::games::jass::{JassBoard, JassGame, JassStrategy, TrumpfSelectionMethod};

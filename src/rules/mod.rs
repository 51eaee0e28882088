//! Game-state contract for the search.
//!
//! Games implement `Board` to define:
//! - Legal moves for each position
//! - How moves modify the position
//! - Terminal test and score
//! - How hidden information is re-sampled
//!
//! The search calls into `Board` but never interprets game-specific
//! concepts directly.

pub mod board;

pub use board::{Board, MovePhase, RolloutStrength};

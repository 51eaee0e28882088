//! Four-player Jass.
//!
//! - [`JassGame`]: card play rules and scoring of one game
//! - [`JassBoard`]: the game as a searchable [`Board`](crate::rules::Board),
//!   including the trumpf declaration
//! - [`heuristics`]: rule-based declaration ratings and card refinement
//! - [`JassStrategy`]: a player that searches and falls back to the rules

mod board;
mod game;
pub mod heuristics;
mod strategy;

pub use board::JassBoard;
pub use game::{JassError, JassGame};
pub use strategy::{JassStrategy, TrumpfSelectionMethod};

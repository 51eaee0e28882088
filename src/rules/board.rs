//! The game-state contract consumed by the search.
//!
//! A `Board` is one fully determined position. The search never inspects
//! game-specific concepts; it only asks a board for its legal moves, applies
//! them, and reads the score once the game is over.
//!
//! ## Implementation Notes
//!
//! - `current_player`: `None` marks a chance node; the search then samples a
//!   move by `move_weights`
//! - `legal_moves`: empty exactly when the board is terminal
//! - `score`: one reward per seat in `[0, 1]`; shared rewards are expressed as
//!   equal fractions
//! - `duplicate(true, ..)`: re-determinizes what the searching seat cannot
//!   see, so every call must be independent of other boards

use crate::core::{GameRng, Move, Seat, SeatMap};
use crate::determinize::DeterminizeError;
use crate::nn::EstimatorError;

/// Where a move list is requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovePhase {
    /// Moves stored in the tree. Boards may prune obviously bad moves here.
    TreePolicy,
    /// Moves sampled during a rollout.
    Playout,
}

/// Cost/quality level of a domain-side rollout move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RolloutStrength {
    /// Cheap refinement of the legal moves.
    Light,
    /// More expensive, more accurate ranking.
    Heavy,
}

/// A fully determined game position.
pub trait Board: Clone + Send + Sync + 'static {
    /// Seat to act, or `None` at a chance node.
    fn current_player(&self) -> Option<Seat>;

    /// Number of seats.
    fn player_count(&self) -> usize;

    /// Terminal reward per seat.
    fn score(&self) -> SeatMap<f64>;

    /// Sampling weights aligned with `legal_moves(MovePhase::Playout)`.
    /// Only meaningful at chance nodes.
    fn move_weights(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Legal moves for the seat to act. Empty when terminal.
    fn legal_moves(&self, phase: MovePhase) -> Vec<Move>;

    /// Apply a move in place.
    fn apply_move(&mut self, mv: &Move);

    fn is_terminal(&self) -> bool;

    /// Independent deep copy. With `resample_hidden`, hidden information is
    /// sampled anew instead of copied.
    fn duplicate(&self, resample_hidden: bool, rng: &mut GameRng) -> Result<Self, DeterminizeError>;

    /// Whether `estimate_score` can replace a rollout from this position.
    fn has_value_estimator(&self) -> bool {
        false
    }

    /// Direct value estimate, one entry per seat.
    fn estimate_score(&self) -> Result<SeatMap<f64>, EstimatorError> {
        Err(EstimatorError::Unavailable)
    }

    /// Domain-side rollout move. `None` lets the caller fall back to a
    /// uniformly random legal move.
    fn best_move(&self, _strength: RolloutStrength, _rng: &mut GameRng) -> Option<Move> {
        None
    }
}

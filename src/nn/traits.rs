//! Estimator traits for learned score and card predictions.
//!
//! These traits define the call contract between the search and a learned
//! model; how the model is trained or served is up to the implementation.
//!
//! ## Thread safety
//!
//! `ScoreEstimator` and `CardsEstimator` are called concurrently from every
//! tree, so they require `Send + Sync`. Models that need exclusive access
//! implement the `Local*` variants instead and are wrapped in [`Serialized`],
//! which funnels all calls through one lock.

use parking_lot::Mutex;
use thiserror::Error;

use crate::cards::{Card, DECK_SIZE, TOTAL_POINTS};
use crate::core::Seat;
use crate::determinize::{InformationSet, SEAT_COUNT};

/// Failure to produce an estimate. Recovered locally by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("no estimator is configured")]
    Unavailable,

    #[error("estimator failed: {0}")]
    Failed(String),

    #[error("estimator returned {got} values, expected {expected}")]
    Shape { expected: usize, got: usize },
}

/// Predicts the points the team of `info.seat()` will make in this game.
pub trait ScoreEstimator: Send + Sync {
    /// Expected points in `0..=157`.
    fn predict_points(&self, info: &InformationSet) -> Result<f64, EstimatorError>;
}

/// Predicts which seat holds each unseen card.
pub trait CardsEstimator: Send + Sync {
    fn predict_beliefs(&self, info: &InformationSet) -> Result<CardBeliefs, EstimatorError>;
}

/// Non thread-safe counterpart of [`ScoreEstimator`].
pub trait LocalScoreEstimator: Send {
    fn predict_points(&mut self, info: &InformationSet) -> Result<f64, EstimatorError>;
}

/// Non thread-safe counterpart of [`CardsEstimator`].
pub trait LocalCardsEstimator: Send {
    fn predict_beliefs(&mut self, info: &InformationSet) -> Result<CardBeliefs, EstimatorError>;
}

/// Unnormalized weight per (card, seat).
#[derive(Clone, Debug, PartialEq)]
pub struct CardBeliefs {
    weights: Vec<[f64; SEAT_COUNT]>,
}

impl CardBeliefs {
    /// Equal weight for every seat.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            weights: vec![[1.0; SEAT_COUNT]; DECK_SIZE],
        }
    }

    /// Build from one row per card in deck order.
    pub fn from_rows(rows: Vec<[f64; SEAT_COUNT]>) -> Result<Self, EstimatorError> {
        if rows.len() != DECK_SIZE {
            return Err(EstimatorError::Shape {
                expected: DECK_SIZE,
                got: rows.len(),
            });
        }
        Ok(Self { weights: rows })
    }

    #[must_use]
    pub fn probability(&self, card: Card, seat: Seat) -> f64 {
        self.weights[card.index()][seat.index()]
    }

    pub fn set(&mut self, card: Card, seat: Seat, weight: f64) {
        self.weights[card.index()][seat.index()] = weight;
    }
}

/// Serializes calls to an estimator that is not safe for concurrent use.
pub struct Serialized<E> {
    inner: Mutex<E>,
}

impl<E> Serialized<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            inner: Mutex::new(estimator),
        }
    }

    pub fn into_inner(self) -> E {
        self.inner.into_inner()
    }
}

impl<E: LocalScoreEstimator> ScoreEstimator for Serialized<E> {
    fn predict_points(&self, info: &InformationSet) -> Result<f64, EstimatorError> {
        self.inner.lock().predict_points(info)
    }
}

impl<E: LocalCardsEstimator> CardsEstimator for Serialized<E> {
    fn predict_beliefs(&self, info: &InformationSet) -> Result<CardBeliefs, EstimatorError> {
        self.inner.lock().predict_beliefs(info)
    }
}

// =============================================================================
// Baseline Implementations
// =============================================================================

/// Always predicts the same number of points. Useful for testing.
#[derive(Clone, Copy, Debug)]
pub struct ConstantScore(pub f64);

impl ScoreEstimator for ConstantScore {
    fn predict_points(&self, _info: &InformationSet) -> Result<f64, EstimatorError> {
        Ok(self.0.clamp(0.0, TOTAL_POINTS as f64))
    }
}

/// Uniform beliefs over all seats.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCards;

impl CardsEstimator for UniformCards {
    fn predict_beliefs(&self, _info: &InformationSet) -> Result<CardBeliefs, EstimatorError> {
        Ok(CardBeliefs::uniform())
    }
}

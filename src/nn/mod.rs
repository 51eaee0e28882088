//! Learned estimator integration.
//!
//! ## Overview
//!
//! - **Traits**: `ScoreEstimator` (replaces rollouts with a direct value),
//!   `CardsEstimator` (beliefs over hidden cards for the determinizer)
//! - **Serialization**: `Serialized` wraps estimators that are not thread-safe
//! - **Baselines**: `ConstantScore`, `UniformCards` for testing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jass_ismcts::nn::{ConstantScore, Serialized};
//!
//! // Thread-safe models are shared directly
//! let shared = Arc::new(ConstantScore(78.5));
//!
//! // Models that need `&mut self` are serialized behind a lock
//! let local = Arc::new(Serialized::new(my_session_model));
//! ```

pub mod traits;

pub use traits::{
    CardBeliefs, CardsEstimator, ConstantScore, EstimatorError, LocalCardsEstimator,
    LocalScoreEstimator, ScoreEstimator, Serialized, UniformCards,
};

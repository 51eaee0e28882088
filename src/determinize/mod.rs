//! Determinization of hidden information.
//!
//! ## Overview
//!
//! - `InformationSet`: one seat's hand plus the public history
//! - `CardKnowledge`: colours a seat provably no longer holds
//! - `Determinizer`: samples a `Deal` consistent with an information set
//!
//! Sampling is a pure function of its inputs and the supplied `GameRng`, so
//! independent trees can determinize concurrently without synchronization.

pub mod info;
pub mod knowledge;
pub mod sampler;

use thiserror::Error;

use crate::cards::Card;
use crate::core::Seat;

pub use info::{InformationSet, SEAT_COUNT};
pub use knowledge::CardKnowledge;
pub use sampler::{Deal, Determinizer};

/// The information set does not describe a reachable position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeterminizeError {
    #[error("{seat} holds {actual} cards but {expected} are expected")]
    HandSize { seat: Seat, expected: usize, actual: usize },

    #[error("card {card} is in hand but was already played")]
    PlayedCardInHand { card: Card },

    #[error("a card appears twice in the history")]
    DuplicateCard,

    #[error("{unseen} unseen cards cannot fill {slots} open hand slots")]
    Inconsistent { unseen: usize, slots: usize },
}

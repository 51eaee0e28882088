//! Moves as a tagged union.
//!
//! A decision either declares a mode ([`TrumpfMove`]) or plays a card
//! ([`CardMove`]). Comparison and equality dispatch on the variant tag.
//!
//! ## Ordering
//!
//! Two card moves order by their cards. Trumpf moves carry no ordering and
//! compare as equal rank. Moves of different kinds order by [`MoveKind`].
//! This order is only used to break ties deterministically.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::player::Seat;
use crate::cards::{Card, Mode};

/// Discriminator of a [`Move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Trumpf,
    Card,
}

/// A seat plays a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardMove {
    pub player: Seat,
    pub card: Card,
}

impl CardMove {
    #[must_use]
    pub const fn new(player: Seat, card: Card) -> Self {
        Self { player, card }
    }
}

/// A seat declares the mode (or shifts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrumpfMove {
    pub player: Seat,
    pub mode: Mode,
}

impl TrumpfMove {
    #[must_use]
    pub const fn new(player: Seat, mode: Mode) -> Self {
        Self { player, mode }
    }
}

/// A move chosen by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Card(CardMove),
    Trumpf(TrumpfMove),
}

impl Move {
    #[must_use]
    pub const fn card(player: Seat, card: Card) -> Self {
        Move::Card(CardMove::new(player, card))
    }

    #[must_use]
    pub const fn trumpf(player: Seat, mode: Mode) -> Self {
        Move::Trumpf(TrumpfMove::new(player, mode))
    }

    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        match self {
            Move::Card(_) => MoveKind::Card,
            Move::Trumpf(_) => MoveKind::Trumpf,
        }
    }

    /// Seat making the move.
    #[must_use]
    pub const fn player(&self) -> Seat {
        match self {
            Move::Card(m) => m.player,
            Move::Trumpf(m) => m.player,
        }
    }

    #[must_use]
    pub const fn as_card(&self) -> Option<&CardMove> {
        match self {
            Move::Card(m) => Some(m),
            Move::Trumpf(_) => None,
        }
    }

    #[must_use]
    pub const fn as_trumpf(&self) -> Option<&TrumpfMove> {
        match self {
            Move::Trumpf(m) => Some(m),
            Move::Card(_) => None,
        }
    }

    /// Tie-break order used by the search. See the module docs.
    #[must_use]
    pub fn search_cmp(&self, other: &Move) -> Ordering {
        match (self, other) {
            (Move::Card(a), Move::Card(b)) => a.card.cmp(&b.card),
            (Move::Trumpf(_), Move::Trumpf(_)) => Ordering::Equal,
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Card(m) => write!(f, "{} plays {}", m.player, m.card),
            Move::Trumpf(m) => write!(f, "{} declares {}", m.player, m.mode),
        }
    }
}

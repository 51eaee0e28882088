//! What one seat knows: its own hand plus the public history.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::DeterminizeError;
use crate::cards::{CardSet, Mode, HAND_SIZE};
use crate::core::{CardMove, Seat};

/// Seats at a Jass table.
pub const SEAT_COUNT: usize = 4;

/// Immutable view of the game from one seat.
///
/// `history` holds every card played so far in order; trick `k` consists of
/// entries `4k..4k+4` and is led by the first of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InformationSet {
    seat: Seat,
    hand: CardSet,
    mode: Option<Mode>,
    first_leader: Seat,
    history: Vector<CardMove>,
}

impl InformationSet {
    /// Information before any card is played. `mode` is `None` while the
    /// declaration is still open.
    pub fn new(seat: Seat, hand: CardSet, mode: Option<Mode>, first_leader: Seat) -> Self {
        Self {
            seat,
            hand,
            mode,
            first_leader,
            history: Vector::new(),
        }
    }

    /// Replace the public history.
    pub fn with_history(mut self, history: Vector<CardMove>) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn seat(&self) -> Seat {
        self.seat
    }

    #[must_use]
    pub fn hand(&self) -> CardSet {
        self.hand
    }

    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    #[must_use]
    pub fn first_leader(&self) -> Seat {
        self.first_leader
    }

    #[must_use]
    pub fn history(&self) -> &Vector<CardMove> {
        &self.history
    }

    /// Cards already on the table or in completed tricks.
    #[must_use]
    pub fn played_cards(&self) -> CardSet {
        self.history.iter().map(|m| m.card).collect()
    }

    /// Number of cards `seat` has played.
    #[must_use]
    pub fn played_by(&self, seat: Seat) -> usize {
        self.history.iter().filter(|m| m.player == seat).count()
    }

    /// Cards `seat` still holds.
    #[must_use]
    pub fn hand_size(&self, seat: Seat) -> usize {
        HAND_SIZE.saturating_sub(self.played_by(seat))
    }

    /// Cards this seat cannot see: neither in its hand nor played.
    #[must_use]
    pub fn unseen_cards(&self) -> CardSet {
        CardSet::full() - self.hand - self.played_cards()
    }

    /// The history split into tricks; the last one may be incomplete.
    #[must_use]
    pub fn tricks(&self) -> Vec<Vec<CardMove>> {
        let moves: Vec<CardMove> = self.history.iter().copied().collect();
        moves.chunks(SEAT_COUNT).map(<[CardMove]>::to_vec).collect()
    }

    /// Check that hand and history describe a reachable position.
    pub fn validate(&self) -> Result<(), DeterminizeError> {
        let played = self.played_cards();
        if played.len() != self.history.len() {
            return Err(DeterminizeError::DuplicateCard);
        }
        if let Some(card) = (self.hand & played).iter().next() {
            return Err(DeterminizeError::PlayedCardInHand { card });
        }
        let expected = self.hand_size(self.seat);
        if self.hand.len() != expected {
            return Err(DeterminizeError::HandSize {
                seat: self.seat,
                expected,
                actual: self.hand.len(),
            });
        }
        let slots: usize = Seat::all(SEAT_COUNT)
            .filter(|s| *s != self.seat)
            .map(|s| self.hand_size(s))
            .sum();
        let unseen = self.unseen_cards().len();
        if unseen != slots {
            return Err(DeterminizeError::Inconsistent { unseen, slots });
        }
        Ok(())
    }
}

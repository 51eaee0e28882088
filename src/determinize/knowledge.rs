//! Cards a seat provably does not hold, inferred from the history.
//!
//! A seat that neither led nor followed the lead colour, and did not play
//! trumpf, holds no card of the lead colour. When trumpf was led the trumpf
//! jack is exempt since it may be withheld.

use super::info::{InformationSet, SEAT_COUNT};
use crate::cards::{Card, CardSet, Rank};
use crate::core::Seat;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardKnowledge {
    excluded: [CardSet; SEAT_COUNT],
}

impl CardKnowledge {
    pub fn infer(info: &InformationSet) -> Self {
        let mut knowledge = Self::default();
        let trumpf = info.mode().and_then(|m| m.trumpf_color());

        for trick in info.tricks() {
            let Some(lead) = trick.first().map(|m| m.card.color) else {
                continue;
            };
            for mv in trick.iter().skip(1) {
                let followed = mv.card.color == lead;
                let trumped = Some(mv.card.color) == trumpf;
                if followed || trumped {
                    continue;
                }
                let mut void = CardSet::color(lead);
                if Some(lead) == trumpf {
                    void.remove(Card::new(lead, Rank::Jack));
                }
                let excluded = &mut knowledge.excluded[mv.player.index()];
                *excluded = *excluded | void;
            }
        }

        knowledge
    }

    /// Cards `seat` cannot hold.
    #[must_use]
    pub fn excluded(&self, seat: Seat) -> CardSet {
        self.excluded[seat.index()]
    }

    #[must_use]
    pub fn may_hold(&self, seat: Seat, card: Card) -> bool {
        !self.excluded(seat).contains(card)
    }
}

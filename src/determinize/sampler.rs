//! Sampling concrete deals consistent with an information set.
//!
//! ## Algorithm
//!
//! Without learned beliefs and with no seat ruled out of any unseen card,
//! the unseen cards are shuffled and cut into the missing hands.
//!
//! Otherwise unseen cards are handed out one at a time in random order,
//! always picking the card with the fewest seats that may still receive
//! it. The receiving seat is drawn in proportion to its free slots times
//! the per-card weight: uniform by default, or the beliefs of a
//! [`CardsEstimator`]. Seats that cannot hold a card (see
//! [`CardKnowledge`]) get weight zero.
//!
//! Should the constraints lead into a dead end repeatedly, the deal falls
//! back to a uniform shuffle that only respects hand sizes.

use std::sync::Arc;

use tracing::warn;

use super::info::{InformationSet, SEAT_COUNT};
use super::knowledge::CardKnowledge;
use super::DeterminizeError;
use crate::cards::{Card, CardSet, DECK_SIZE};
use crate::core::{GameRng, Seat};
use crate::nn::CardsEstimator;

const DEFAULT_MAX_ATTEMPTS: usize = 16;

/// One hand per seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Deal {
    hands: [CardSet; SEAT_COUNT],
}

impl Deal {
    #[must_use]
    pub fn new(hands: [CardSet; SEAT_COUNT]) -> Self {
        Self { hands }
    }

    /// Deal a shuffled deck, nine cards per seat.
    pub fn random(rng: &mut GameRng) -> Self {
        let mut deck: Vec<Card> = Card::deck().collect();
        rng.shuffle(&mut deck);
        let mut hands = [CardSet::empty(); SEAT_COUNT];
        for (i, chunk) in deck.chunks(DECK_SIZE / SEAT_COUNT).enumerate() {
            hands[i] = chunk.iter().copied().collect();
        }
        Self { hands }
    }

    #[must_use]
    pub fn hand(&self, seat: Seat) -> CardSet {
        self.hands[seat.index()]
    }

    #[must_use]
    pub fn hands(&self) -> [CardSet; SEAT_COUNT] {
        self.hands
    }
}

/// Produces determinizations. Holds no per-call state, so one instance can
/// be shared by all trees.
#[derive(Clone)]
pub struct Determinizer {
    cards_estimator: Option<Arc<dyn CardsEstimator>>,
    max_attempts: usize,
}

impl Default for Determinizer {
    fn default() -> Self {
        Self {
            cards_estimator: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl std::fmt::Debug for Determinizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Determinizer")
            .field("cards_estimator", &self.cards_estimator.is_some())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl Determinizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use learned beliefs instead of uniform card distributions.
    pub fn with_cards_estimator(mut self, estimator: Arc<dyn CardsEstimator>) -> Self {
        self.cards_estimator = Some(estimator);
        self
    }

    /// Constrained attempts before falling back to a uniform deal.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sample the hidden hands. The seat's own hand is kept as is.
    pub fn sample(&self, info: &InformationSet, rng: &mut GameRng) -> Result<Deal, DeterminizeError> {
        info.validate()?;

        let unseen = info.unseen_cards();
        let mut capacity = [0usize; SEAT_COUNT];
        for seat in Seat::all(SEAT_COUNT).filter(|s| *s != info.seat()) {
            capacity[seat.index()] = info.hand_size(seat);
        }

        let knowledge = CardKnowledge::infer(info);
        let unrestricted = Seat::all(SEAT_COUNT)
            .all(|seat| capacity[seat.index()] == 0 || (knowledge.excluded(seat) & unseen).is_empty());
        if self.cards_estimator.is_none() && unrestricted {
            return Ok(sample_uniform(info, unseen, capacity, rng));
        }
        let weights = self.card_weights(info, &knowledge, unseen);

        for _ in 0..self.max_attempts {
            if let Some(deal) = sample_constrained(info, unseen, capacity, &weights, rng) {
                return Ok(deal);
            }
        }

        warn!(
            seat = info.seat().index(),
            attempts = self.max_attempts,
            "card knowledge could not be satisfied, dealing unseen cards uniformly"
        );
        Ok(sample_uniform(info, unseen, capacity, rng))
    }

    fn card_weights(
        &self,
        info: &InformationSet,
        knowledge: &CardKnowledge,
        unseen: CardSet,
    ) -> [[f64; SEAT_COUNT]; DECK_SIZE] {
        let beliefs = self.cards_estimator.as_ref().and_then(|estimator| {
            estimator
                .predict_beliefs(info)
                .map_err(|err| warn!(%err, "cards estimator failed, using uniform beliefs"))
                .ok()
        });

        let mut weights = [[0.0; SEAT_COUNT]; DECK_SIZE];
        for card in unseen {
            let row = &mut weights[card.index()];
            for seat in Seat::all(SEAT_COUNT) {
                if seat == info.seat() || !knowledge.may_hold(seat, card) {
                    continue;
                }
                row[seat.index()] = match &beliefs {
                    Some(b) => b.probability(card, seat).max(0.0),
                    None => 1.0,
                };
            }
            if row.iter().sum::<f64>() <= 0.0 {
                // Learned beliefs ruled out every allowed seat.
                for seat in Seat::all(SEAT_COUNT) {
                    if seat != info.seat() && knowledge.may_hold(seat, card) {
                        row[seat.index()] = 1.0;
                    }
                }
            }
        }
        weights
    }
}

fn sample_constrained(
    info: &InformationSet,
    unseen: CardSet,
    mut open: [usize; SEAT_COUNT],
    weights: &[[f64; SEAT_COUNT]; DECK_SIZE],
    rng: &mut GameRng,
) -> Option<Deal> {
    let mut hands = [CardSet::empty(); SEAT_COUNT];
    hands[info.seat().index()] = info.hand();
    let mut remaining: Vec<Card> = unseen.iter().collect();
    rng.shuffle(&mut remaining);

    let candidates = |card: Card, open: &[usize; SEAT_COUNT]| {
        (0..SEAT_COUNT)
            .filter(|&s| open[s] > 0 && weights[card.index()][s] > 0.0)
            .count()
    };

    while !remaining.is_empty() {
        let (pos, count) = remaining
            .iter()
            .enumerate()
            .map(|(i, card)| (i, candidates(*card, &open)))
            .min_by_key(|(_, count)| *count)?;
        if count == 0 {
            return None;
        }

        let card = remaining.swap_remove(pos);
        let seat_weights: Vec<f64> = (0..SEAT_COUNT)
            .map(|s| open[s] as f64 * weights[card.index()][s])
            .collect();
        let seat = rng.choose_weighted(&seat_weights)?;
        hands[seat].insert(card);
        open[seat] -= 1;
    }

    Some(Deal { hands })
}

fn sample_uniform(
    info: &InformationSet,
    unseen: CardSet,
    capacity: [usize; SEAT_COUNT],
    rng: &mut GameRng,
) -> Deal {
    let mut hands = [CardSet::empty(); SEAT_COUNT];
    hands[info.seat().index()] = info.hand();

    let mut cards: Vec<Card> = unseen.iter().collect();
    rng.shuffle(&mut cards);
    let mut cards = cards.into_iter();
    for (seat, slots) in capacity.iter().enumerate() {
        hands[seat] = hands[seat] | cards.by_ref().take(*slots).collect::<CardSet>();
    }
    Deal { hands }
}

//! Bitset of cards.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not, Sub};

use super::card::{Card, Color, DECK_SIZE};

const FULL_MASK: u64 = (1 << DECK_SIZE) - 1;

/// A set of cards stored as a 36-bit mask. Iterates in deck order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSet(u64);

impl CardSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The whole deck.
    #[must_use]
    pub const fn full() -> Self {
        Self(FULL_MASK)
    }

    /// All nine cards of one colour.
    #[must_use]
    pub const fn color(color: Color) -> Self {
        Self(0x1FF << (color.index() * 9))
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn insert(&mut self, card: Card) {
        self.0 |= 1 << card.index();
    }

    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1 << card.index());
    }

    #[must_use]
    pub const fn contains(self, card: Card) -> bool {
        self.0 & (1 << card.index()) != 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Cards of the given colour.
    #[must_use]
    pub const fn of_color(self, color: Color) -> Self {
        Self(self.0 & Self::color(color).0)
    }

    /// Whether `self` is contained in `other`.
    #[must_use]
    pub const fn is_subset(self, other: CardSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(self) -> CardSetIter {
        CardSetIter(self.0)
    }

    /// The highest card by `key`, if any.
    pub fn max_by_key<K: Ord>(self, key: impl Fn(Card) -> K) -> Option<Card> {
        self.iter().max_by_key(|c| key(*c))
    }

    /// The lowest card by `key`, if any.
    pub fn min_by_key<K: Ord>(self, key: impl Fn(Card) -> K) -> Option<Card> {
        self.iter().min_by_key(|c| key(*c))
    }

    /// Cards for which `predicate` holds.
    #[must_use]
    pub fn filter(self, predicate: impl Fn(Card) -> bool) -> Self {
        self.iter().filter(|c| predicate(*c)).collect()
    }
}

impl std::fmt::Debug for CardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.to_string())).finish()
    }
}

impl BitOr for CardSet {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for CardSet {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Sub for CardSet {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}

impl Not for CardSet {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0 & FULL_MASK)
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = CardSet::empty();
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIter;

    fn into_iter(self) -> CardSetIter {
        self.iter()
    }
}

/// Iterator over a [`CardSet`] in deck order.
pub struct CardSetIter(u64);

impl Iterator for CardSetIter {
    type Item = Card;

    fn next(&mut self) -> Option<Card> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Card::from_index(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CardSetIter {}

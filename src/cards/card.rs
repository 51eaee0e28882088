//! The 36-card Jass deck.

use serde::{Deserialize, Serialize};

/// Number of cards in a Jass deck.
pub const DECK_SIZE: usize = 36;

/// Cards each seat is dealt.
pub const HAND_SIZE: usize = 9;

/// Card colour (suit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Color {
    /// All colours in deck order.
    pub const ALL: [Color; 4] = [Color::Hearts, Color::Diamonds, Color::Clubs, Color::Spades];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Color::Hearts => 'H',
            Color::Diamonds => 'D',
            Color::Clubs => 'C',
            Color::Spades => 'S',
        }
    }
}

/// Card value, ordered by plain (non-trumpf) strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 9] = [
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Plain strength from 1 (six) to 9 (ace).
    #[must_use]
    pub const fn strength(self) -> u8 {
        self as u8 + 1
    }

    /// Strength when the card's colour is trumpf: jack (Puur) 9, nine (Nell) 8,
    /// then ace down to six.
    #[must_use]
    pub const fn trumpf_strength(self) -> u8 {
        match self {
            Rank::Six => 1,
            Rank::Seven => 2,
            Rank::Eight => 3,
            Rank::Ten => 4,
            Rank::Queen => 5,
            Rank::King => 6,
            Rank::Ace => 7,
            Rank::Nine => 8,
            Rank::Jack => 9,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A single card. Ordered by colour, then rank (deck order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    pub rank: Rank,
}

impl Card {
    #[must_use]
    pub const fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }

    /// Position in the deck, `0..36`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.color.index() * 9 + self.rank as usize
    }

    /// Inverse of [`Card::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= DECK_SIZE {
            return None;
        }
        Some(Self::new(Color::ALL[index / 9], Rank::ALL[index % 9]))
    }

    /// Every card in deck order.
    pub fn deck() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).filter_map(Card::from_index)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.color.symbol(), self.rank.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_covers_deck() {
        let deck: Vec<_> = Card::deck().collect();
        assert_eq!(deck.len(), DECK_SIZE);
        for (i, card) in deck.iter().enumerate() {
            assert_eq!(card.index(), i);
        }
        assert!(Card::from_index(DECK_SIZE).is_none());
    }

    #[test]
    fn test_trumpf_strength_order() {
        assert!(Rank::Jack.trumpf_strength() > Rank::Nine.trumpf_strength());
        assert!(Rank::Nine.trumpf_strength() > Rank::Ace.trumpf_strength());
        assert!(Rank::Ace.trumpf_strength() > Rank::Ten.trumpf_strength());
    }

    #[test]
    fn test_card_order_is_colour_then_rank() {
        let h_ace = Card::new(Color::Hearts, Rank::Ace);
        let d_six = Card::new(Color::Diamonds, Rank::Six);
        assert!(h_ace < d_six);
        assert_eq!(format!("{}", h_ace), "HA");
    }
}

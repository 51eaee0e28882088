//! Playing modes: trumpf colour, top-down (Obeabe), bottom-up (Undeufe),
//! and the shift declaration.
//!
//! The mode decides card points, which card wins a trick and which cards
//! may legally be played.

use serde::{Deserialize, Serialize};

use super::card::{Card, Color, Rank};
use super::set::CardSet;

/// Points awarded to the team winning the last trick.
pub const LAST_TRICK_BONUS: u32 = 5;

/// Points available in one game (all cards plus the last trick bonus).
pub const TOTAL_POINTS: u32 = 157;

/// Mode declared for a game.
///
/// `Shift` passes the declaration to the partner; it never becomes the
/// playing mode and is scored like `TopDown` if queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    Trumpf(Color),
    TopDown,
    BottomUp,
    Shift,
}

impl Mode {
    /// The six playable modes.
    pub const STANDARD: [Mode; 6] = [
        Mode::Trumpf(Color::Hearts),
        Mode::Trumpf(Color::Diamonds),
        Mode::Trumpf(Color::Clubs),
        Mode::Trumpf(Color::Spades),
        Mode::TopDown,
        Mode::BottomUp,
    ];

    #[must_use]
    pub const fn trumpf_color(self) -> Option<Color> {
        match self {
            Mode::Trumpf(color) => Some(color),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_trumpf(self, card: Card) -> bool {
        self.trumpf_color() == Some(card.color)
    }

    /// Points the card is worth in this mode.
    #[must_use]
    pub fn points(self, card: Card) -> u32 {
        match self {
            Mode::Trumpf(trumpf) if card.color == trumpf => match card.rank {
                Rank::Jack => 20,
                Rank::Nine => 14,
                Rank::Ace => 11,
                Rank::Ten => 10,
                Rank::King => 4,
                Rank::Queen => 3,
                _ => 0,
            },
            Mode::Trumpf(_) => match card.rank {
                Rank::Ace => 11,
                Rank::Ten => 10,
                Rank::King => 4,
                Rank::Queen => 3,
                Rank::Jack => 2,
                _ => 0,
            },
            Mode::BottomUp => match card.rank {
                Rank::Six => 11,
                Rank::Ace => 0,
                _ => Mode::TopDown.points(card),
            },
            Mode::TopDown | Mode::Shift => match card.rank {
                Rank::Ace => 11,
                Rank::Ten => 10,
                Rank::Eight => 8,
                Rank::King => 4,
                Rank::Queen => 3,
                Rank::Jack => 2,
                _ => 0,
            },
        }
    }

    /// Sum of points of the given cards.
    #[must_use]
    pub fn points_of(self, cards: impl IntoIterator<Item = Card>) -> u32 {
        cards.into_iter().map(|c| self.points(c)).sum()
    }

    /// Strength of `card` inside a trick led with `lead`. Cards that neither
    /// follow the lead nor are trumpf have strength 0 and can never win.
    #[must_use]
    pub fn trick_strength(self, card: Card, lead: Color) -> u8 {
        if self.is_trumpf(card) {
            return 100 + card.rank.trumpf_strength();
        }
        if card.color != lead {
            return 0;
        }
        match self {
            Mode::BottomUp => 10 - card.rank.strength(),
            _ => card.rank.strength(),
        }
    }

    /// Index of the winning card of a (possibly incomplete) trick.
    #[must_use]
    pub fn winning_index(self, trick: &[Card]) -> Option<usize> {
        let lead = trick.first()?.color;
        trick
            .iter()
            .enumerate()
            .max_by_key(|(_, card)| self.trick_strength(**card, lead))
            .map(|(i, _)| i)
    }

    /// Whether `card` would take the lead from the current trick.
    #[must_use]
    pub fn beats_trick(self, card: Card, trick: &[Card]) -> bool {
        let Some(lead) = trick.first().map(|c| c.color) else {
            return true;
        };
        let best = trick
            .iter()
            .map(|c| self.trick_strength(*c, lead))
            .max()
            .unwrap_or(0);
        self.trick_strength(card, lead) > best
    }

    /// Cards of `hand` that may legally be played onto `trick`.
    #[must_use]
    pub fn playable(self, hand: CardSet, trick: &[Card]) -> CardSet {
        let Some(lead) = trick.first().map(|c| c.color) else {
            return hand;
        };
        let following = hand.of_color(lead);

        let Some(trumpf) = self.trumpf_color() else {
            return if following.is_empty() { hand } else { following };
        };

        let trumps = hand.of_color(trumpf);
        if trumps == hand {
            return hand;
        }

        if lead == trumpf {
            let only_puur = trumps.len() == 1 && trumps.contains(Card::new(trumpf, Rank::Jack));
            return if trumps.is_empty() || only_puur { hand } else { trumps };
        }

        // No undertrumping once a trumpf lies in the trick.
        let highest_trumpf = trick
            .iter()
            .filter(|c| c.color == trumpf)
            .map(|c| c.rank.trumpf_strength())
            .max();
        let allowed_trumps = match highest_trumpf {
            Some(highest) => trumps.filter(|c| c.rank.trumpf_strength() > highest),
            None => trumps,
        };

        if following.is_empty() {
            (hand - trumps) | allowed_trumps
        } else {
            following | allowed_trumps
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Trumpf(color) => write!(f, "Trumpf({:?})", color),
            Mode::TopDown => write!(f, "TopDown"),
            Mode::BottomUp => write!(f, "BottomUp"),
            Mode::Shift => write!(f, "Shift"),
        }
    }
}

//! Card primitives: the Jass deck, card sets and playing modes.
//!
//! ## Key Types
//!
//! - `Card`: colour + rank, ordered in deck order
//! - `CardSet`: 36-bit set of cards, cheap to copy
//! - `Mode`: trumpf colour, top-down, bottom-up, or the shift declaration

pub mod card;
pub mod mode;
pub mod set;

pub use card::{Card, Color, Rank, DECK_SIZE, HAND_SIZE};
pub use mode::{Mode, LAST_TRICK_BONUS, TOTAL_POINTS};
pub use set::{CardSet, CardSetIter};

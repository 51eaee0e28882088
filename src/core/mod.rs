//! Core types: seats, moves and the deterministic RNG.
//!
//! These building blocks are shared by the rules, the determinizer and the
//! search.

pub mod action;
pub mod player;
pub mod rng;

pub use action::{CardMove, Move, MoveKind, TrumpfMove};
pub use player::{Seat, SeatMap};
pub use rng::GameRng;

//! Seat identification and per-seat data storage.
//!
//! ## Seat
//!
//! Type-safe seat identifier. Jass is played by four seats, where seats
//! `0 & 2` and `1 & 3` form the two teams.
//!
//! ## SeatMap
//!
//! Per-seat data backed by `Vec` for O(1) access. Score vectors returned by
//! a board and accumulated in search nodes are `SeatMap<f64>`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier. Seats are 0-based and assigned in playing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(pub u8);

impl Seat {
    /// Create a new seat.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat acting after this one.
    #[must_use]
    pub const fn next(self, seat_count: usize) -> Self {
        Self(((self.0 as usize + 1) % seat_count) as u8)
    }

    /// The seat sitting opposite this one (the partner in a four-seat game).
    #[must_use]
    pub const fn partner(self, seat_count: usize) -> Self {
        Self(((self.0 as usize + seat_count / 2) % seat_count) as u8)
    }

    /// Team index: seats with equal parity play together.
    #[must_use]
    pub const fn team(self) -> usize {
        self.0 as usize % 2
    }

    /// Whether both seats play for the same team.
    #[must_use]
    pub const fn is_teammate(self, other: Seat) -> bool {
        self.team() == other.team()
    }

    /// Iterate over all seats for a game with `seat_count` seats.
    ///
    /// ```
    /// use jass_ismcts::core::Seat;
    ///
    /// let seats: Vec<_> = Seat::all(4).collect();
    /// assert_eq!(seats.len(), 4);
    /// assert_eq!(seats[3], Seat::new(3));
    /// ```
    pub fn all(seat_count: usize) -> impl Iterator<Item = Seat> {
        (0..seat_count as u8).map(Seat)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use jass_ismcts::core::{Seat, SeatMap};
///
/// let mut score: SeatMap<f64> = SeatMap::with_value(4, 0.0);
/// score[Seat::new(1)] = 0.75;
/// assert_eq!(score[Seat::new(1)], 0.75);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatMap<T> {
    data: Vec<T>,
}

impl<T> SeatMap<T> {
    /// Create a new map with values from a factory function.
    pub fn new(seat_count: usize, factory: impl Fn(Seat) -> T) -> Self {
        assert!(seat_count > 0, "Must have at least 1 seat");
        assert!(seat_count <= 255, "At most 255 seats supported");

        let data = (0..seat_count as u8).map(|i| factory(Seat(i))).collect();
        Self { data }
    }

    /// Create a new map with all entries set to the same value.
    pub fn with_value(seat_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(seat_count, |_| value.clone())
    }

    /// Build a map from one value per seat, in seat order.
    pub fn from_vec(data: Vec<T>) -> Self {
        assert!(!data.is_empty(), "Must have at least 1 seat");
        Self { data }
    }

    /// Number of seats.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }

    /// Iterate over (Seat, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (Seat(i as u8), v))
    }

    /// Values in seat order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl SeatMap<f64> {
    /// Add another score vector entry by entry.
    pub fn accumulate(&mut self, other: &SeatMap<f64>) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (mine, theirs) in self.data.iter_mut().zip(&other.data) {
            *mine += theirs;
        }
    }

    /// Divide every entry by `divisor`.
    pub fn scale_down(&mut self, divisor: f64) {
        for value in &mut self.data {
            *value /= divisor;
        }
    }
}

impl<T> Index<Seat> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for SeatMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_navigation() {
        let seat = Seat::new(3);
        assert_eq!(seat.next(4), Seat::new(0));
        assert_eq!(seat.partner(4), Seat::new(1));
        assert_eq!(Seat::new(0).partner(4), Seat::new(2));
        assert_eq!(format!("{}", seat), "Seat 3");
    }

    #[test]
    fn test_teams() {
        assert!(Seat::new(0).is_teammate(Seat::new(2)));
        assert!(Seat::new(1).is_teammate(Seat::new(3)));
        assert!(!Seat::new(0).is_teammate(Seat::new(1)));
    }

    #[test]
    fn test_seat_map_new() {
        let map: SeatMap<i32> = SeatMap::new(4, |s| s.index() as i32 * 10);
        assert_eq!(map[Seat::new(0)], 0);
        assert_eq!(map[Seat::new(3)], 30);
        assert_eq!(map.seat_count(), 4);
    }

    #[test]
    fn test_accumulate_and_scale() {
        let mut total = SeatMap::with_value(2, 0.0);
        total.accumulate(&SeatMap::from_vec(vec![1.0, 0.0]));
        total.accumulate(&SeatMap::from_vec(vec![0.5, 0.5]));
        total.scale_down(2.0);
        assert_eq!(total.as_slice(), &[0.75, 0.25]);
    }

    #[test]
    fn test_seat_map_serialization() {
        let map: SeatMap<f64> = SeatMap::new(2, |s| s.index() as f64 + 0.5);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: SeatMap<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 seat")]
    fn test_seat_map_zero_seats() {
        let _: SeatMap<i32> = SeatMap::with_value(0, 0);
    }
}

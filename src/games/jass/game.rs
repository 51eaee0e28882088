//! Card play rules of one Jass game.

use im::Vector;
use smallvec::SmallVec;
use thiserror::Error;

use crate::cards::{Card, CardSet, Mode, HAND_SIZE, LAST_TRICK_BONUS, TOTAL_POINTS};
use crate::core::{CardMove, Seat, SeatMap};
use crate::determinize::{InformationSet, SEAT_COUNT};

/// A card that cannot be played in the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JassError {
    #[error("the game is already finished")]
    GameOver,

    #[error("{got} played but it is {expected}'s turn")]
    NotYourTurn { expected: Seat, got: Seat },

    #[error("{card} is not in the hand of {seat}")]
    NotInHand { seat: Seat, card: Card },

    #[error("{card} may not be played onto the current trick")]
    IllegalCard { card: Card },
}

/// Card play of one game, after the mode has been declared.
///
/// Holds every hand, so a `JassGame` is always a complete deal. Seats that
/// cannot see each other are modelled by re-dealing hands through the
/// determinizer, not by hiding them here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JassGame {
    hands: [CardSet; SEAT_COUNT],
    mode: Mode,
    shifted: bool,
    first_leader: Seat,
    leader: Seat,
    trick: SmallVec<[CardMove; SEAT_COUNT]>,
    history: Vector<CardMove>,
    team_points: [u32; 2],
    tricks_completed: u32,
}

impl JassGame {
    /// A fresh game. `first_leader` plays the first card.
    pub fn new(hands: [CardSet; SEAT_COUNT], mode: Mode, first_leader: Seat) -> Self {
        Self {
            hands,
            mode,
            shifted: false,
            first_leader,
            leader: first_leader,
            trick: SmallVec::new(),
            history: Vector::new(),
            team_points: [0; 2],
            tricks_completed: 0,
        }
    }

    /// Mark the mode as declared by the partner after a shift.
    pub fn with_shifted(mut self, shifted: bool) -> Self {
        self.shifted = shifted;
        self
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn shifted(&self) -> bool {
        self.shifted
    }

    #[must_use]
    pub fn first_leader(&self) -> Seat {
        self.first_leader
    }

    #[must_use]
    pub fn hand(&self, seat: Seat) -> CardSet {
        self.hands[seat.index()]
    }

    #[must_use]
    pub fn hands(&self) -> [CardSet; SEAT_COUNT] {
        self.hands
    }

    /// Swap in a new deal of the cards still held. Play history is kept.
    pub fn replace_hands(&mut self, hands: [CardSet; SEAT_COUNT]) {
        debug_assert_eq!(
            hands.iter().fold(CardSet::empty(), |acc, h| acc | *h),
            self.hands.iter().fold(CardSet::empty(), |acc, h| acc | *h)
        );
        self.hands = hands;
    }

    /// Every card played so far, in order.
    #[must_use]
    pub fn history(&self) -> &Vector<CardMove> {
        &self.history
    }

    #[must_use]
    pub fn current_trick(&self) -> &[CardMove] {
        &self.trick
    }

    #[must_use]
    pub fn trick_cards(&self) -> SmallVec<[Card; SEAT_COUNT]> {
        self.trick.iter().map(|m| m.card).collect()
    }

    #[must_use]
    pub fn played_cards(&self) -> CardSet {
        self.history.iter().map(|m| m.card).collect()
    }

    /// Completed tricks.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.tricks_completed
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tricks_completed as usize >= HAND_SIZE
    }

    /// Seat to play, `None` once all tricks are played.
    #[must_use]
    pub fn current_player(&self) -> Option<Seat> {
        if self.is_finished() {
            return None;
        }
        Some(Seat::new(
            ((self.leader.index() + self.trick.len()) % SEAT_COUNT) as u8,
        ))
    }

    /// Seat currently taking the trick.
    #[must_use]
    pub fn trick_winner(&self) -> Option<Seat> {
        let cards = self.trick_cards();
        self.mode.winning_index(&cards).map(|i| self.trick[i].player)
    }

    /// Card points lying in the current trick.
    #[must_use]
    pub fn trick_points(&self) -> u32 {
        self.mode.points_of(self.trick.iter().map(|m| m.card))
    }

    #[must_use]
    pub fn team_points(&self, team: usize) -> u32 {
        self.team_points[team]
    }

    /// Cards the seat to play may play.
    #[must_use]
    pub fn legal_cards(&self) -> CardSet {
        match self.current_player() {
            Some(seat) => self.mode.playable(self.hand(seat), &self.trick_cards()),
            None => CardSet::empty(),
        }
    }

    /// Play `card` for `seat`, closing the trick once four cards lie.
    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), JassError> {
        let expected = self.current_player().ok_or(JassError::GameOver)?;
        if seat != expected {
            return Err(JassError::NotYourTurn { expected, got: seat });
        }
        if !self.hand(seat).contains(card) {
            return Err(JassError::NotInHand { seat, card });
        }
        if !self.legal_cards().contains(card) {
            return Err(JassError::IllegalCard { card });
        }

        self.hands[seat.index()].remove(card);
        let mv = CardMove::new(seat, card);
        self.trick.push(mv);
        self.history.push_back(mv);

        if self.trick.len() == SEAT_COUNT {
            self.close_trick();
        }
        Ok(())
    }

    fn close_trick(&mut self) {
        let Some(winner) = self.trick_winner() else {
            return;
        };
        let mut points = self.trick_points();
        self.tricks_completed += 1;
        if self.is_finished() {
            points += LAST_TRICK_BONUS;
        }
        self.team_points[winner.team()] += points;
        self.leader = winner;
        self.trick.clear();
    }

    /// Each seat's share of the points made by its team, in `[0, 1]`.
    #[must_use]
    pub fn score(&self) -> SeatMap<f64> {
        SeatMap::new(SEAT_COUNT, |seat| {
            f64::from(self.team_points[seat.team()]) / f64::from(TOTAL_POINTS)
        })
    }

    /// What `seat` knows about this game.
    #[must_use]
    pub fn information_set(&self, seat: Seat) -> InformationSet {
        InformationSet::new(seat, self.hand(seat), Some(self.mode), self.first_leader)
            .with_history(self.history.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Color, Rank};
    use crate::core::GameRng;
    use crate::determinize::Deal;

    fn random_game(seed: u64, mode: Mode) -> JassGame {
        let mut rng = GameRng::new(seed);
        JassGame::new(Deal::random(&mut rng).hands(), mode, Seat::new(0))
    }

    fn play_out(game: &mut JassGame, rng: &mut GameRng) {
        while let Some(seat) = game.current_player() {
            let legal: Vec<Card> = game.legal_cards().iter().collect();
            let card = *rng.choose(&legal).unwrap();
            game.play(seat, card).unwrap();
        }
    }

    #[test]
    fn test_full_game_distributes_all_points() {
        for (seed, mode) in [(1, Mode::Trumpf(Color::Hearts)), (2, Mode::TopDown), (3, Mode::BottomUp)] {
            let mut game = random_game(seed, mode);
            let mut rng = GameRng::new(seed + 100);
            play_out(&mut game, &mut rng);

            assert!(game.is_finished());
            assert_eq!(game.team_points(0) + game.team_points(1), TOTAL_POINTS);
            assert_eq!(game.history().len(), 36);
            let score = game.score();
            assert!((score[Seat::new(0)] + score[Seat::new(1)] - 1.0).abs() < 1e-9);
            assert_eq!(score[Seat::new(0)], score[Seat::new(2)]);
        }
    }

    #[test]
    fn test_winner_leads_next_trick() {
        let hands = [
            [Rank::Six, Rank::Seven],
            [Rank::Ace, Rank::Eight],
            [Rank::Nine, Rank::Ten],
            [Rank::Jack, Rank::Queen],
        ]
        .map(|ranks| ranks.into_iter().map(|r| Card::new(Color::Clubs, r)).collect::<CardSet>());
        let mut game = JassGame::new(hands, Mode::TopDown, Seat::new(0));
        game.play(Seat::new(0), Card::new(Color::Clubs, Rank::Six)).unwrap();
        game.play(Seat::new(1), Card::new(Color::Clubs, Rank::Ace)).unwrap();
        game.play(Seat::new(2), Card::new(Color::Clubs, Rank::Ten)).unwrap();
        game.play(Seat::new(3), Card::new(Color::Clubs, Rank::Jack)).unwrap();

        assert_eq!(game.round(), 1);
        assert_eq!(game.current_player(), Some(Seat::new(1)));
        assert_eq!(game.team_points(1), 11 + 10 + 2);
        assert!(game.current_trick().is_empty());
    }

    #[test]
    fn test_rejects_illegal_plays() {
        let mut game = random_game(7, Mode::Trumpf(Color::Spades));
        let other = Seat::new(1);
        let card = game.hand(other).iter().next().unwrap();
        assert_eq!(
            game.play(other, card),
            Err(JassError::NotYourTurn {
                expected: Seat::new(0),
                got: other
            })
        );

        let foreign = game.hand(Seat::new(2)).iter().next().unwrap();
        assert!(matches!(
            game.play(Seat::new(0), foreign),
            Err(JassError::NotInHand { .. })
        ));
    }

    #[test]
    fn test_must_follow_suit() {
        let mut game = random_game(11, Mode::TopDown);
        let lead = game.hand(Seat::new(0)).iter().next().unwrap();
        game.play(Seat::new(0), lead).unwrap();

        let hand = game.hand(Seat::new(1));
        let following = hand.of_color(lead.color);
        if !following.is_empty() && following != hand {
            let off = (hand - following).iter().next().unwrap();
            assert_eq!(game.play(Seat::new(1), off), Err(JassError::IllegalCard { card: off }));
        }
        assert_eq!(game.legal_cards(), if following.is_empty() { hand } else { following });
    }

    #[test]
    fn test_information_set_matches_game() {
        let mut game = random_game(5, Mode::BottomUp);
        let mut rng = GameRng::new(9);
        for _ in 0..6 {
            let seat = game.current_player().unwrap();
            let legal: Vec<Card> = game.legal_cards().iter().collect();
            game.play(seat, *rng.choose(&legal).unwrap()).unwrap();
        }
        let seat = game.current_player().unwrap();
        let info = game.information_set(seat);
        assert!(info.validate().is_ok());
        assert_eq!(info.hand(), game.hand(seat));
        assert_eq!(info.history().len(), 6);
    }

    #[test]
    fn test_finished_game_rejects_moves() {
        let mut game = random_game(3, Mode::TopDown);
        let mut rng = GameRng::new(3);
        play_out(&mut game, &mut rng);
        assert_eq!(game.current_player(), None);
        assert!(game.legal_cards().is_empty());
        assert_eq!(
            game.play(Seat::new(0), Card::new(Color::Hearts, Rank::Six)),
            Err(JassError::GameOver)
        );
    }
}

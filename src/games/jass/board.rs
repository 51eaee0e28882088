//! Jass positions as seen by the search.
//!
//! A `JassBoard` covers both decisions of a game: the trumpf declaration
//! (including a shift to the partner) and card play. The board keeps the
//! seat whose decision is being searched (`perspective`); re-determinizing
//! only re-deals what that seat cannot see.

use std::sync::Arc;

use tracing::warn;

use crate::cards::{Card, CardSet, Mode, HAND_SIZE, TOTAL_POINTS};
use crate::core::{GameRng, Move, Seat, SeatMap};
use crate::determinize::{DeterminizeError, Determinizer, SEAT_COUNT};
use crate::nn::{EstimatorError, ScoreEstimator};
use crate::rules::{Board, MovePhase, RolloutStrength};

use super::game::JassGame;
use super::heuristics::{predict_trumpf, refine_cards, top_modes, TOP_TRUMPF_CHOICES};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    TrumpfSelection {
        hands: [CardSet; SEAT_COUNT],
        selector: Seat,
        shifted: bool,
    },
    CardPlay(JassGame),
}

/// A fully dealt Jass position.
#[derive(Clone)]
pub struct JassBoard {
    phase: Phase,
    perspective: Seat,
    determinizer: Arc<Determinizer>,
    score_estimator: Option<Arc<dyn ScoreEstimator>>,
}

impl std::fmt::Debug for JassBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JassBoard")
            .field("phase", &self.phase)
            .field("perspective", &self.perspective)
            .field("score_estimator", &self.score_estimator.is_some())
            .finish()
    }
}

impl JassBoard {
    /// Declaration phase. `selector` declares unless `shifted`, in which
    /// case the partner does; the declaring seat is the perspective.
    pub fn trumpf_selection(hands: [CardSet; SEAT_COUNT], selector: Seat, shifted: bool) -> Self {
        let perspective = if shifted {
            selector.partner(SEAT_COUNT)
        } else {
            selector
        };
        Self {
            phase: Phase::TrumpfSelection {
                hands,
                selector,
                shifted,
            },
            perspective,
            determinizer: Arc::new(Determinizer::new()),
            score_estimator: None,
        }
    }

    /// Card play, searched for `perspective`.
    pub fn card_play(game: JassGame, perspective: Seat) -> Self {
        Self {
            phase: Phase::CardPlay(game),
            perspective,
            determinizer: Arc::new(Determinizer::new()),
            score_estimator: None,
        }
    }

    pub fn with_determinizer(mut self, determinizer: Arc<Determinizer>) -> Self {
        self.determinizer = determinizer;
        self
    }

    /// Replace rollouts during card play by the estimator's prediction.
    pub fn with_score_estimator(mut self, estimator: Arc<dyn ScoreEstimator>) -> Self {
        self.score_estimator = Some(estimator);
        self
    }

    #[must_use]
    pub fn perspective(&self) -> Seat {
        self.perspective
    }

    /// The game once the mode is declared.
    #[must_use]
    pub fn game(&self) -> Option<&JassGame> {
        match &self.phase {
            Phase::CardPlay(game) => Some(game),
            Phase::TrumpfSelection { .. } => None,
        }
    }

    #[must_use]
    pub fn is_trumpf_selection(&self) -> bool {
        matches!(self.phase, Phase::TrumpfSelection { .. })
    }

    #[must_use]
    pub fn hand(&self, seat: Seat) -> CardSet {
        match &self.phase {
            Phase::TrumpfSelection { hands, .. } => hands[seat.index()],
            Phase::CardPlay(game) => game.hand(seat),
        }
    }

    fn declare(&mut self, mode: Mode) {
        let Phase::TrumpfSelection {
            hands,
            selector,
            shifted,
        } = &mut self.phase
        else {
            return;
        };
        if mode == Mode::Shift {
            if *shifted {
                warn!("declaration already shifted, ignoring second shift");
            }
            *shifted = true;
            return;
        }
        // The original selector leads, also after a shift.
        let game = JassGame::new(*hands, mode, *selector).with_shifted(*shifted);
        self.phase = Phase::CardPlay(game);
    }

    /// Hand the perspective's unseen cards out at random.
    fn redeal_for_declaration(&mut self, rng: &mut GameRng) {
        let perspective = self.perspective;
        let Phase::TrumpfSelection { hands, .. } = &mut self.phase else {
            return;
        };
        let own = hands[perspective.index()];
        let mut unseen: Vec<Card> = (CardSet::full() - own).iter().collect();
        rng.shuffle(&mut unseen);
        let mut chunks = unseen.chunks(HAND_SIZE);
        for seat in Seat::all(SEAT_COUNT).filter(|s| *s != perspective) {
            hands[seat.index()] = chunks
                .next()
                .map(|chunk| chunk.iter().copied().collect())
                .unwrap_or_default();
        }
    }
}

impl Board for JassBoard {
    fn current_player(&self) -> Option<Seat> {
        match &self.phase {
            Phase::TrumpfSelection {
                selector, shifted, ..
            } => Some(if *shifted {
                selector.partner(SEAT_COUNT)
            } else {
                *selector
            }),
            Phase::CardPlay(game) => game.current_player(),
        }
    }

    fn player_count(&self) -> usize {
        SEAT_COUNT
    }

    fn score(&self) -> SeatMap<f64> {
        match &self.phase {
            Phase::CardPlay(game) => game.score(),
            Phase::TrumpfSelection { .. } => SeatMap::with_value(SEAT_COUNT, 0.0),
        }
    }

    fn legal_moves(&self, phase: MovePhase) -> Vec<Move> {
        let Some(seat) = self.current_player() else {
            return Vec::new();
        };
        match &self.phase {
            Phase::TrumpfSelection { hands, shifted, .. } => {
                let modes = match phase {
                    MovePhase::TreePolicy => top_modes(hands[seat.index()], *shifted, TOP_TRUMPF_CHOICES),
                    MovePhase::Playout => {
                        let mut all = Mode::STANDARD.to_vec();
                        if !*shifted {
                            all.push(Mode::Shift);
                        }
                        all
                    }
                };
                modes.into_iter().map(|mode| Move::trumpf(seat, mode)).collect()
            }
            Phase::CardPlay(game) => game
                .legal_cards()
                .iter()
                .map(|card| Move::card(seat, card))
                .collect(),
        }
    }

    fn apply_move(&mut self, mv: &Move) {
        match mv {
            Move::Trumpf(m) if self.is_trumpf_selection() => self.declare(m.mode),
            Move::Card(m) => match &mut self.phase {
                Phase::CardPlay(game) => {
                    if let Err(err) = game.play(m.player, m.card) {
                        warn!(%err, "ignoring unplayable card move");
                    }
                }
                Phase::TrumpfSelection { .. } => warn!(%mv, "card move before declaration, ignoring"),
            },
            Move::Trumpf(_) => warn!(%mv, "declaration after card play started, ignoring"),
        }
    }

    fn is_terminal(&self) -> bool {
        match &self.phase {
            Phase::CardPlay(game) => game.is_finished(),
            Phase::TrumpfSelection { .. } => false,
        }
    }

    fn duplicate(&self, resample_hidden: bool, rng: &mut GameRng) -> Result<Self, DeterminizeError> {
        let mut board = self.clone();
        if !resample_hidden {
            return Ok(board);
        }
        if let Phase::CardPlay(game) = &mut board.phase {
            let deal = self.determinizer.sample(&game.information_set(self.perspective), rng)?;
            game.replace_hands(deal.hands());
        } else {
            board.redeal_for_declaration(rng);
        }
        Ok(board)
    }

    fn has_value_estimator(&self) -> bool {
        self.score_estimator.is_some() && !self.is_trumpf_selection()
    }

    /// Team points predicted for the seat to play, shared with its partner.
    /// The other team gets the remaining points.
    fn estimate_score(&self) -> Result<SeatMap<f64>, EstimatorError> {
        let (Some(estimator), Phase::CardPlay(game)) = (&self.score_estimator, &self.phase) else {
            return Err(EstimatorError::Unavailable);
        };
        let mover = game.current_player().ok_or(EstimatorError::Unavailable)?;
        let total = f64::from(TOTAL_POINTS);
        let points = estimator.predict_points(&game.information_set(mover))?.clamp(0.0, total);
        Ok(SeatMap::new(SEAT_COUNT, |seat| {
            if seat.is_teammate(mover) {
                points / total
            } else {
                (total - points) / total
            }
        }))
    }

    fn best_move(&self, strength: RolloutStrength, rng: &mut GameRng) -> Option<Move> {
        let seat = self.current_player()?;
        match &self.phase {
            Phase::TrumpfSelection { hands, shifted, .. } => {
                Some(Move::trumpf(seat, predict_trumpf(hands[seat.index()], *shifted)))
            }
            Phase::CardPlay(game) => {
                let cards: Vec<Card> = refine_cards(game, strength).iter().collect();
                rng.choose(&cards).map(|card| Move::card(seat, *card))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Color, Rank};
    use crate::determinize::Deal;
    use crate::nn::ConstantScore;

    fn declaration_board(seed: u64) -> (JassBoard, Deal) {
        let deal = Deal::random(&mut GameRng::new(seed));
        (JassBoard::trumpf_selection(deal.hands(), Seat::new(1), false), deal)
    }

    fn play_random(board: &mut JassBoard, rng: &mut GameRng) {
        while !board.is_terminal() {
            let moves = board.legal_moves(MovePhase::Playout);
            let mv = *rng.choose(&moves).unwrap();
            board.apply_move(&mv);
        }
    }

    #[test]
    fn test_declaration_then_card_play() {
        let (mut board, _) = declaration_board(1);
        assert_eq!(board.current_player(), Some(Seat::new(1)));
        board.apply_move(&Move::trumpf(Seat::new(1), Mode::Trumpf(Color::Hearts)));

        let game = board.game().unwrap();
        assert_eq!(game.mode(), Mode::Trumpf(Color::Hearts));
        assert_eq!(board.current_player(), Some(Seat::new(1)));
        assert_eq!(board.legal_moves(MovePhase::TreePolicy).len(), HAND_SIZE);
    }

    #[test]
    fn test_shift_passes_to_partner_but_selector_leads() {
        let (mut board, _) = declaration_board(2);
        board.apply_move(&Move::trumpf(Seat::new(1), Mode::Shift));
        assert_eq!(board.current_player(), Some(Seat::new(3)));

        let moves = board.legal_moves(MovePhase::Playout);
        assert_eq!(moves.len(), Mode::STANDARD.len());
        assert!(moves.iter().all(|m| m.as_trumpf().is_some_and(|t| t.mode != Mode::Shift)));

        board.apply_move(&Move::trumpf(Seat::new(3), Mode::TopDown));
        assert!(board.game().unwrap().shifted());
        assert_eq!(board.current_player(), Some(Seat::new(1)));
    }

    #[test]
    fn test_tree_moves_prune_declarations() {
        let (board, _) = declaration_board(3);
        assert_eq!(board.legal_moves(MovePhase::TreePolicy).len(), TOP_TRUMPF_CHOICES);
        assert_eq!(board.legal_moves(MovePhase::Playout).len(), Mode::STANDARD.len() + 1);
    }

    #[test]
    fn test_random_game_is_scored() {
        let (mut board, _) = declaration_board(4);
        let mut rng = GameRng::new(4);
        play_random(&mut board, &mut rng);

        assert!(board.legal_moves(MovePhase::Playout).is_empty());
        let score = board.score();
        assert!((score[Seat::new(0)] + score[Seat::new(1)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_keeps_own_hand() {
        let (board, deal) = declaration_board(5);
        let mut rng = GameRng::new(5);
        let copy = board.duplicate(true, &mut rng).unwrap();
        assert_eq!(copy.hand(Seat::new(1)), deal.hand(Seat::new(1)));

        let all = Seat::all(SEAT_COUNT).fold(CardSet::empty(), |acc, s| acc | copy.hand(s));
        assert_eq!(all, CardSet::full());
        assert!(Seat::all(SEAT_COUNT).all(|s| copy.hand(s).len() == HAND_SIZE));

        let exact = board.duplicate(false, &mut rng).unwrap();
        assert_eq!(exact.hand(Seat::new(2)), deal.hand(Seat::new(2)));
    }

    #[test]
    fn test_duplicate_during_card_play_respects_history() {
        let deal = Deal::random(&mut GameRng::new(6));
        let mut game = JassGame::new(deal.hands(), Mode::TopDown, Seat::new(0));
        let mut rng = GameRng::new(6);
        for _ in 0..5 {
            let seat = game.current_player().unwrap();
            let cards: Vec<Card> = game.legal_cards().iter().collect();
            game.play(seat, *rng.choose(&cards).unwrap()).unwrap();
        }
        let perspective = game.current_player().unwrap();
        let board = JassBoard::card_play(game.clone(), perspective);
        let copy = board.duplicate(true, &mut rng).unwrap();
        let copied = copy.game().unwrap();

        assert_eq!(copied.hand(perspective), game.hand(perspective));
        assert_eq!(copied.history(), game.history());
        for seat in Seat::all(SEAT_COUNT) {
            assert_eq!(copied.hand(seat).len(), game.hand(seat).len());
        }
    }

    #[test]
    fn test_estimate_shares_points_by_team() {
        let deal = Deal::random(&mut GameRng::new(7));
        let game = JassGame::new(deal.hands(), Mode::BottomUp, Seat::new(2));
        let board = JassBoard::card_play(game, Seat::new(2)).with_score_estimator(Arc::new(ConstantScore(100.0)));

        assert!(board.has_value_estimator());
        let score = board.estimate_score().unwrap();
        assert!((score[Seat::new(0)] - 100.0 / 157.0).abs() < 1e-9);
        assert!((score[Seat::new(1)] - 57.0 / 157.0).abs() < 1e-9);
    }

    #[test]
    fn test_declaration_has_no_estimate() {
        let (board, _) = declaration_board(8);
        let board = board.with_score_estimator(Arc::new(ConstantScore(80.0)));
        assert!(!board.has_value_estimator());
        assert!(matches!(board.estimate_score(), Err(EstimatorError::Unavailable)));
    }

    #[test]
    fn test_best_move_is_legal() {
        let (mut board, _) = declaration_board(9);
        let mut rng = GameRng::new(9);
        while !board.is_terminal() {
            let mv = board.best_move(RolloutStrength::Heavy, &mut rng).unwrap();
            assert!(board.legal_moves(MovePhase::Playout).contains(&mv));
            board.apply_move(&mv);
        }
    }

    #[test]
    fn test_mismatched_move_is_ignored() {
        let (mut board, _) = declaration_board(10);
        let before = board.clone();
        board.apply_move(&Move::card(Seat::new(1), Card::new(Color::Hearts, Rank::Six)));
        assert_eq!(board.phase, before.phase);
    }
}

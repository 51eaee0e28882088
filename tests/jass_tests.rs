//! Jass board integration tests.

use jass_ismcts::determinize::{Deal, SEAT_COUNT};
use jass_ismcts::games::jass::heuristics::{predict_trumpf, rate_modes, SHIFT_RATING};
use jass_ismcts::rules::{Board, MovePhase, RolloutStrength};
use jass_ismcts::{Card, CardSet, Color, GameRng, JassBoard, JassGame, Mode, Move, Rank, Seat};

fn hand(cards: &[(Color, Rank)]) -> CardSet {
    cards.iter().map(|&(c, r)| Card::new(c, r)).collect()
}

fn play_with(board: &mut JassBoard, strength: RolloutStrength, rng: &mut GameRng) {
    while !board.is_terminal() {
        let mv = board.best_move(strength, rng).unwrap();
        board.apply_move(&mv);
    }
}

// =============================================================================
// Declaration Tests
// =============================================================================

#[test]
fn test_declaration_offers_shift_once() {
    let deal = Deal::random(&mut GameRng::new(1));
    let mut board = JassBoard::trumpf_selection(deal.hands(), Seat::new(2), false);

    let shift = Move::trumpf(Seat::new(2), Mode::Shift);
    assert!(board.legal_moves(MovePhase::Playout).contains(&shift));

    board.apply_move(&shift);
    assert_eq!(board.current_player(), Some(Seat::new(0)));
    assert!(board
        .legal_moves(MovePhase::Playout)
        .iter()
        .all(|m| m.as_trumpf().map(|t| t.mode) != Some(Mode::Shift)));
}

#[test]
fn test_weak_hand_prefers_shift() {
    let weak = hand(&[
        (Color::Spades, Rank::Seven),
        (Color::Spades, Rank::Queen),
        (Color::Hearts, Rank::Eight),
        (Color::Hearts, Rank::Jack),
        (Color::Clubs, Rank::Nine),
        (Color::Clubs, Rank::Queen),
        (Color::Diamonds, Rank::Eight),
        (Color::Diamonds, Rank::Jack),
        (Color::Diamonds, Rank::Ten),
    ]);
    assert_eq!(predict_trumpf(weak, false), Mode::Shift);
    assert_ne!(predict_trumpf(weak, true), Mode::Shift);
    assert!(rate_modes(weak, false).iter().any(|&(m, r)| m == Mode::Shift && r == SHIFT_RATING));
}

#[test]
fn test_declared_game_starts_with_selector() {
    let deal = Deal::random(&mut GameRng::new(2));
    let mut board = JassBoard::trumpf_selection(deal.hands(), Seat::new(3), false);
    board.apply_move(&Move::trumpf(Seat::new(3), Mode::Shift));
    board.apply_move(&Move::trumpf(Seat::new(1), Mode::Trumpf(Color::Spades)));

    let game = board.game().unwrap();
    assert_eq!(game.first_leader(), Seat::new(3));
    assert!(game.shifted());
    assert_eq!(board.current_player(), Some(Seat::new(3)));
}

// =============================================================================
// Full Game Tests
// =============================================================================

#[test]
fn test_rule_based_games_finish_with_all_points() {
    for (seed, strength) in [(3, RolloutStrength::Light), (4, RolloutStrength::Heavy)] {
        let deal = Deal::random(&mut GameRng::new(seed));
        let mut board = JassBoard::trumpf_selection(deal.hands(), Seat::new(0), false);
        let mut rng = GameRng::new(seed);
        play_with(&mut board, strength, &mut rng);

        let game = board.game().unwrap();
        assert_eq!(game.team_points(0) + game.team_points(1), 157);
        assert!(board.legal_moves(MovePhase::TreePolicy).is_empty());
        assert_eq!(board.current_player(), None);
    }
}

#[test]
fn test_scores_are_team_shares() {
    let deal = Deal::random(&mut GameRng::new(5));
    let mut board = JassBoard::card_play(JassGame::new(deal.hands(), Mode::TopDown, Seat::new(1)), Seat::new(1));
    play_with(&mut board, RolloutStrength::Light, &mut GameRng::new(5));

    let score = board.score();
    assert_eq!(score[Seat::new(0)], score[Seat::new(2)]);
    assert_eq!(score[Seat::new(1)], score[Seat::new(3)]);
    assert!((score[Seat::new(0)] + score[Seat::new(1)] - 1.0).abs() < 1e-9);
}

// =============================================================================
// Determinization Tests
// =============================================================================

#[test]
fn test_duplicate_resamples_hidden_hands() {
    let deal = Deal::random(&mut GameRng::new(6));
    let board = JassBoard::card_play(JassGame::new(deal.hands(), Mode::BottomUp, Seat::new(0)), Seat::new(0));
    let base = GameRng::new(6);

    let copies: Vec<JassBoard> = (0..6)
        .map(|i| board.duplicate(true, &mut base.stream(i)).unwrap())
        .collect();

    for copy in &copies {
        assert_eq!(copy.hand(Seat::new(0)), deal.hand(Seat::new(0)));
    }
    assert!(copies.iter().any(|c| c.hand(Seat::new(1)) != deal.hand(Seat::new(1))));
}

#[test]
fn test_duplicate_without_resampling_is_exact() {
    let deal = Deal::random(&mut GameRng::new(7));
    let board = JassBoard::card_play(JassGame::new(deal.hands(), Mode::TopDown, Seat::new(0)), Seat::new(0));
    let copy = board.duplicate(false, &mut GameRng::new(1)).unwrap();
    for seat in Seat::all(SEAT_COUNT) {
        assert_eq!(copy.hand(seat), board.hand(seat));
    }
}

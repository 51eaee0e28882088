//! Determinization property tests over random partial games.

use proptest::prelude::*;

use jass_ismcts::determinize::{CardKnowledge, Deal, Determinizer, SEAT_COUNT};
use im::Vector;

use jass_ismcts::core::CardMove;
use jass_ismcts::determinize::InformationSet;
use jass_ismcts::{Card, CardSet, Color, GameRng, JassGame, Mode, Rank, Seat};

/// Play `cards` random legal cards from a seeded deal.
fn partial_game(seed: u64, cards: usize, mode: Mode) -> JassGame {
    let mut rng = GameRng::new(seed);
    let mut game = JassGame::new(Deal::random(&mut rng).hands(), mode, Seat::new((seed % 4) as u8));
    for _ in 0..cards {
        let Some(seat) = game.current_player() else {
            break;
        };
        let legal: Vec<Card> = game.legal_cards().iter().collect();
        game.play(seat, *rng.choose(&legal).unwrap()).unwrap();
    }
    game
}

fn any_mode() -> impl Strategy<Value = Mode> {
    prop::sample::select(Mode::STANDARD.to_vec())
}

// =============================================================================
// Consistency Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_sample_is_consistent_with_information_set(
        seed in 0u64..10_000,
        played in 0usize..35,
        mode in any_mode(),
    ) {
        let game = partial_game(seed, played, mode);
        let seat = game.current_player().unwrap();
        let info = game.information_set(seat);

        let deal = Determinizer::new().sample(&info, &mut GameRng::new(seed ^ 0xABCD)).unwrap();

        prop_assert_eq!(deal.hand(seat), game.hand(seat));
        let mut union = CardSet::empty();
        for other in Seat::all(SEAT_COUNT) {
            prop_assert_eq!(deal.hand(other).len(), game.hand(other).len());
            prop_assert!((union & deal.hand(other)).is_empty());
            union = union | deal.hand(other);
        }
        prop_assert!((union & game.played_cards()).is_empty());
        prop_assert_eq!(union | game.played_cards(), CardSet::full());
    }

    #[test]
    fn test_true_deal_satisfies_inferred_knowledge(
        seed in 0u64..10_000,
        played in 0usize..35,
        mode in any_mode(),
    ) {
        let game = partial_game(seed, played, mode);
        let seat = game.current_player().unwrap();
        let knowledge = CardKnowledge::infer(&game.information_set(seat));

        for other in Seat::all(SEAT_COUNT).filter(|s| *s != seat) {
            for card in game.hand(other) {
                prop_assert!(knowledge.may_hold(other, card), "{} holds {}", other, card);
            }
        }
    }
}

// =============================================================================
// Variation
// =============================================================================

#[test]
fn test_samples_vary_between_streams() {
    let game = partial_game(17, 4, Mode::TopDown);
    let seat = game.current_player().unwrap();
    let info = game.information_set(seat);
    let determinizer = Determinizer::new();
    let base = GameRng::new(5);

    let deals: Vec<[CardSet; SEAT_COUNT]> = (0..8)
        .map(|i| determinizer.sample(&info, &mut base.stream(i)).unwrap().hands())
        .collect();

    assert!(deals.iter().any(|d| *d != deals[0]));
}

#[test]
fn test_same_stream_gives_same_sample() {
    let game = partial_game(23, 10, Mode::Trumpf(jass_ismcts::Color::Hearts));
    let seat = game.current_player().unwrap();
    let info = game.information_set(seat);
    let determinizer = Determinizer::new();

    let a = determinizer.sample(&info, &mut GameRng::new(3).stream(2)).unwrap();
    let b = determinizer.sample(&info, &mut GameRng::new(3).stream(2)).unwrap();
    assert_eq!(a.hands(), b.hands());
}

#[test]
fn test_last_card_has_single_determinization() {
    let game = partial_game(31, 35, Mode::BottomUp);
    let seat = game.current_player().unwrap();
    let deal = Determinizer::new()
        .sample(&game.information_set(seat), &mut GameRng::new(1))
        .unwrap();
    assert_eq!(deal.hands(), game.hands());
}

// =============================================================================
// Distribution
// =============================================================================

/// Seat 0 to play in the last-but-one trick after seats 2 and 3, with every
/// earlier card following suit. Seat 1 holds two of the four unseen cards,
/// seats 2 and 3 one each.
fn uneven_hands_info() -> (InformationSet, CardSet) {
    let trick_colors = [
        Color::Spades,
        Color::Spades,
        Color::Hearts,
        Color::Hearts,
        Color::Diamonds,
        Color::Diamonds,
        Color::Clubs,
    ];
    let mut next_rank = [0usize; 4];
    let mut take = |color: Color| {
        let rank = Rank::ALL[next_rank[color.index()]];
        next_rank[color.index()] += 1;
        Card::new(color, rank)
    };

    let mut history = Vector::new();
    for color in trick_colors {
        for seat in Seat::all(SEAT_COUNT) {
            history.push_back(CardMove::new(seat, take(color)));
        }
    }
    history.push_back(CardMove::new(Seat::new(2), take(Color::Clubs)));
    history.push_back(CardMove::new(Seat::new(3), take(Color::Clubs)));

    let own: CardSet = [take(Color::Clubs), take(Color::Clubs)].into_iter().collect();
    let info = InformationSet::new(Seat::new(0), own, Some(Mode::TopDown), Seat::new(0)).with_history(history);
    let unseen = info.unseen_cards();
    (info, unseen)
}

#[test]
fn test_hidden_cards_are_dealt_uniformly() {
    let (info, unseen) = uneven_hands_info();
    assert_eq!(unseen.len(), 4);
    assert_eq!(info.hand_size(Seat::new(1)), 2);
    assert_eq!(info.hand_size(Seat::new(2)), 1);

    let determinizer = Determinizer::new();
    let base = GameRng::new(8);
    let trials = 6000u32;
    let mut held = [0u32; 36];
    for i in 0..trials {
        let deal = determinizer.sample(&info, &mut base.stream(u64::from(i))).unwrap();
        for card in deal.hand(Seat::new(1)) {
            held[card.index()] += 1;
        }
    }

    for card in unseen {
        let freq = f64::from(held[card.index()]) / f64::from(trials);
        assert!((freq - 0.5).abs() < 0.04, "seat 1 held {card} with frequency {freq}");
    }
}

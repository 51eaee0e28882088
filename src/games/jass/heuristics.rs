//! Rule-based Jass knowledge: rating declarations and refining card choices.
//!
//! Used for rule-based rollouts, for pruning the trumpf choices stored in
//! the tree, and as the fallback when a search fails.

use smallvec::SmallVec;

use crate::cards::{Card, CardSet, Color, Mode, Rank};
use crate::core::Seat;
use crate::determinize::SEAT_COUNT;
use crate::rules::RolloutStrength;

use super::game::JassGame;

/// Rating of `Shift`. A hand whose best mode rates lower is passed on.
pub const SHIFT_RATING: i32 = 125;

/// Declarations kept as tree moves when choosing trumpf.
pub const TOP_TRUMPF_CHOICES: usize = 3;

/// One trick is worth this many rating points.
const TRICK_RATING: f32 = 20.0;

/// Trick points above which trumping in as last player pays off.
const TRUMP_IN_MIN_POINTS: u32 = 10;

/// All declarations open to the hand, best first. Shift is offered unless
/// the declaration was already shifted. Equal ratings keep declaration order.
#[must_use]
pub fn rate_modes(hand: CardSet, shifted: bool) -> SmallVec<[(Mode, i32); 7]> {
    let mut ratings: SmallVec<[(Mode, i32); 7]> = Color::ALL
        .into_iter()
        .map(|color| (Mode::Trumpf(color), rate_trumpf_color(hand, color)))
        .collect();

    let no_trumpf_weight = if shifted { 0.75 } else { 0.9 };
    ratings.push((Mode::TopDown, (no_trumpf_weight * rate_top_down(hand) as f32).round() as i32));
    ratings.push((Mode::BottomUp, (no_trumpf_weight * rate_bottom_up(hand) as f32).round() as i32));
    if !shifted {
        ratings.push((Mode::Shift, SHIFT_RATING));
    }

    ratings.sort_by(|a, b| b.1.cmp(&a.1));
    ratings
}

/// Best rated declaration.
#[must_use]
pub fn predict_trumpf(hand: CardSet, shifted: bool) -> Mode {
    rate_modes(hand, shifted)
        .first()
        .map_or(Mode::TopDown, |(mode, _)| *mode)
}

/// The `count` best rated declarations.
#[must_use]
pub fn top_modes(hand: CardSet, shifted: bool, count: usize) -> Vec<Mode> {
    rate_modes(hand, shifted)
        .into_iter()
        .take(count)
        .map(|(mode, _)| mode)
        .collect()
}

/// How well `color` would serve as trumpf for `hand`.
#[must_use]
pub fn rate_trumpf_color(hand: CardSet, color: Color) -> i32 {
    let trumps = hand.of_color(color);
    let count = trumps.len() as i32;
    if count <= 1 {
        return 0;
    }
    let holds = |rank| trumps.contains(Card::new(color, rank));
    let jack = holds(Rank::Jack);
    let nine = holds(Rank::Nine);
    let ace = holds(Rank::Ace);

    let mut rating = 0;
    if count >= 6 {
        rating += 120;
    }
    let quality: i32 = trumps.iter().map(|c| 2 * i32::from(c.rank.trumpf_strength())).sum();
    rating += quality;
    if jack {
        rating += 10;
    }
    if nine {
        rating += 7;
    }
    if ace {
        rating += 3;
    }
    rating = (rating as f64 * 1.15f64.powi(count)) as i32;

    let aces = hand.iter().filter(|c| c.rank == Rank::Ace).count();
    if jack && nine && count > 2 && aces >= 2 {
        rating += if count > 3 { 40 } else { 30 };
    }
    if jack && count > 3 && quality - 9 > 12 {
        rating += if count > 4 { 40 } else { 30 };
    }
    if nine && count > 3 {
        rating += if count > 4 { 30 } else { 20 };
    }
    if jack && ace && count > 4 {
        rating += if count > 5 { 40 } else { 30 };
    }

    // Side colours count for a little, like a weak top-down hand.
    for side in Color::ALL.into_iter().filter(|c| *c != color) {
        rating += rate_top_down_color(hand, side) / 3;
    }
    rating
}

#[must_use]
pub fn rate_top_down(hand: CardSet) -> i32 {
    Color::ALL.into_iter().map(|c| rate_top_down_color(hand, c)).sum()
}

#[must_use]
pub fn rate_bottom_up(hand: CardSet) -> i32 {
    Color::ALL.into_iter().map(|c| rate_bottom_up_color(hand, c)).sum()
}

/// Expected tricks in `color` when high cards win, scaled by 20.
#[must_use]
pub fn rate_top_down_color(hand: CardSet, color: Color) -> i32 {
    let mut ranks: SmallVec<[i32; 9]> = hand.of_color(color).iter().map(rank_number).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    rate_sequence(&ranks, |first| 9 - first, |last, next| last - next - 1)
}

/// Expected tricks in `color` when low cards win, scaled by 20.
#[must_use]
pub fn rate_bottom_up_color(hand: CardSet, color: Color) -> i32 {
    let mut ranks: SmallVec<[i32; 9]> = hand.of_color(color).iter().map(rank_number).collect();
    ranks.sort_unstable();
    rate_sequence(&ranks, |first| first - 1, |last, next| next - last - 1)
}

fn rank_number(card: Card) -> i32 {
    i32::from(card.rank.strength())
}

/// Walk the cards from strongest to weakest, discounting each further trick
/// by the chance that opponents hold the missing cards in between.
fn rate_sequence(ranks: &[i32], stronger_missing: impl Fn(i32) -> i32, gap: impl Fn(i32, i32) -> i32) -> i32 {
    let Some((&first, rest)) = ranks.split_first() else {
        return 0;
    };
    let count = ranks.len() as i32;
    let mut safety = (1.0f32 / 3.0).powi(stronger_missing(first));
    let mut rating = safety * TRICK_RATING;
    let mut stronger = 0;
    let mut last = first;
    for &next in rest {
        let between = gap(last, next);
        stronger += between;
        safety *= trick_safety(count, stronger, between);
        rating += safety * TRICK_RATING;
        stronger += 1;
        last = next;
    }
    rating.ceil() as i32
}

fn trick_safety(own_cards: i32, stronger: i32, between: i32) -> f32 {
    if between == 0 {
        1.0
    } else {
        1.0 - 2.0 / 3.0 * opponents_run_out(own_cards, stronger, between)
    }
}

/// Rough chance that an opponent has to give up a stronger card.
fn opponents_run_out(own_cards: i32, stronger: i32, between: i32) -> f32 {
    let other_cards = 26.0;
    let mut other_color = 9 - own_cards - 1;
    let mut estimate = other_color as f32 / other_cards;
    estimate *= factorial(other_color - 1);
    for _ in 0..stronger {
        other_color -= 1;
        estimate *= other_color as f32 / other_cards;
    }
    for _ in 0..between {
        estimate *= 0.45;
    }
    if estimate > 1.0 {
        estimate = 0.8;
    }
    estimate.max(0.0)
}

fn factorial(n: i32) -> f32 {
    match n {
        n if n < 0 => 0.0,
        0 | 1 => 1.0,
        n => (2..=n).map(|k| k as f32).product(),
    }
}

/// Cards worth giving to a partner who takes the trick.
#[must_use]
pub fn smear_cards(cards: CardSet, mode: Mode) -> CardSet {
    cards.filter(|c| match c.rank {
        Rank::Ten => true,
        Rank::Eight => mode == Mode::TopDown,
        Rank::King | Rank::Queen | Rank::Jack => mode == Mode::BottomUp,
        _ => false,
    })
}

/// Narrow the legal cards of the seat to play with common Jass rules.
///
/// `Light` only takes an opponent's trick as last player and smears onto a
/// partner's sure trick. `Heavy` also leads trumpf early with two or more
/// trumps and smears as third player when the last opponent cannot take the
/// trick. Heavy looks at the other hands, so it is only meaningful on a
/// determinized game.
#[must_use]
pub fn refine_cards(game: &JassGame, strength: RolloutStrength) -> CardSet {
    let legal = game.legal_cards();
    let Some(seat) = game.current_player() else {
        return legal;
    };
    let mode = game.mode();
    let trick = game.trick_cards();
    let winner = game.trick_winner();
    let heavy = strength == RolloutStrength::Heavy;

    // Take the trick as last player.
    if trick.len() == SEAT_COUNT - 1 && winner.is_some_and(|w| !w.is_teammate(seat)) {
        let winning = legal.filter(|c| mode.beats_trick(c, &trick));
        let plain = winning.filter(|c| !mode.is_trumpf(c));
        if !plain.is_empty() {
            return plain;
        }
        let trumps = winning.filter(|c| mode.is_trumpf(c));
        if !trumps.is_empty() && game.trick_points() > TRUMP_IN_MIN_POINTS {
            return trumps;
        }
    }

    // Pull trumps early.
    if heavy && trick.is_empty() && game.round() <= 1 {
        let trumps = legal.filter(|c| mode.is_trumpf(c));
        if trumps.len() >= 2 {
            return trumps;
        }
    }

    // Smear onto the partner's trick.
    let partner = seat.partner(SEAT_COUNT);
    let smear = smear_cards(legal, mode);
    if !smear.is_empty() && winner == Some(partner) {
        if trick.len() == SEAT_COUNT - 1 {
            return smear;
        }
        if heavy && trick.len() == SEAT_COUNT - 2 && !next_seat_can_win(game, seat) {
            return smear;
        }
    }

    legal
}

/// Whether the seat after `seat` could take the current trick.
fn next_seat_can_win(game: &JassGame, seat: Seat) -> bool {
    let next = seat.next(SEAT_COUNT);
    let trick = game.trick_cards();
    let mode = game.mode();
    mode.playable(game.hand(next), &trick)
        .iter()
        .any(|c| mode.beats_trick(c, &trick))
}

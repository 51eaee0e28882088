//! A Jass player built on the decision engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::{Card, CardSet, Mode, HAND_SIZE};
use crate::core::{GameRng, Seat};
use crate::determinize::{DeterminizeError, Determinizer, SEAT_COUNT};
use crate::mcts::{Decision, DecisionEngine, DecisionKind, SearchConfig, SearchError, StopSignal, WorkerPool};
use crate::nn::{CardsEstimator, ScoreEstimator};
use crate::rules::{Board, RolloutStrength};

use super::board::JassBoard;
use super::game::JassGame;
use super::heuristics::{predict_trumpf, refine_cards};

/// How the trumpf is declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrumpfSelectionMethod {
    Random,
    #[default]
    RuleBased,
    Mcts,
}

/// Chooses declarations and cards for one seat at a time.
///
/// Search failures never surface as an illegal or missing move: the player
/// falls back to rule-based play and logs a warning.
pub struct JassStrategy {
    engine: DecisionEngine<JassBoard>,
    trumpf_method: TrumpfSelectionMethod,
    determinizer: Arc<Determinizer>,
    score_estimator: Option<Arc<dyn ScoreEstimator>>,
    last_decision: Option<Decision>,
    rng: GameRng,
}

impl JassStrategy {
    pub fn new(config: SearchConfig, pool: WorkerPool) -> Result<Self, SearchError> {
        let rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        Ok(Self {
            engine: DecisionEngine::new(config, pool)?,
            trumpf_method: TrumpfSelectionMethod::default(),
            determinizer: Arc::new(Determinizer::new()),
            score_estimator: None,
            last_decision: None,
            rng,
        })
    }

    pub fn with_trumpf_method(mut self, method: TrumpfSelectionMethod) -> Self {
        self.trumpf_method = method;
        self
    }

    /// Bias determinizations by predicted card locations.
    pub fn with_cards_estimator(mut self, estimator: Arc<dyn CardsEstimator>) -> Self {
        self.determinizer = Arc::new(Determinizer::new().with_cards_estimator(estimator));
        self
    }

    /// Evaluate card-play leaves with a score estimate instead of rollouts.
    pub fn with_score_estimator(mut self, estimator: Arc<dyn ScoreEstimator>) -> Self {
        self.score_estimator = Some(estimator);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &DecisionEngine<JassBoard> {
        &self.engine
    }

    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.engine.stop_signal()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    /// The search behind the most recent move, or `None` if that move came
    /// from rule-based play.
    #[must_use]
    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    /// Declare a mode for `seat` holding `hand`. `shifted` means the partner
    /// passed the declaration to `seat`, so shifting again is not offered.
    pub fn choose_trumpf(&mut self, seat: Seat, hand: CardSet, shifted: bool) -> Mode {
        self.last_decision = None;
        let mode = match self.trumpf_method {
            TrumpfSelectionMethod::Random => self.random_mode(shifted),
            TrumpfSelectionMethod::RuleBased => predict_trumpf(hand, shifted),
            TrumpfSelectionMethod::Mcts => match self.search_trumpf(seat, hand, shifted) {
                Ok(mode) => mode,
                Err(err) => {
                    warn!(%err, %seat, "trumpf search failed, using rule-based declaration");
                    predict_trumpf(hand, shifted)
                }
            },
        };
        info!(%seat, %mode, shifted, "declared");
        mode
    }

    fn random_mode(&mut self, shifted: bool) -> Mode {
        let mut modes = Mode::STANDARD.to_vec();
        if !shifted {
            modes.push(Mode::Shift);
        }
        self.rng.choose(&modes).copied().unwrap_or(Mode::TopDown)
    }

    fn search_trumpf(&mut self, seat: Seat, hand: CardSet, shifted: bool) -> Result<Mode, SearchError> {
        if hand.len() != HAND_SIZE {
            return Err(DeterminizeError::HandSize {
                seat,
                expected: HAND_SIZE,
                actual: hand.len(),
            }
            .into());
        }
        let selector = if shifted { seat.partner(SEAT_COUNT) } else { seat };
        let mut hands = [CardSet::empty(); SEAT_COUNT];
        hands[seat.index()] = hand;
        // Only the own hand is known; deal the rest once so the root is complete.
        let root = JassBoard::trumpf_selection(hands, selector, shifted)
            .with_determinizer(Arc::clone(&self.determinizer))
            .duplicate(true, &mut self.rng)?;

        let decision = self.engine.choose_move(&root, DecisionKind::Trumpf)?;
        let mode = decision.chosen.as_trumpf().map(|m| m.mode).ok_or(SearchError::Exhausted {
            determinizations: decision.plan.as_ref().map_or(0, |p| p.determinizations),
        })?;
        self.last_decision = Some(decision);
        Ok(mode)
    }

    /// Pick the card the seat to play in `game` plays next.
    ///
    /// Hands of the other seats are treated as unknown unless the engine is
    /// configured to cheat.
    pub fn choose_card(&mut self, game: &JassGame) -> Result<Card, SearchError> {
        self.last_decision = None;
        let seat = game.current_player().ok_or(SearchError::TerminalRoot)?;
        let mut root = JassBoard::card_play(game.clone(), seat).with_determinizer(Arc::clone(&self.determinizer));
        if let Some(estimator) = &self.score_estimator {
            root = root.with_score_estimator(Arc::clone(estimator));
        }

        let searched = self
            .engine
            .choose_move(&root, DecisionKind::Card { round: game.round() })
            .map(|decision| (decision.chosen.as_card().map(|m| m.card), decision));
        match searched {
            Ok((Some(card), decision)) => {
                self.last_decision = Some(decision);
                Ok(card)
            }
            Ok((None, _)) => {
                warn!(%seat, "search returned a non-card move, using rule-based card");
                self.fallback_card(game, SearchError::TerminalRoot)
            }
            Err(err) => {
                warn!(%err, %seat, "card search failed, using rule-based card");
                self.fallback_card(game, err)
            }
        }
    }

    fn fallback_card(&mut self, game: &JassGame, err: SearchError) -> Result<Card, SearchError> {
        let cards: Vec<Card> = refine_cards(game, RolloutStrength::Light).iter().collect();
        self.rng.choose(&cards).copied().ok_or(err)
    }
}

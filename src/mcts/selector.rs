//! Merging root statistics across trees and picking the final move.
//!
//! Ties are broken by a fixed chain so that a seeded decision is
//! reproducible: primary key, then secondary key, then `Move::search_cmp`
//! (lower wins), then the order in which moves were first seen.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::core::Move;

use super::config::FinalSelectionPolicy;
use super::search::RootMoveStats;

/// Summed statistics of one root move over all trees.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveTotals {
    pub mv: Move,
    pub visits: u64,
    pub score_sum: f64,
    /// Trees in which the move was explored.
    pub trees: u32,
}

impl MoveTotals {
    /// Mean score for the seat making the move.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score_sum / self.visits as f64
        }
    }
}

/// Root statistics of all trees of one decision.
#[derive(Clone, Debug, Default)]
pub struct RootAggregate {
    entries: Vec<MoveTotals>,
    index: FxHashMap<Move, usize>,
}

impl RootAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root moves of one tree.
    pub fn add_tree(&mut self, moves: &[RootMoveStats]) {
        for m in moves {
            self.add(m.mv, m.visits, m.score_sum);
        }
    }

    pub fn add(&mut self, mv: Move, visits: u64, score_sum: f64) {
        if visits == 0 {
            return;
        }
        let idx = *self.index.entry(mv).or_insert_with(|| {
            self.entries.push(MoveTotals {
                mv,
                visits: 0,
                score_sum: 0.0,
                trees: 0,
            });
            self.entries.len() - 1
        });
        let entry = &mut self.entries[idx];
        entry.visits += visits;
        entry.score_sum += score_sum;
        entry.trees += 1;
    }

    /// Moves in first-seen order.
    #[must_use]
    pub fn entries(&self) -> &[MoveTotals] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, mv: &Move) -> Option<&MoveTotals> {
        self.index.get(mv).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_visits(&self) -> u64 {
        self.entries.iter().map(|e| e.visits).sum()
    }
}

/// Final selection over a [`RootAggregate`].
#[derive(Clone, Copy, Debug)]
pub struct MoveSelector {
    policy: FinalSelectionPolicy,
}

impl MoveSelector {
    #[must_use]
    pub const fn new(policy: FinalSelectionPolicy) -> Self {
        Self { policy }
    }

    /// Best entry, or `None` if no move was explored.
    #[must_use]
    pub fn select<'a>(&self, aggregate: &'a RootAggregate) -> Option<&'a MoveTotals> {
        let mut best: Option<&MoveTotals> = None;
        for candidate in aggregate.entries() {
            let better = match best {
                None => true,
                Some(current) => self.compare(candidate, current) == Ordering::Greater,
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }

    /// `Greater` when `a` is preferred over `b`. `Equal` keeps the earlier one.
    fn compare(&self, a: &MoveTotals, b: &MoveTotals) -> Ordering {
        let by_visits = a.visits.cmp(&b.visits);
        let by_mean = a.mean().total_cmp(&b.mean());
        let primary = match self.policy {
            FinalSelectionPolicy::RobustChild => by_visits.then(by_mean),
            FinalSelectionPolicy::MaxChild => by_mean.then(by_visits),
        };
        primary.then_with(|| b.mv.search_cmp(&a.mv))
    }
}

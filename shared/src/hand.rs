//! Hand ranking types used by the evaluator and showdown payloads.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::player::SeatId;

/// Poker hand categories, ordered weakest to strongest so the derived `Ord`
/// on [`HandRank`] compares categories before tiebreakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

/// A fully resolved hand rank: category plus a tiebreak vector compared
/// lexicographically. Two hands with equal `category` and `tiebreakers`
/// are exactly tied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
}

/// Result of evaluating one contender's hand at showdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandResult {
    pub seat: SeatId,
    pub rank: HandRank,
    pub best_five: [Card; 5],
}

//! Seat and agent identifiers, and the public projection of a seated player.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Index of a seat at a table, in `[0, max_seats)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(pub usize);

impl From<usize> for SeatId {
    fn from(v: usize) -> Self {
        SeatId(v)
    }
}

impl From<SeatId> for usize {
    fn from(s: SeatId) -> Self {
        s.0
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a registered agent, independent of any table/seat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a given viewer (a seat, or an observer) is allowed to see about a
/// seated player. `hole_cards` is `Some` only for the viewer's own seat, or
/// for any seat at showdown once cards are revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatPublic {
    pub seat: SeatId,
    pub agent_id: AgentId,
    pub stack: u64,
    pub current_bet: u64,
    pub folded: bool,
    pub all_in: bool,
    pub hole_cards: Option<[Card; 2]>,
}

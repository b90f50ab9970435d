//! Player actions, stages, and the typed event vocabulary appended to a
//! table's event log.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::HandResult;
use crate::player::{AgentId, SeatId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

/// An action a seat submits. `RaiseTo` names the new high bet, not a delta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    RaiseTo(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlindKind {
    SmallBlind,
    BigBlind,
}

/// What actually happened, as recorded in the log — richer than the
/// request that produced it (a `RaiseTo` request might resolve to a call,
/// a short all-in, or a full raise; the log records which).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call { amount: u64, all_in: bool },
    Bet { amount: u64, all_in: bool },
    Raise { to: u64, by: u64, all_in: bool },
    PostBlind { kind: BlindKind, amount: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameAction {
    HandStarted {
        hand_number: u64,
        dealer_seat: SeatId,
    },
    DealtHole {
        seat: SeatId,
    },
    StreetDealt {
        stage: Stage,
        community: Vec<Card>,
    },
    Showdown {
        results: Vec<HandResult>,
    },
    PotAwarded {
        winners: Vec<SeatId>,
        amount: u64,
        pot_index: usize,
    },
    HandComplete,
    PlayerTimeout {
        seat: SeatId,
    },
    PlayerJoined {
        seat: SeatId,
        agent_id: AgentId,
    },
    PlayerLeft {
        seat: SeatId,
    },
    TableStarted,
    TableEnded,
}

/// One recorded happening in a hand: either a seat's action or a
/// game/dealer-driven transition. This is the payload carried by
/// [`crate::event::Event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionEvent {
    PlayerAction {
        seat: SeatId,
        action: ActionKind,
        is_timeout: bool,
    },
    Game(GameAction),
}

impl ActionEvent {
    pub fn player(seat: SeatId, action: ActionKind, is_timeout: bool) -> Self {
        ActionEvent::PlayerAction {
            seat,
            action,
            is_timeout,
        }
    }

    pub fn game(action: GameAction) -> Self {
        ActionEvent::Game(action)
    }
}

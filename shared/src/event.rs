//! The append-only per-table event record.

use serde::{Deserialize, Serialize};

use crate::action::{ActionEvent, GameAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    HandStart,
    PlayerAction,
    StreetDealt,
    Showdown,
    HandComplete,
    PotAwarded,
    PlayerTimeout,
    PlayerJoined,
    PlayerLeft,
    TableStarted,
    TableEnded,
}

impl ActionEvent {
    /// The storage-facing type tag for this payload.
    pub fn event_type(&self) -> EventType {
        match self {
            ActionEvent::PlayerAction { .. } => EventType::PlayerAction,
            ActionEvent::Game(g) => match g {
                GameAction::HandStarted { .. } => EventType::HandStart,
                GameAction::DealtHole { .. } => EventType::PlayerAction,
                GameAction::StreetDealt { .. } => EventType::StreetDealt,
                GameAction::Showdown { .. } => EventType::Showdown,
                GameAction::PotAwarded { .. } => EventType::PotAwarded,
                GameAction::HandComplete => EventType::HandComplete,
                GameAction::PlayerTimeout { .. } => EventType::PlayerTimeout,
                GameAction::PlayerJoined { .. } => EventType::PlayerJoined,
                GameAction::PlayerLeft { .. } => EventType::PlayerLeft,
                GameAction::TableStarted => EventType::TableStarted,
                GameAction::TableEnded => EventType::TableEnded,
            },
        }
    }
}

/// A single entry in a table's append-only event log. `seq` is allocated by
/// the log itself and is gapless and strictly increasing per table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub table_id: String,
    pub seq: u64,
    pub hand_number: Option<u64>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: ActionEvent,
    pub created_at: u64,
}

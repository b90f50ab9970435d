//! Wire protocol: REST payloads and the duplex-channel frame types.

use serde::{Deserialize, Serialize};

use crate::action::{ActionEvent, PlayerAction, Stage};
use crate::cards::Card;
use crate::player::{AgentId, SeatId, SeatPublic};

/// Negotiated once at join time; a client under this is rejected with
/// `OUTDATED_CLIENT` before a session is minted.
pub const CURRENT_PROTOCOL_VERSION: u32 = 1;
pub const MIN_SUPPORTED_PROTOCOL_VERSION: u32 = 1;

/// A pot as seen by clients: amount plus which seats may win it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotPublic {
    pub amount: u64,
    pub eligible_seats: Vec<SeatId>,
}

/// A snapshot of table + hand state, built fresh after every mutation and
/// tailored to its viewer (own hole cards visible, others hidden).
/// `state_seq` is the hub's monotonic per-table counter; `turn_token` is
/// only present while a hand is active and is the idempotency key the
/// current actor must echo back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatePublic {
    pub table_id: String,
    pub state_seq: u64,
    pub hand_number: u64,
    pub stage: Stage,
    pub seats: Vec<SeatPublic>,
    pub community: Vec<Card>,
    pub pots: Vec<PotPublic>,
    pub small_blind: u64,
    pub big_blind: u64,
    pub to_act: Option<SeatId>,
    pub turn_token: Option<String>,
    pub min_raise: u64,
    pub current_bet: u64,
    pub winners: Vec<SeatId>,
    pub recent_actions: Vec<ActionEvent>,
}

/// Inbound frame from an agent over the duplex channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Action {
        turn_token: String,
        kind: PlayerAction,
    },
    Ping,
}

/// Outbound frame to an agent or observer over the duplex channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    GameState {
        state_seq: u64,
        turn_token: Option<String>,
        payload: GameStatePublic,
    },
    HandComplete {
        payload: GameStatePublic,
    },
    Error {
        code: String,
        message: String,
    },
    Pong,
}

// ---- REST payloads ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAgentRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAgentResponse {
    pub agent_id: AgentId,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTableRequest {
    #[serde(default)]
    pub client_protocol_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTableResponse {
    pub seat_id: SeatId,
    pub session_token: String,
    pub ws_url: String,
    pub protocol_version: u32,
    pub min_supported_protocol_version: u32,
    pub skill_doc_url: String,
    pub action_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Waiting,
    Running,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_id: String,
    pub status: TableStatus,
    pub seated_count: usize,
    pub max_seats: usize,
    pub small_blind: u64,
    pub big_blind: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

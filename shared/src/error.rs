//! The error taxonomy shared by the REST surface, the WS wire protocol, and
//! internal runtime plumbing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ErrorKind {
    // Protocol
    #[error("client protocol version is below the minimum supported version")]
    OutdatedClient,
    #[error("request failed validation")]
    ValidationError,

    // Auth
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session")]
    InvalidSession,

    // State
    #[error("it is not your turn to act")]
    NotYourTurn,
    #[error("that action is not legal right now")]
    InvalidAction,
    #[error("turn token is stale")]
    StaleSeq,
    #[error("table is not in a state that allows this operation")]
    InvalidTableState,
    #[error("table has ended")]
    TableEnded,
    #[error("table is full")]
    TableFull,
    #[error("table not found")]
    TableNotFound,
    #[error("agent is not seated at this table")]
    NotSeated,
    #[error("agent is already seated at a table")]
    AlreadySeated,
    #[error("agent not found")]
    AgentNotFound,

    // Infra
    #[error("internal error")]
    InternalError,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl ErrorKind {
    /// The wire-level `code` string, i.e. the taxonomy name as shouting case.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::OutdatedClient => "OUTDATED_CLIENT",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidApiKey => "INVALID_API_KEY",
            ErrorKind::SessionExpired => "SESSION_EXPIRED",
            ErrorKind::InvalidSession => "INVALID_SESSION",
            ErrorKind::NotYourTurn => "NOT_YOUR_TURN",
            ErrorKind::InvalidAction => "INVALID_ACTION",
            ErrorKind::StaleSeq => "STALE_SEQ",
            ErrorKind::InvalidTableState => "INVALID_TABLE_STATE",
            ErrorKind::TableEnded => "TABLE_ENDED",
            ErrorKind::TableFull => "TABLE_FULL",
            ErrorKind::TableNotFound => "TABLE_NOT_FOUND",
            ErrorKind::NotSeated => "NOT_SEATED",
            ErrorKind::AlreadySeated => "ALREADY_SEATED",
            ErrorKind::AgentNotFound => "AGENT_NOT_FOUND",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }

    /// Whether this error kind mutates no state and is safe to retry
    /// immediately (everything except the infra-failure kinds).
    pub fn is_non_mutating(self) -> bool {
        !matches!(self, ErrorKind::InternalError | ErrorKind::RateLimitExceeded)
    }
}

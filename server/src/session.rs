//! Session registry: O(1) `session_token -> (agent, table, seat, expiry)`
//! lookup, shared by the REST join handler and the duplex channel.
//!
//! Backed by `dashmap` for concurrent access from many socket tasks at once —
//! reads far outnumber writes, since every action on the duplex channel
//! re-resolves its session.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use table_protocol::{AgentId, SeatId};

use crate::token;

#[derive(Clone, Debug)]
pub struct Session {
    pub agent_id: AgentId,
    pub table_id: String,
    pub seat_id: SeatId,
    pub expires_at_ms: u64,
    ttl_ms: u64,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh session token for a newly seated agent, valid for `ttl`.
    /// The same `ttl` window is reused on every [`SessionRegistry::touch`].
    pub fn create(&self, agent_id: AgentId, table_id: String, seat_id: SeatId, ttl: Duration) -> String {
        let token = token::session_token();
        let ttl_ms = ttl.as_millis() as u64;
        self.sessions.insert(
            token.clone(),
            Session {
                agent_id,
                table_id,
                seat_id,
                expires_at_ms: now_ms() + ttl_ms,
                ttl_ms,
            },
        );
        token
    }

    /// Look up a session token, returning `None` if it's missing or expired.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let entry = self.sessions.get(token)?;
        if entry.expires_at_ms < now_ms() {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        Some(entry.clone())
    }

    /// Push a session's expiry back out to a fresh `ttl` window from now.
    /// Called after every accepted action, so an active agent's session
    /// never expires out from under it.
    pub fn touch(&self, token: &str) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.expires_at_ms = now_ms() + entry.ttl_ms;
        }
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }

    pub fn revoke_for_seat(&self, table_id: &str, seat_id: SeatId) {
        self.sessions
            .retain(|_, s| !(s.table_id == table_id && s.seat_id == seat_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_session() {
        let reg = SessionRegistry::new();
        let token = reg.create(AgentId("a".into()), "t1".into(), SeatId(0), Duration::from_secs(60));
        let session = reg.resolve(&token).expect("session should resolve");
        assert_eq!(session.table_id, "t1");
        assert_eq!(session.seat_id, SeatId(0));
    }

    #[test]
    fn expired_session_does_not_resolve() {
        let reg = SessionRegistry::new();
        let token = reg.create(AgentId("a".into()), "t1".into(), SeatId(0), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(reg.resolve(&token).is_none());
    }
}

//! Persistence seam: a narrow trait so the in-memory store used here can
//! later be swapped for a real database without the runtime noticing. The
//! real backing store is an external collaborator, not this crate's
//! concern.

use table_protocol::{AgentId, Event, TableStatus};

#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub agent_id: AgentId,
    pub api_key: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TableRecord {
    pub table_id: String,
    pub status: TableStatus,
    pub seated_count: usize,
    pub max_seats: usize,
    pub small_blind: u64,
    pub big_blind: u64,
}

pub trait Store: Send + Sync {
    fn get_last_event_seq(&self, table_id: &str) -> u64;
    fn create_event(&self, event: Event);
    fn list_events(&self, table_id: &str, from_seq: u64) -> Vec<Event>;
    fn list_tables(&self) -> Vec<TableRecord>;
    fn upsert_table(&self, record: TableRecord);
    fn update_table_status(&self, table_id: &str, status: TableStatus);
    fn get_agent_by_id(&self, agent_id: &AgentId) -> Option<AgentRecord>;
    fn get_agent_by_api_key(&self, api_key: &str) -> Option<AgentRecord>;
    fn create_agent(&self, record: AgentRecord);
}

/// In-memory implementation; the only one shipped here. Good enough for a
/// single-process deployment and for tests — a real deployment backs this
/// trait with whatever datastore the operator already runs.
#[derive(Default)]
pub struct MemStore {
    events: dashmap::DashMap<String, Vec<Event>>,
    tables: dashmap::DashMap<String, TableRecord>,
    agents: dashmap::DashMap<String, AgentRecord>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn get_last_event_seq(&self, table_id: &str) -> u64 {
        self.events
            .get(table_id)
            .and_then(|v| v.last().map(|e| e.seq))
            .unwrap_or(0)
    }

    fn create_event(&self, event: Event) {
        self.events.entry(event.table_id.clone()).or_default().push(event);
    }

    fn list_events(&self, table_id: &str, from_seq: u64) -> Vec<Event> {
        self.events
            .get(table_id)
            .map(|v| v.iter().filter(|e| e.seq > from_seq).cloned().collect())
            .unwrap_or_default()
    }

    fn list_tables(&self) -> Vec<TableRecord> {
        self.tables.iter().map(|e| e.value().clone()).collect()
    }

    fn upsert_table(&self, record: TableRecord) {
        self.tables.insert(record.table_id.clone(), record);
    }

    fn update_table_status(&self, table_id: &str, status: TableStatus) {
        if let Some(mut t) = self.tables.get_mut(table_id) {
            t.status = status;
        }
    }

    fn get_agent_by_id(&self, agent_id: &AgentId) -> Option<AgentRecord> {
        self.agents.get(&agent_id.0).map(|e| e.clone())
    }

    fn get_agent_by_api_key(&self, api_key: &str) -> Option<AgentRecord> {
        self.agents.iter().find(|e| e.api_key == api_key).map(|e| e.value().clone())
    }

    fn create_agent(&self, record: AgentRecord) {
        self.agents.insert(record.agent_id.0.clone(), record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_list_in_seq_order_after_from_seq() {
        let store = MemStore::new();
        for seq in 1..=3u64 {
            store.create_event(Event {
                table_id: "t1".into(),
                seq,
                hand_number: None,
                event_type: table_protocol::EventType::TableStarted,
                payload: table_protocol::ActionEvent::game(table_protocol::GameAction::TableStarted),
                created_at: 0,
            });
        }
        assert_eq!(store.list_events("t1", 1).len(), 2);
        assert_eq!(store.get_last_event_seq("t1"), 3);
    }
}

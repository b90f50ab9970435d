//! Append-only per-table event log: every `ActionEvent` a table produces is
//! wrapped with a gapless, strictly increasing `seq` and kept so a
//! disconnected agent can replay from where it left off.

use std::time::{SystemTime, UNIX_EPOCH};

use table_protocol::{ActionEvent, Event};

use crate::store::Store;

pub struct EventLog {
    table_id: String,
    next_seq: u64,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(table_id: String) -> Self {
        EventLog {
            table_id,
            next_seq: 1,
            events: Vec::new(),
        }
    }

    /// Like [`EventLog::new`], but seeded from a backing store's last known
    /// `seq` for this table, so a table reopened against a store that
    /// already has history for it resumes numbering instead of restarting
    /// from 1.
    pub fn resume_from(table_id: String, store: &dyn Store) -> Self {
        let next_seq = store.get_last_event_seq(&table_id) + 1;
        EventLog {
            table_id,
            next_seq,
            events: Vec::new(),
        }
    }

    pub fn append(&mut self, hand_number: Option<u64>, payload: ActionEvent) -> Event {
        let seq = self.next_seq;
        self.next_seq += 1;
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let event_type = payload.event_type();
        let event = Event {
            table_id: self.table_id.clone(),
            seq,
            hand_number,
            event_type,
            payload,
            created_at,
        };
        self.events.push(event.clone());
        event
    }

    /// Events strictly after `from_seq` (0 for the full history), in order.
    pub fn since(&self, from_seq: u64) -> &[Event] {
        let idx = self.events.partition_point(|e| e.seq <= from_seq);
        &self.events[idx..]
    }

    pub fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_protocol::GameAction;

    #[test]
    fn seq_is_gapless_and_strictly_increasing() {
        let mut log = EventLog::new("t1".into());
        for _ in 0..5 {
            log.append(Some(1), ActionEvent::game(GameAction::TableStarted));
        }
        let seqs: Vec<u64> = log.since(0).iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn since_returns_only_events_after_cursor() {
        let mut log = EventLog::new("t1".into());
        for _ in 0..5 {
            log.append(Some(1), ActionEvent::game(GameAction::TableStarted));
        }
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(5).len(), 0);
    }
}

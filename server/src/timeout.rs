//! Per-seat single-shot timeout scheduling with idempotent cancellation.
//!
//! Built on `tokio::spawn` + `tokio::time::sleep`, with a generation counter
//! per `(table_id, seat_id)` standing in for cancellation: bumping the
//! generation before a timer fires makes it a no-op, so cancel-then-schedule
//! races resolve safely without needing to abort a `JoinHandle`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use table_protocol::SeatId;
use tokio::sync::mpsc;

/// Emitted once a scheduled timer actually elapses without being
/// cancelled/superseded. The consumer (the table manager) applies the
/// default action: check if legal, else fold.
#[derive(Debug, Clone)]
pub struct TimeoutFired {
    pub table_id: String,
    pub seat_id: SeatId,
    pub hand_number: u64,
    pub turn_token: String,
}

#[derive(Clone)]
pub struct TimeoutScheduler {
    generations: Arc<DashMap<(String, usize), u64>>,
    /// Dedup key for between-hand scheduling: `(table_id, completed_hand_number)`.
    between_hand_scheduled: Arc<Mutex<HashSet<(String, u64)>>>,
    fired_tx: mpsc::UnboundedSender<TimeoutFired>,
}

impl TimeoutScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimeoutFired>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            TimeoutScheduler {
                generations: Arc::new(DashMap::new()),
                between_hand_scheduled: Arc::new(Mutex::new(HashSet::new())),
                fired_tx,
            },
            fired_rx,
        )
    }

    /// Schedule (or reschedule) the action-due timer for `seat_id` at
    /// `table_id`. Any previously scheduled timer for this seat is
    /// implicitly cancelled.
    pub fn schedule_action(
        &self,
        table_id: String,
        seat_id: SeatId,
        hand_number: u64,
        turn_token: String,
        delay: Duration,
    ) {
        let key = (table_id.clone(), seat_id.0);
        let my_gen = {
            let mut entry = self.generations.entry(key.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        let generations = self.generations.clone();
        let tx = self.fired_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let still_current = generations.get(&key).map(|g| *g == my_gen).unwrap_or(false);
            if still_current {
                let _ = tx.send(TimeoutFired {
                    table_id,
                    seat_id,
                    hand_number,
                    turn_token,
                });
            }
        });
    }

    /// Cancel any pending timer for this seat (e.g. because it acted before
    /// the clock ran out).
    pub fn cancel(&self, table_id: &str, seat_id: SeatId) {
        if let Some(mut entry) = self.generations.get_mut(&(table_id.to_string(), seat_id.0)) {
            *entry += 1;
        }
    }

    /// Schedule the next-hand kickoff exactly once per completed hand,
    /// regardless of how many callers race to request it.
    pub fn schedule_between_hands_once(&self, table_id: String, completed_hand_number: u64) -> bool {
        let mut seen = self.between_hand_scheduled.lock().unwrap();
        seen.insert((table_id, completed_hand_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_timer_never_fires() {
        let (sched, mut rx) = TimeoutScheduler::new();
        sched.schedule_action("t1".into(), SeatId(0), 1, "tok".into(), Duration::from_millis(20));
        sched.cancel("t1", SeatId(0));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rescheduled_timer_supersedes_the_old_one() {
        let (sched, mut rx) = TimeoutScheduler::new();
        sched.schedule_action("t1".into(), SeatId(0), 1, "old".into(), Duration::from_millis(10));
        sched.schedule_action("t1".into(), SeatId(0), 1, "new".into(), Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(60)).await;
        let fired = rx.try_recv().expect("the latest schedule should fire");
        assert_eq!(fired.turn_token, "new");
        assert!(rx.try_recv().is_err(), "the superseded timer must not also fire");
    }

    #[test]
    fn between_hand_scheduling_is_deduped() {
        let (sched, _rx) = TimeoutScheduler::new();
        assert!(sched.schedule_between_hands_once("t1".into(), 5));
        assert!(!sched.schedule_between_hands_once("t1".into(), 5));
        assert!(sched.schedule_between_hands_once("t1".into(), 6));
    }
}

//! Owns every table in the process: creation, lookup, seating, and the glue
//! between a table's hand engine, its event log, its broadcast hub, and the
//! timeout scheduler. Each table's `Mutex` is its single-writer action lock:
//! every mutation to a table's hand goes through it, so concurrent REST/WS
//! requests serialize per table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use table_protocol::{
    AgentId, ErrorKind, GameStatePublic, PlayerAction, SeatId, ServerFrame, Stage, TableStatus,
    TableSummary,
};
use tokio::sync::Mutex as AsyncMutex;

use crate::broadcast::Hub;
use crate::config::Config;
use crate::event_log::EventLog;
use crate::session::SessionRegistry;
use crate::store::{Store, TableRecord};
use crate::table::Table;
use crate::timeout::{TimeoutFired, TimeoutScheduler};
use crate::token;

pub struct TableHandle {
    pub table: AsyncMutex<Table>,
    pub log: std::sync::Mutex<EventLog>,
    pub hub: Hub,
    last_activity_ms: AtomicU64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct TableManager {
    tables: DashMap<String, Arc<TableHandle>>,
    pub sessions: SessionRegistry,
    pub timeouts: TimeoutScheduler,
    config: Arc<Config>,
    store: Arc<dyn Store>,
}

impl TableManager {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn Store>,
    ) -> (Arc<Self>, tokio::sync::mpsc::UnboundedReceiver<TimeoutFired>) {
        let (timeouts, fired_rx) = TimeoutScheduler::new();
        let manager = Arc::new(TableManager {
            tables: DashMap::new(),
            sessions: SessionRegistry::new(),
            timeouts,
            config,
            store,
        });
        (manager, fired_rx)
    }

    pub fn create_table(
        &self,
        max_seats: usize,
        small_blind: u64,
        big_blind: u64,
        starting_stack: u64,
    ) -> String {
        let table_id = token::generate(8);
        let table_seed = {
            // Derived from a fresh random token rather than the process RNG
            // directly, so table creation doesn't need its own seed source.
            let seed_bytes = token::generate(8);
            u64::from_str_radix(&seed_bytes[..16], 16).unwrap_or(0)
        };
        let table = Table::new(
            table_id.clone(),
            max_seats,
            small_blind,
            big_blind,
            starting_stack,
            table_seed,
        );
        self.store.upsert_table(TableRecord {
            table_id: table_id.clone(),
            status: table.status,
            seated_count: 0,
            max_seats,
            small_blind,
            big_blind,
        });
        let handle = Arc::new(TableHandle {
            table: AsyncMutex::new(table),
            log: std::sync::Mutex::new(EventLog::resume_from(table_id.clone(), self.store.as_ref())),
            hub: Hub::new(),
            last_activity_ms: AtomicU64::new(now_ms()),
        });
        self.tables.insert(table_id.clone(), handle);
        table_id
    }

    /// Mirror a table's current status into the persistent record. Called
    /// after every transition so a store-backed deployment's table listing
    /// stays consistent with the in-memory runtime.
    fn sync_table_status(&self, table_id: &str, status: TableStatus) {
        self.store.update_table_status(table_id, status);
    }

    pub fn get(&self, table_id: &str) -> Option<Arc<TableHandle>> {
        self.tables.get(table_id).map(|e| e.value().clone())
    }

    pub fn list_tables(&self) -> Vec<TableSummary> {
        self.tables
            .iter()
            .filter_map(|e| {
                let handle = e.value();
                handle.table.try_lock().ok().map(|t| TableSummary {
                    table_id: t.table_id.clone(),
                    status: t.status,
                    seated_count: t.occupied_seat_count(),
                    max_seats: t.max_seats,
                    small_blind: t.small_blind,
                    big_blind: t.big_blind,
                })
            })
            .collect()
    }

    fn touch(&self, handle: &TableHandle) {
        handle.last_activity_ms.store(now_ms(), Ordering::Relaxed);
    }

    /// Seat an agent, start a hand if two or more are now seated, mint a
    /// session token, broadcast the resulting state, and arm the first
    /// action timer.
    pub async fn join(&self, table_id: &str, agent_id: AgentId) -> Result<(SeatId, String, GameStatePublic), ErrorKind> {
        let handle = self.get(table_id).ok_or(ErrorKind::TableNotFound)?;
        let mut table = handle.table.lock().await;
        let seat_id = table.seat_agent(agent_id.clone())?;
        let started = table.maybe_start_hand();
        self.log_and_broadcast(&handle, &table, started.unwrap_or_default());
        self.sync_table_status(table_id, table.status);
        let session_token = self.sessions.create(
            agent_id,
            table_id.to_string(),
            seat_id,
            Duration::from_millis(self.config.table_abandonment_grace_ms),
        );
        self.touch(&handle);
        self.arm_action_timer(table_id, &table);
        let state = table.public_state_for(Some(seat_id));
        Ok((seat_id, session_token, state))
    }

    pub async fn leave(&self, session_token: &str) -> Result<(), ErrorKind> {
        let session = self.sessions.resolve(session_token).ok_or(ErrorKind::InvalidSession)?;
        let handle = self.get(&session.table_id).ok_or(ErrorKind::TableNotFound)?;
        let mut table = handle.table.lock().await;
        table.unseat(session.seat_id)?;
        self.sessions.revoke(session_token);
        handle.hub.unsubscribe_seat(session.seat_id);
        self.touch(&handle);
        self.log_and_broadcast(&handle, &table, Vec::new());
        self.sync_table_status(&session.table_id, table.status);
        Ok(())
    }

    /// Apply a seat's action via its session + turn token. This is the one
    /// path both the REST-free duplex channel and the timeout-fired
    /// consumer funnel through, so every mutation is logged and broadcast
    /// the same way regardless of who triggered it.
    pub async fn apply_action(
        &self,
        session_token: &str,
        turn_token: &str,
        action: PlayerAction,
    ) -> Result<GameStatePublic, ErrorKind> {
        let session = self.sessions.resolve(session_token).ok_or(ErrorKind::InvalidSession)?;
        let handle = self.get(&session.table_id).ok_or(ErrorKind::TableNotFound)?;
        let mut table = handle.table.lock().await;

        self.timeouts.cancel(&session.table_id, session.seat_id);
        let events = table.apply_action(session.seat_id, turn_token, action, false)?;
        self.sessions.touch(session_token);
        let hand_complete = table
            .current_hand
            .as_ref()
            .map(|h| h.stage == Stage::Complete)
            .unwrap_or(false);

        self.log_and_broadcast(&handle, &table, events);

        if hand_complete {
            let completed_hand = table.hand_number;
            table.advance_to_next_hand();
            if self.timeouts.schedule_between_hands_once(session.table_id.clone(), completed_hand) {
                let started = table.maybe_start_hand();
                self.log_and_broadcast(&handle, &table, started.unwrap_or_default());
            }
            self.sync_table_status(&session.table_id, table.status);
        }

        self.touch(&handle);
        self.arm_action_timer(&session.table_id, &table);
        Ok(table.public_state_for(Some(session.seat_id)))
    }

    /// Called when a scheduled timer actually elapses: apply check-if-legal-
    /// else-fold on the seat's behalf.
    pub async fn apply_timeout_default(&self, fired: TimeoutFired) {
        let Some(handle) = self.get(&fired.table_id) else { return };
        let mut table = handle.table.lock().await;
        let Some(hand) = &table.current_hand else { return };
        if hand.turn_token.as_deref() != Some(fired.turn_token.as_str()) {
            return; // superseded by a real action already
        }
        let actor = fired.seat_id.0;
        let action = if hand.round_bets.get(actor).copied().unwrap_or(0) >= hand.current_bet {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        };
        drop(table);
        let _ = self
            .apply_action_as_seat(&fired.table_id, fired.seat_id, &fired.turn_token, action, true)
            .await;
    }

    /// Internal: apply an action on a seat's behalf without going through a
    /// session token (used by the timeout path, which acts on the table's
    /// authority rather than the agent's).
    async fn apply_action_as_seat(
        &self,
        table_id: &str,
        seat_id: SeatId,
        turn_token: &str,
        action: PlayerAction,
        is_timeout: bool,
    ) -> Result<(), ErrorKind> {
        let handle = self.get(table_id).ok_or(ErrorKind::TableNotFound)?;
        let mut table = handle.table.lock().await;
        let mut events = Vec::new();
        if is_timeout {
            events.push(table_protocol::ActionEvent::game(
                table_protocol::GameAction::PlayerTimeout { seat: seat_id },
            ));
        }
        events.extend(table.apply_action(seat_id, turn_token, action, is_timeout)?);
        let hand_complete = table
            .current_hand
            .as_ref()
            .map(|h| h.stage == Stage::Complete)
            .unwrap_or(false);
        self.log_and_broadcast(&handle, &table, events);
        if hand_complete {
            let completed_hand = table.hand_number;
            table.advance_to_next_hand();
            if self.timeouts.schedule_between_hands_once(table_id.to_string(), completed_hand) {
                let started = table.maybe_start_hand();
                self.log_and_broadcast(&handle, &table, started.unwrap_or_default());
            }
            self.sync_table_status(table_id, table.status);
        }
        self.touch(&handle);
        self.arm_action_timer(table_id, &table);
        Ok(())
    }

    fn arm_action_timer(&self, table_id: &str, table: &Table) {
        if let Some(hand) = &table.current_hand {
            if hand.stage != Stage::Complete && hand.stage != Stage::Showdown {
                if let Some(token) = &hand.turn_token {
                    self.timeouts.schedule_action(
                        table_id.to_string(),
                        hand.seats[hand.to_act].seat_id,
                        hand.hand_number,
                        token.clone(),
                        Duration::from_millis(self.config.default_action_timeout_ms),
                    );
                }
            }
        }
    }

    fn log_and_broadcast(&self, handle: &TableHandle, table: &Table, events: Vec<table_protocol::ActionEvent>) {
        if events.is_empty() {
            return;
        }
        let hand_number = table.current_hand.as_ref().map(|h| h.hand_number).or(if table.hand_number > 0 { Some(table.hand_number) } else { None });
        {
            let mut log = handle.log.lock().unwrap();
            for event in &events {
                let persisted = log.append(hand_number, event.clone());
                self.store.create_event(persisted);
            }
        }
        let is_hand_complete = table
            .current_hand
            .as_ref()
            .map(|h| h.stage == Stage::Complete)
            .unwrap_or(false);

        // Personalize per seat (each seat sees its own hole cards).
        let occupied_seats: Vec<SeatId> = table
            .seats
            .iter()
            .filter(|s| s.is_occupied())
            .map(|s| s.seat_id)
            .collect();
        for seat_id in occupied_seats {
            let payload = table.public_state_with_recent(Some(seat_id), events.clone());
            let frame = if is_hand_complete {
                ServerFrame::HandComplete { payload }
            } else {
                ServerFrame::GameState {
                    state_seq: table.state_seq,
                    turn_token: table.current_hand.as_ref().and_then(|h| h.turn_token.clone()),
                    payload,
                }
            };
            handle.hub.send_to_seat(seat_id, frame);
        }
        let observer_payload = table.public_state_with_recent(None, events);
        handle.hub.broadcast(ServerFrame::GameState {
            state_seq: table.state_seq,
            turn_token: None,
            payload: observer_payload,
        });
    }

    /// End any table with zero occupied seats whose grace period has
    /// elapsed. Call periodically from a background task.
    pub async fn sweep_abandoned(&self) {
        let grace = self.config.table_abandonment_grace_ms;
        let now = now_ms();
        let stale: Vec<String> = self
            .tables
            .iter()
            .filter_map(|e| {
                let handle = e.value();
                let idle = now.saturating_sub(handle.last_activity_ms.load(Ordering::Relaxed));
                if idle < grace {
                    return None;
                }
                handle.table.try_lock().ok().and_then(|t| {
                    if t.occupied_seat_count() == 0 && t.status != TableStatus::Ended {
                        Some(e.key().clone())
                    } else {
                        None
                    }
                })
            })
            .collect();
        for table_id in stale {
            if let Some(handle) = self.get(&table_id) {
                let mut table = handle.table.lock().await;
                table.status = TableStatus::Ended;
                self.log_and_broadcast(
                    &handle,
                    &table,
                    vec![table_protocol::ActionEvent::game(table_protocol::GameAction::TableEnded)],
                );
                self.sync_table_status(&table_id, table.status);
            }
        }
    }

    pub fn table_ids(&self) -> Vec<String> {
        self.tables.iter().map(|e| e.key().clone()).collect()
    }
}

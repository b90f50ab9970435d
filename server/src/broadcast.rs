//! Per-table broadcast hub: fans a `ServerFrame` out to every subscriber.
//!
//! Seats get a guarantee: their queue is a bounded channel that is never
//! coalesced or reordered, and a full queue disconnects the subscriber
//! (`SLOW_CONSUMER`) rather than silently dropping a frame — the client
//! resyncs by reconnecting and replaying the event log from its last known
//! `seq`. Observers are best-effort: `tokio::sync::broadcast` is allowed to
//! drop/coalesce under lag, kept as a separate channel per table.

use dashmap::DashMap;
use table_protocol::{SeatId, ServerFrame};
use tokio::sync::{broadcast, mpsc};

const SEAT_QUEUE_CAPACITY: usize = 256;
const OBSERVER_CHANNEL_CAPACITY: usize = 256;

pub struct Hub {
    seats: DashMap<SeatId, mpsc::Sender<ServerFrame>>,
    observers: broadcast::Sender<ServerFrame>,
}

impl Default for Hub {
    fn default() -> Self {
        let (observers, _rx) = broadcast::channel(OBSERVER_CHANNEL_CAPACITY);
        Hub {
            seats: DashMap::new(),
            observers,
        }
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_seat(&self, seat_id: SeatId) -> mpsc::Receiver<ServerFrame> {
        let (tx, rx) = mpsc::channel(SEAT_QUEUE_CAPACITY);
        self.seats.insert(seat_id, tx);
        rx
    }

    pub fn subscribe_observer(&self) -> broadcast::Receiver<ServerFrame> {
        self.observers.subscribe()
    }

    pub fn unsubscribe_seat(&self, seat_id: SeatId) {
        self.seats.remove(&seat_id);
    }

    /// Send one frame to exactly one seat. Returns `false` (and drops the
    /// subscriber) if its queue was full — the caller should treat this as
    /// a `SLOW_CONSUMER` disconnect, never as a silently-dropped frame.
    pub fn send_to_seat(&self, seat_id: SeatId, frame: ServerFrame) -> bool {
        let Some(tx) = self.seats.get(&seat_id) else {
            return true;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                drop(tx);
                self.seats.remove(&seat_id);
                false
            }
        }
    }

    /// Send the same frame to every seated subscriber and every observer.
    pub fn broadcast(&self, frame: ServerFrame) {
        let seat_ids: Vec<SeatId> = self.seats.iter().map(|e| *e.key()).collect();
        for seat_id in seat_ids {
            self.send_to_seat(seat_id, frame.clone());
        }
        let _ = self.observers.send(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_subscriber_receives_frames_in_order() {
        let hub = Hub::new();
        let mut rx = hub.subscribe_seat(SeatId(0));
        hub.send_to_seat(SeatId(0), ServerFrame::Pong);
        hub.send_to_seat(SeatId(0), ServerFrame::Error { code: "X".into(), message: "y".into() });
        assert!(matches!(rx.try_recv().unwrap(), ServerFrame::Pong));
        assert!(matches!(rx.try_recv().unwrap(), ServerFrame::Error { .. }));
    }

    #[test]
    fn full_seat_queue_disconnects_rather_than_drops_silently() {
        let hub = Hub::new();
        let _rx = hub.subscribe_seat(SeatId(0));
        for _ in 0..SEAT_QUEUE_CAPACITY {
            assert!(hub.send_to_seat(SeatId(0), ServerFrame::Pong));
        }
        assert!(!hub.send_to_seat(SeatId(0), ServerFrame::Pong));
        assert!(!hub.send_to_seat(SeatId(0), ServerFrame::Pong), "subscriber was removed");
    }
}

//! A single table: persistent seats plus whatever hand is currently being
//! played, if any. Seats and table config outlive any one hand; a hand is
//! transient state that gets replaced wholesale when the next one starts.

use table_protocol::{
    AgentId, ErrorKind, GameStatePublic, PlayerAction, SeatId, SeatPublic, Stage, TableStatus,
};

use super::hand::{Hand, Seat};
use super::pot;
use crate::token;

pub struct Table {
    pub table_id: String,
    pub max_seats: usize,
    pub seats: Vec<Seat>,
    pub small_blind: u64,
    pub big_blind: u64,
    pub starting_stack: u64,
    pub table_seed: u64,
    pub dealer_seat: usize,
    pub hand_number: u64,
    pub current_hand: Option<Hand>,
    pub status: TableStatus,
    pub state_seq: u64,
}

impl Table {
    pub fn new(
        table_id: String,
        max_seats: usize,
        small_blind: u64,
        big_blind: u64,
        starting_stack: u64,
        table_seed: u64,
    ) -> Self {
        Table {
            table_id,
            max_seats,
            seats: (0..max_seats).map(|i| Seat::empty(SeatId(i))).collect(),
            small_blind,
            big_blind,
            starting_stack,
            table_seed,
            dealer_seat: 0,
            hand_number: 0,
            current_hand: None,
            status: TableStatus::Waiting,
            state_seq: 0,
        }
    }

    pub fn occupied_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn seat_agent(&mut self, agent_id: AgentId) -> Result<SeatId, ErrorKind> {
        if self.status == TableStatus::Ended {
            return Err(ErrorKind::TableEnded);
        }
        if self.seats.iter().any(|s| s.agent_id.as_ref() == Some(&agent_id)) {
            return Err(ErrorKind::AlreadySeated);
        }
        let slot = self
            .seats
            .iter()
            .position(|s| !s.is_occupied())
            .ok_or(ErrorKind::TableFull)?;
        self.seats[slot].agent_id = Some(agent_id);
        self.seats[slot].stack = self.starting_stack;
        // A newly seated agent sits out the hand already in progress, if any.
        if let Some(hand) = &mut self.current_hand {
            if slot < hand.seats.len() {
                hand.seats[slot] = self.seats[slot].clone();
                hand.seats[slot].folded = true;
                hand.seats[slot].sitting_out_this_hand = true;
            }
        }
        Ok(SeatId(slot))
    }

    pub fn unseat(&mut self, seat_id: SeatId) -> Result<(), ErrorKind> {
        let idx: usize = seat_id.into();
        if idx >= self.seats.len() || !self.seats[idx].is_occupied() {
            return Err(ErrorKind::NotSeated);
        }
        self.seats[idx] = Seat::empty(seat_id);
        if let Some(hand) = &mut self.current_hand {
            if idx < hand.seats.len() && !hand.seats[idx].folded {
                hand.seats[idx].folded = true;
            }
        }
        self.drop_to_waiting_if_short();
        Ok(())
    }

    /// A table only plays with two or more seated agents. If a seat leaves
    /// (or a hand completes) and fewer than two remain, fall back to
    /// `Waiting` so the next seat to join can kick off a fresh hand.
    /// `Ended` is terminal and never reverts.
    fn drop_to_waiting_if_short(&mut self) {
        if self.status == TableStatus::Running && self.occupied_seat_count() < 2 {
            self.status = TableStatus::Waiting;
        }
    }

    /// Start a new hand if none is running and at least two seats are
    /// occupied. Returns the startup events, or `None` if a hand was
    /// already running or there weren't enough seated agents.
    pub fn maybe_start_hand(&mut self) -> Option<Vec<table_protocol::ActionEvent>> {
        if self.current_hand.is_some() || self.occupied_seat_count() < 2 {
            return None;
        }
        self.hand_number += 1;
        self.status = TableStatus::Running;
        let occupied: Vec<usize> = (0..self.seats.len()).filter(|&i| self.seats[i].is_occupied()).collect();
        if !occupied.contains(&self.dealer_seat) {
            self.dealer_seat = occupied[0];
        }
        let (mut hand, mut events) = Hand::start(
            self.seats.clone(),
            self.hand_number,
            self.table_seed,
            self.dealer_seat,
            self.small_blind,
            self.big_blind,
        );
        hand.turn_token = Some(token::turn_token());
        self.current_hand = Some(hand);
        events.push(table_protocol::ActionEvent::game(
            table_protocol::GameAction::TableStarted,
        ));
        Some(events)
    }

    /// Apply a seat's action, validating turn ownership via `turn_token`.
    /// Resolves showdown inline if the action ends the hand. `is_timeout`
    /// marks an action taken by the scheduler's default rather than chosen
    /// by the seat.
    pub fn apply_action(
        &mut self,
        seat_id: SeatId,
        turn_token: &str,
        action: PlayerAction,
        is_timeout: bool,
    ) -> Result<Vec<table_protocol::ActionEvent>, ErrorKind> {
        let hand = self.current_hand.as_mut().ok_or(ErrorKind::InvalidTableState)?;
        let actor: usize = seat_id.into();
        if actor >= hand.seats.len() || !hand.seats[actor].is_occupied() {
            return Err(ErrorKind::NotSeated);
        }
        match &hand.turn_token {
            Some(t) if t == turn_token => {}
            Some(_) => return Err(ErrorKind::StaleSeq),
            None => return Err(ErrorKind::InvalidTableState),
        }

        let mut events = hand.apply_action(actor, action, is_timeout)?;

        if hand.stage == Stage::Showdown {
            events.extend(pot::resolve_showdown(hand));
        }

        if hand.stage == Stage::Complete {
            hand.turn_token = None;
            self.seats = hand.seats.clone();
        } else {
            hand.turn_token = Some(token::turn_token());
        }
        self.state_seq += 1;
        Ok(events)
    }

    /// Once a hand completes, clear it and rotate the dealer button so the
    /// next `maybe_start_hand` deals a fresh hand.
    pub fn advance_to_next_hand(&mut self) {
        if self.current_hand.as_ref().is_some_and(|h| h.stage == Stage::Complete) {
            let occupied: Vec<usize> = (0..self.seats.len()).filter(|&i| self.seats[i].is_occupied()).collect();
            if let Some(pos) = occupied.iter().position(|&i| i == self.dealer_seat) {
                if !occupied.is_empty() {
                    self.dealer_seat = occupied[(pos + 1) % occupied.len()];
                }
            } else if !occupied.is_empty() {
                self.dealer_seat = occupied[0];
            }
            self.current_hand = None;
            self.drop_to_waiting_if_short();
        }
    }

    pub fn public_state_for(&self, viewer: Option<SeatId>) -> GameStatePublic {
        self.public_state_with_recent(viewer, Vec::new())
    }

    /// Same as [`Table::public_state_for`], but attaches the events that
    /// were just produced by the mutation that led to this snapshot, so a
    /// client doesn't have to separately query the event log to see what
    /// just happened.
    pub fn public_state_with_recent(&self, viewer: Option<SeatId>, recent_actions: Vec<table_protocol::ActionEvent>) -> GameStatePublic {
        let (stage, community, hand_number, small_blind, big_blind, to_act, turn_token, min_raise, current_bet, winners, seats, pots) =
            match &self.current_hand {
                Some(hand) => {
                    let pots = pot::pots_public(&pot::build_pots(hand), hand);
                    let seats: Vec<SeatPublic> = hand
                        .seats
                        .iter()
                        .map(|s| {
                            let reveal = Some(s.seat_id) == viewer || hand.stage == Stage::Complete;
                            let mut public = s.public(reveal && s.is_occupied());
                            public.current_bet = hand.round_bets.get(s.seat_id.0).copied().unwrap_or(0);
                            public
                        })
                        .collect();
                    (
                        hand.stage,
                        hand.community.clone(),
                        hand.hand_number,
                        hand.small_blind,
                        hand.big_blind,
                        if hand.stage == Stage::Complete || hand.stage == Stage::Showdown {
                            None
                        } else {
                            Some(hand.seats[hand.to_act].seat_id)
                        },
                        hand.turn_token.clone(),
                        hand.min_raise,
                        hand.current_bet,
                        hand.winners.clone(),
                        seats,
                        pots,
                    )
                }
                None => (
                    Stage::Complete,
                    Vec::new(),
                    self.hand_number,
                    self.small_blind,
                    self.big_blind,
                    None,
                    None,
                    0,
                    0,
                    Vec::new(),
                    self.seats.iter().map(|s| s.public(false)).collect(),
                    Vec::new(),
                ),
            };

        GameStatePublic {
            table_id: self.table_id.clone(),
            state_seq: self.state_seq,
            hand_number,
            stage,
            seats,
            community,
            pots,
            small_blind,
            big_blind,
            to_act,
            turn_token,
            min_raise,
            current_bet,
            winners,
            recent_actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heads_up_hand_runs_to_completion() {
        let mut table = Table::new("t1".into(), 6, 5, 10, 1000, 1);
        let a = table.seat_agent(AgentId("alice".into())).unwrap();
        let b = table.seat_agent(AgentId("bob".into())).unwrap();
        table.maybe_start_hand().expect("two seated agents start a hand");

        // Drive the hand to completion by always calling/checking.
        for _ in 0..200 {
            let hand = table.current_hand.as_ref().unwrap();
            if hand.stage == Stage::Complete {
                break;
            }
            let to_act = hand.seats[hand.to_act].seat_id;
            let token = hand.turn_token.clone().unwrap();
            let action = if hand.round_bets[hand.to_act] < hand.current_bet {
                PlayerAction::Call
            } else {
                PlayerAction::Check
            };
            table.apply_action(to_act, &token, action, false).unwrap();
        }
        let hand = table.current_hand.as_ref().unwrap();
        assert_eq!(hand.stage, Stage::Complete);
        let total_stack: u64 = hand.seats.iter().filter(|s| s.is_occupied()).map(|s| s.stack).sum();
        assert_eq!(total_stack, 2000);
        let _ = (a, b);
    }
}

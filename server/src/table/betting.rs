//! Action legality and application.
//!
//! `RaiseTo(new_total)` names the new high bet rather than a delta. The
//! short-all-in-does-not-reopen-action rule is preserved by only advancing
//! `min_raise` when the raise increment meets it — a short all-in stays
//! callable but doesn't let anyone re-raise below the last full increment.

use table_protocol::{ActionEvent, ActionKind, ErrorKind, PlayerAction};

use super::hand::Hand;

impl Hand {
    /// Apply `action` on behalf of `actor` (a seat slot index, already
    /// resolved from the acting seat's turn token). `is_timeout` marks the
    /// action as the scheduler's default rather than one the seat actually
    /// chose, which is stamped onto the resulting `PLAYER_ACTION` event.
    /// Returns the events this action produced, in order.
    pub fn apply_action(
        &mut self,
        actor: usize,
        action: PlayerAction,
        is_timeout: bool,
    ) -> Result<Vec<ActionEvent>, ErrorKind> {
        if actor != self.to_act {
            return Err(ErrorKind::NotYourTurn);
        }
        if self.seats[actor].folded {
            return Err(ErrorKind::InvalidAction);
        }
        if self.seats[actor].all_in {
            return Err(ErrorKind::InvalidAction);
        }

        let prev_current_bet = self.current_bet;
        let seat_id = self.seats[actor].seat_id;
        let mut events = Vec::new();

        match action {
            PlayerAction::Fold => {
                self.seats[actor].folded = true;
                events.push(ActionEvent::player(seat_id, ActionKind::Fold, is_timeout));
            }
            PlayerAction::Check => {
                if self.round_bets[actor] < self.current_bet {
                    return Err(ErrorKind::InvalidAction);
                }
                events.push(ActionEvent::player(seat_id, ActionKind::Check, is_timeout));
            }
            PlayerAction::Call => {
                events.push(self.do_call(actor, is_timeout));
            }
            PlayerAction::RaiseTo(target) => {
                events.push(self.do_raise_to(actor, target, is_timeout)?);
            }
        }

        events.extend(self.post_action_update(actor, prev_current_bet));
        Ok(events)
    }

    fn do_call(&mut self, actor: usize, is_timeout: bool) -> ActionEvent {
        let need = self.current_bet.saturating_sub(self.round_bets[actor]);
        let seat_id = self.seats[actor].seat_id;
        if need == 0 {
            return ActionEvent::player(seat_id, ActionKind::Check, is_timeout);
        }
        let pay = need.min(self.seats[actor].stack);
        self.seats[actor].stack -= pay;
        self.round_bets[actor] += pay;
        self.total_contrib[actor] += pay;
        let all_in = self.seats[actor].stack == 0;
        if all_in {
            self.seats[actor].all_in = true;
        }
        ActionEvent::player(seat_id, ActionKind::Call { amount: pay, all_in }, is_timeout)
    }

    fn do_raise_to(&mut self, actor: usize, target: u64, is_timeout: bool) -> Result<ActionEvent, ErrorKind> {
        let seat_id = self.seats[actor].seat_id;
        let available = self.seats[actor].stack + self.round_bets[actor];
        let clamped_target = target.min(available);
        let add = clamped_target.saturating_sub(self.round_bets[actor]);

        if add == 0 || add > self.seats[actor].stack {
            return Err(ErrorKind::InvalidAction);
        }

        if self.current_bet == 0 {
            // Opening bet: must reach the big blind unless it is an all-in
            // for less.
            let is_all_in = add == self.seats[actor].stack;
            if clamped_target < self.big_blind && !is_all_in {
                return Err(ErrorKind::InvalidAction);
            }
            self.seats[actor].stack -= add;
            self.round_bets[actor] += add;
            self.total_contrib[actor] += add;
            self.current_bet = self.round_bets[actor];
            self.min_raise = self.current_bet.max(self.big_blind);
            if is_all_in {
                self.seats[actor].all_in = true;
            }
            return Ok(ActionEvent::player(
                seat_id,
                ActionKind::Bet {
                    amount: add,
                    all_in: is_all_in,
                },
                is_timeout,
            ));
        }

        let new_total = self.round_bets[actor] + add;
        if new_total <= self.current_bet {
            // Not a real raise: resolve as a call.
            return Ok(self.do_call(actor, is_timeout));
        }

        let by = new_total - self.current_bet;
        let is_all_in = add == self.seats[actor].stack;
        if by < self.min_raise && !is_all_in {
            // Too small to be a legal raise; falls back to a call.
            return Ok(self.do_call(actor, is_timeout));
        }

        self.seats[actor].stack -= add;
        self.round_bets[actor] += add;
        self.total_contrib[actor] += add;
        self.current_bet = new_total;
        if by >= self.min_raise {
            // Full raise: reopens action at this new increment.
            self.min_raise = by;
        }
        // else: short all-in raise. `min_raise` is left unchanged, so a
        // later raiser still must clear the original increment — this seat
        // just can't be re-raised for less than that.
        if is_all_in {
            self.seats[actor].all_in = true;
        }
        Ok(ActionEvent::player(
            seat_id,
            ActionKind::Raise {
                to: new_total,
                by,
                all_in: is_all_in,
            },
            is_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::hand::Seat;
    use table_protocol::SeatId;

    fn seat(id: usize, stack: u64) -> Seat {
        let mut s = Seat::empty(SeatId(id));
        s.agent_id = Some(table_protocol::AgentId(format!("agent-{id}")));
        s.stack = stack;
        s
    }

    #[test]
    fn short_all_in_raise_does_not_reopen_action() {
        let seats = vec![seat(0, 1000), seat(1, 1000), seat(2, 15)];
        let (mut hand, _) = Hand::start(seats, 1, 1, 0, 5, 10);
        // seat 2 (BB-adjacent short stack) goes all-in for less than a full raise.
        let actor = hand.to_act;
        hand.apply_action(actor, PlayerAction::RaiseTo(15), false).unwrap();
        assert_eq!(hand.min_raise, 10, "min_raise unchanged by a short all-in raise");
    }

    #[test]
    fn open_bet_below_big_blind_is_rejected_unless_all_in() {
        let seats = vec![seat(0, 1000), seat(1, 1000)];
        let (mut hand, _) = Hand::start(seats, 1, 1, 0, 5, 10);
        hand.current_bet = 0;
        hand.round_bets = vec![0, 0];
        let actor = hand.to_act;
        let err = hand.apply_action(actor, PlayerAction::RaiseTo(3), false);
        assert!(err.is_err());
    }
}

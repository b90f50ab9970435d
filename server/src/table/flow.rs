//! Turn advancement, round-completion, and stage transitions. Seat indices
//! may be vacant between hands, and dealer rotation is recomputed per hand
//! rather than assumed fixed, so heads-up and 3+-handed play share the same
//! code path.

use table_protocol::{ActionEvent, GameAction, Stage};

use super::hand::Hand;

impl Hand {
    pub(crate) fn occupied_indices(&self) -> Vec<usize> {
        (0..self.seats.len())
            .filter(|&i| self.seats[i].is_occupied() && !self.seats[i].sitting_out_this_hand)
            .collect()
    }

    pub(crate) fn active_indices(&self) -> Vec<usize> {
        self.occupied_indices()
            .into_iter()
            .filter(|&i| !self.seats[i].folded)
            .collect()
    }

    /// Rebuild who still needs to act this street after a bet/raise changes
    /// `current_bet`, sweeping left from the actor.
    pub(crate) fn rebuild_pending_to_act(&mut self, actor: usize) {
        let occupied = self.occupied_indices();
        let n = occupied.len();
        self.pending_to_act.clear();
        let pos = match occupied.iter().position(|&i| i == actor) {
            Some(p) => p,
            None => return,
        };
        for step in 1..=n {
            let idx = occupied[(pos + step) % n];
            if !self.seats[idx].folded
                && !self.seats[idx].all_in
                && self.round_bets[idx] < self.current_bet
            {
                self.pending_to_act.push(idx);
            }
        }
    }

    pub(crate) fn remove_from_pending(&mut self, actor: usize) {
        if let Some(pos) = self.pending_to_act.iter().position(|&i| i == actor) {
            let need = self.current_bet.saturating_sub(self.round_bets[actor]);
            if self.seats[actor].folded || self.seats[actor].all_in || need == 0 {
                self.pending_to_act.remove(pos);
            }
        }
    }

    pub(crate) fn is_betting_round_complete(&self) -> bool {
        self.pending_to_act.is_empty()
    }

    /// Set up per-street betting state and who acts first. Preflop keeps
    /// blinds already posted into `round_bets`; later streets reset
    /// contributions to zero.
    pub(crate) fn init_round_for_stage(&mut self) {
        if self.stage != Stage::Preflop {
            for b in self.round_bets.iter_mut() {
                *b = 0;
            }
            self.current_bet = 0;
            self.min_raise = self.big_blind;
        }

        let occupied = self.occupied_indices();
        let n = occupied.len();
        if n == 0 {
            return;
        }
        let dealer_pos = occupied
            .iter()
            .position(|&i| i == self.dealer_seat)
            .unwrap_or(0);

        let start = match self.stage {
            Stage::Preflop => {
                if n == 2 {
                    occupied[dealer_pos]
                } else {
                    occupied[(dealer_pos + 3) % n]
                }
            }
            Stage::Flop | Stage::Turn | Stage::River => occupied[(dealer_pos + 1) % n],
            Stage::Showdown | Stage::Complete => self.dealer_seat,
        };

        self.pending_to_act.clear();
        let start_pos = occupied.iter().position(|&i| i == start).unwrap_or(0);
        for step in 0..n {
            let idx = occupied[(start_pos + step) % n];
            if !self.seats[idx].folded && !self.seats[idx].all_in {
                self.pending_to_act.push(idx);
            }
        }
        self.to_act = *self.pending_to_act.first().unwrap_or(&start);
    }

    /// Deal the next street's community cards and advance `stage`, or move
    /// to `Showdown` once the river closes. Returns the events to log.
    pub(crate) fn advance_stage(&mut self) -> Vec<ActionEvent> {
        let mut events = Vec::new();
        match self.stage {
            Stage::Preflop => {
                for _ in 0..3 {
                    if let Some(c) = self.deck.pop_front() {
                        self.community.push(c);
                    }
                }
                self.stage = Stage::Flop;
            }
            Stage::Flop => {
                if let Some(c) = self.deck.pop_front() {
                    self.community.push(c);
                }
                self.stage = Stage::Turn;
            }
            Stage::Turn => {
                if let Some(c) = self.deck.pop_front() {
                    self.community.push(c);
                }
                self.stage = Stage::River;
            }
            Stage::River => {
                self.stage = Stage::Showdown;
            }
            Stage::Showdown | Stage::Complete => {}
        }
        if self.stage != Stage::Showdown {
            events.push(ActionEvent::game(GameAction::StreetDealt {
                stage: self.stage,
                community: self.community.clone(),
            }));
        }
        events
    }

    /// Runout: when all remaining contenders are all-in (or only one can
    /// still act), community cards are dealt straight through to the river
    /// with no further betting rounds.
    pub(crate) fn is_action_closed_for_rest_of_hand(&self) -> bool {
        let contenders: Vec<usize> = self.active_indices();
        let can_still_act = contenders.iter().filter(|&&i| !self.seats[i].all_in).count();
        contenders.len() > 1 && can_still_act <= 1
    }

    /// After an action is applied: rebuild who's left to act, advance the
    /// turn, and push the hand into `Showdown` once betting is exhausted —
    /// either because only one contender remains or the river has closed.
    pub(crate) fn post_action_update(
        &mut self,
        actor: usize,
        prev_current_bet: u64,
    ) -> Vec<ActionEvent> {
        let mut events = Vec::new();

        if self.current_bet > prev_current_bet {
            self.rebuild_pending_to_act(actor);
        }
        self.remove_from_pending(actor);

        if self.active_indices().len() <= 1 {
            self.stage = Stage::Showdown;
            return events;
        }

        if self.is_action_closed_for_rest_of_hand() {
            // Everyone left is all-in: run the board out with no further
            // betting rounds.
            while self.stage != Stage::River && self.stage != Stage::Showdown {
                events.extend(self.advance_stage());
            }
            if self.stage == Stage::River {
                events.extend(self.advance_stage());
            }
            return events;
        }

        if self.is_betting_round_complete() {
            events.extend(self.advance_stage());
            if self.stage == Stage::Showdown {
                return events;
            }
            self.init_round_for_stage();
        } else {
            self.to_act = *self.pending_to_act.first().unwrap_or(&self.to_act);
        }

        events
    }
}

//! Hand state: seats, deck, community cards, and the betting/blind bookkeeping
//! that `betting`, `flow`, and `pot` operate on.
//!
//! A table's seats can be occupied or vacated between hands, so a hand keeps
//! its own snapshot of who's playing; per-seat contributions are tracked for
//! the whole hand, not just the current street, so side pots can be built at
//! showdown.

use std::collections::VecDeque;

use table_protocol::{
    ActionEvent, ActionKind, AgentId, BlindKind, Card, GameAction, SeatId, SeatPublic, Stage,
};

use crate::poker;

#[derive(Clone, Debug)]
pub struct Seat {
    pub seat_id: SeatId,
    pub agent_id: Option<AgentId>,
    pub stack: u64,
    pub hole_cards: [Card; 2],
    pub folded: bool,
    pub all_in: bool,
    /// Joined after the hand currently in progress started; sits out until
    /// the next hand.
    pub sitting_out_this_hand: bool,
}

impl Seat {
    pub fn empty(seat_id: SeatId) -> Self {
        Seat {
            seat_id,
            agent_id: None,
            stack: 0,
            hole_cards: [Card::new(table_protocol::Rank::Two, table_protocol::Suit::Clubs); 2],
            folded: false,
            all_in: false,
            sitting_out_this_hand: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.agent_id.is_some()
    }

    pub fn public(&self, reveal_hole_cards: bool) -> SeatPublic {
        SeatPublic {
            seat: self.seat_id,
            agent_id: self.agent_id.clone().unwrap_or_else(|| AgentId(String::new())),
            stack: self.stack,
            current_bet: 0,
            folded: self.folded,
            all_in: self.all_in,
            hole_cards: if reveal_hole_cards {
                Some(self.hole_cards)
            } else {
                None
            },
        }
    }
}

/// All state for the hand currently being played at a table.
#[derive(Clone, Debug)]
pub struct Hand {
    pub hand_number: u64,
    pub seats: Vec<Seat>,
    pub deck: VecDeque<Card>,
    pub community: Vec<Card>,

    pub stage: Stage,
    pub dealer_seat: usize,
    pub to_act: usize,
    pub current_bet: u64,
    pub min_raise: u64,
    /// Contributed this street, indexed by seat slot.
    pub round_bets: Vec<u64>,
    /// Contributed this whole hand (across all streets), for side pots.
    pub total_contrib: Vec<u64>,

    pub small_blind: u64,
    pub big_blind: u64,

    pub pending_to_act: Vec<usize>,
    pub turn_token: Option<String>,
    pub winners: Vec<SeatId>,
}

impl Hand {
    /// Start a new hand across `seats` (only occupied, non-sitting-out seats
    /// participate), dealing hole cards and posting blinds.
    pub fn start(
        seats: Vec<Seat>,
        hand_number: u64,
        table_seed: u64,
        dealer_seat: usize,
        small_blind: u64,
        big_blind: u64,
    ) -> (Self, Vec<ActionEvent>) {
        let deck: VecDeque<Card> = poker::shuffled_deck(table_seed, hand_number).into();
        let n = seats.len();

        let mut hand = Hand {
            hand_number,
            seats,
            deck,
            community: Vec::new(),
            stage: Stage::Preflop,
            dealer_seat,
            to_act: dealer_seat,
            current_bet: 0,
            min_raise: big_blind,
            round_bets: vec![0; n],
            total_contrib: vec![0; n],
            small_blind,
            big_blind,
            pending_to_act: Vec::new(),
            turn_token: None,
            winners: Vec::new(),
        };

        let mut events = vec![ActionEvent::game(GameAction::HandStarted {
            hand_number,
            dealer_seat: SeatId(dealer_seat),
        })];

        for seat in hand.seats.iter_mut() {
            if !seat.is_occupied() || seat.sitting_out_this_hand {
                seat.folded = true;
                continue;
            }
            seat.folded = false;
            seat.all_in = false;
            let c1 = hand.deck.pop_front().expect("52-card deck covers all hole cards");
            let c2 = hand.deck.pop_front().expect("52-card deck covers all hole cards");
            seat.hole_cards = [c1, c2];
            events.push(ActionEvent::game(GameAction::DealtHole {
                seat: seat.seat_id,
            }));
        }

        events.extend(hand.post_blinds());
        hand.init_round_for_stage();
        (hand, events)
    }

    pub fn active_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied() && !s.sitting_out_this_hand).count()
    }

    fn post_blinds(&mut self) -> Vec<ActionEvent> {
        let occupied: Vec<usize> = (0..self.seats.len())
            .filter(|&i| self.seats[i].is_occupied() && !self.seats[i].sitting_out_this_hand)
            .collect();
        let n = occupied.len();
        if n < 2 {
            return Vec::new();
        }
        let dealer_pos = occupied
            .iter()
            .position(|&i| i == self.dealer_seat)
            .unwrap_or(0);

        let (sb_idx, bb_idx) = if n == 2 {
            (occupied[dealer_pos], occupied[(dealer_pos + 1) % n])
        } else {
            (
                occupied[(dealer_pos + 1) % n],
                occupied[(dealer_pos + 2) % n],
            )
        };

        let mut events = Vec::with_capacity(2);
        events.push(self.post_blind(sb_idx, BlindKind::SmallBlind, self.small_blind));
        events.push(self.post_blind(bb_idx, BlindKind::BigBlind, self.big_blind));
        self.current_bet = self.big_blind;
        self.min_raise = self.big_blind;

        self.to_act = if n == 2 {
            sb_idx
        } else {
            let bb_pos = occupied.iter().position(|&i| i == bb_idx).unwrap();
            occupied[(bb_pos + 1) % n]
        };
        events
    }

    fn post_blind(&mut self, idx: usize, kind: BlindKind, amount: u64) -> ActionEvent {
        let pay = amount.min(self.seats[idx].stack);
        self.seats[idx].stack -= pay;
        self.round_bets[idx] += pay;
        self.total_contrib[idx] += pay;
        if pay < amount {
            self.seats[idx].all_in = true;
        }
        ActionEvent::player(
            self.seats[idx].seat_id,
            ActionKind::PostBlind { kind, amount: pay },
            false,
        )
    }

    pub fn pot_total(&self) -> u64 {
        self.total_contrib.iter().sum()
    }
}

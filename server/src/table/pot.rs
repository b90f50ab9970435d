//! Side-pot construction and showdown resolution.
//!
//! Evaluates every live hand once, sorts by rank, splits ties with the
//! remainder going to the earliest winner in seat order, and logs
//! `Showdown` then `PotAwarded` events — layered over contribution tiers so
//! uneven all-ins resolve into correct side pots instead of one shared pot.

use table_protocol::{ActionEvent, GameAction, HandResult, PotPublic, SeatId, Stage};

use super::hand::Hand;
use crate::poker;

pub struct Pot {
    pub amount: u64,
    pub eligible: Vec<usize>,
}

/// Build side pots from this hand's per-seat total contributions. Seats
/// that contributed nothing are ignored. Each distinct contribution level
/// becomes a tier; a tier's pot is shared only by seats that contributed at
/// least that much, and won only by non-folded seats among them.
pub fn build_pots(hand: &Hand) -> Vec<Pot> {
    let mut levels: Vec<u64> = hand
        .total_contrib
        .iter()
        .copied()
        .filter(|&c| c > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut prev = 0u64;
    for level in levels {
        let tier = level - prev;
        let contributors: Vec<usize> = (0..hand.total_contrib.len())
            .filter(|&i| hand.total_contrib[i] >= level)
            .collect();
        let amount = tier * contributors.len() as u64;
        let eligible: Vec<usize> = contributors
            .into_iter()
            .filter(|&i| !hand.seats[i].folded)
            .collect();
        if amount > 0 {
            pots.push(Pot { amount, eligible });
        }
        prev = level;
    }
    pots
}

pub fn pots_public(pots: &[Pot], hand: &Hand) -> Vec<PotPublic> {
    pots.iter()
        .map(|p| PotPublic {
            amount: p.amount,
            eligible_seats: p.eligible.iter().map(|&i| hand.seats[i].seat_id).collect(),
        })
        .collect()
}

/// Evaluate every live hand, award each side pot to its winner(s), and
/// return the events to log. Only called once `hand.stage == Showdown`.
pub fn resolve_showdown(hand: &mut Hand) -> Vec<ActionEvent> {
    let mut events = Vec::new();
    let contenders = hand.active_indices();

    let mut results: Vec<HandResult> = contenders
        .iter()
        .map(|&i| {
            let seat = &hand.seats[i];
            let rank = poker::evaluate_best_hand(seat.hole_cards, &hand.community);
            let best_five = poker::pick_best_five(seat.hole_cards, &hand.community);
            HandResult {
                seat: seat.seat_id,
                rank,
                best_five,
            }
        })
        .collect();
    results.sort_by(|a, b| a.rank.cmp(&b.rank));

    if contenders.len() > 1 {
        events.push(ActionEvent::game(GameAction::Showdown {
            results: results.clone(),
        }));
    }

    let rank_by_seat: std::collections::HashMap<SeatId, &HandResult> =
        results.iter().map(|r| (r.seat, r)).collect();

    let pots = build_pots(hand);
    let mut winner_seats: Vec<SeatId> = Vec::new();

    for (pot_index, pot) in pots.iter().enumerate() {
        if pot.eligible.is_empty() || pot.amount == 0 {
            continue;
        }
        let best_rank = pot
            .eligible
            .iter()
            .filter_map(|&i| rank_by_seat.get(&hand.seats[i].seat_id))
            .map(|r| r.rank.clone())
            .max()
            .expect("pot has at least one eligible contender");

        let winners: Vec<usize> = pot
            .eligible
            .iter()
            .copied()
            .filter(|&i| {
                rank_by_seat
                    .get(&hand.seats[i].seat_id)
                    .is_some_and(|r| r.rank == best_rank)
            })
            .collect();

        let share = pot.amount / winners.len() as u64;
        let mut remainder = pot.amount % winners.len() as u64;
        let mut sorted_winners = winners.clone();
        let n = hand.seats.len();
        sorted_winners.sort_by_key(|&w| (w + n - hand.dealer_seat - 1) % n);
        for &w in &sorted_winners {
            let mut win = share;
            if remainder > 0 {
                win += 1;
                remainder -= 1;
            }
            hand.seats[w].stack += win;
            winner_seats.push(hand.seats[w].seat_id);
        }

        events.push(ActionEvent::game(GameAction::PotAwarded {
            winners: sorted_winners.iter().map(|&w| hand.seats[w].seat_id).collect(),
            amount: pot.amount,
            pot_index,
        }));
    }

    winner_seats.sort_unstable();
    winner_seats.dedup();
    hand.winners = winner_seats;
    hand.stage = Stage::Complete;
    events.push(ActionEvent::game(GameAction::HandComplete));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::hand::Seat;
    use table_protocol::{AgentId, PlayerAction, SeatId};

    fn seat(id: usize, stack: u64) -> Seat {
        let mut s = Seat::empty(SeatId(id));
        s.agent_id = Some(AgentId(format!("agent-{id}")));
        s.stack = stack;
        s
    }

    #[test]
    fn three_way_uneven_all_in_builds_two_side_pots() {
        // Seat 2 is short-stacked and can only contest a smaller main pot;
        // seats 0/1 contest an additional side pot between themselves.
        let seats = vec![seat(0, 1000), seat(1, 1000), seat(2, 40)];
        let (mut hand, _) = Hand::start(seats, 1, 1, 0, 5, 10);
        let a1 = hand.to_act;
        hand.apply_action(a1, PlayerAction::RaiseTo(40), false).unwrap();
        let a2 = hand.to_act;
        hand.apply_action(a2, PlayerAction::Call, false).unwrap();
        let a3 = hand.to_act;
        hand.apply_action(a3, PlayerAction::Call, false).unwrap();

        let pots = build_pots(&hand);
        assert!(pots.len() >= 2, "expected at least a main pot and one side pot");
        let total: u64 = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, hand.total_contrib.iter().sum::<u64>());
    }

    #[test]
    fn chip_conservation_across_split_pot() {
        let seats = vec![seat(0, 500), seat(1, 500)];
        let (mut hand, _) = Hand::start(seats, 1, 1, 0, 5, 10);
        let starting_total: u64 = hand.seats.iter().map(|s| s.stack).sum::<u64>()
            + hand.total_contrib.iter().sum::<u64>();
        hand.stage = Stage::River;
        hand.community = hand.community.clone();
        resolve_showdown(&mut hand);
        let ending_total: u64 = hand.seats.iter().map(|s| s.stack).sum();
        assert_eq!(starting_total, ending_total);
    }
}

//! Best-5-of-7 hand evaluation.
//!
//! Buckets cards by rank value and scans high to low for each hand category,
//! then produces the exact best 5-card combination via `pick_best_five`.

use table_protocol::{Card, HandCategory, HandRank, Rank, Suit};

const RANK_SLOTS: usize = 16; // index 1..=14 used; 0/15 unused padding

/// Evaluate the best 5-card hand from 2 hole cards + up to 5 community
/// cards. Pure: identical inputs always yield identical outputs.
pub fn evaluate_best_hand(hole: [Card; 2], community: &[Card]) -> HandRank {
    let mut cards = Vec::with_capacity(7);
    cards.push(hole[0]);
    cards.push(hole[1]);
    cards.extend_from_slice(community);
    best_rank_from_cards(&cards)
}

/// The exact best 5-card combination, for presentation at showdown. If
/// fewer than 5 cards are available, returns the highest-ranked cards
/// present (early-street preview; never called for an actual showdown).
pub fn pick_best_five(hole: [Card; 2], community: &[Card]) -> [Card; 5] {
    let mut all = Vec::with_capacity(7);
    all.push(hole[0]);
    all.push(hole[1]);
    all.extend_from_slice(community);

    if all.len() < 5 {
        all.sort_unstable_by_key(|c| std::cmp::Reverse(c.rank().value()));
        let mut out = [Card::new(Rank::Ace, Suit::Clubs); 5];
        let n = all.len().min(5);
        out[..n].copy_from_slice(&all[..n]);
        return out;
    }

    let n = all.len();
    let mut best_rank: Option<HandRank> = None;
    let mut best_combo = [Card::new(Rank::Ace, Suit::Clubs); 5];

    for i in 0..(n - 4) {
        for j in (i + 1)..(n - 3) {
            for k in (j + 1)..(n - 2) {
                for l in (k + 1)..(n - 1) {
                    for m in (l + 1)..n {
                        let subset = [all[i], all[j], all[k], all[l], all[m]];
                        let rank = best_rank_from_cards(&subset);
                        let better = match &best_rank {
                            Some(r) => &rank > r,
                            None => true,
                        };
                        if better {
                            best_rank = Some(rank);
                            best_combo = subset;
                        }
                    }
                }
            }
        }
    }
    best_combo
}

fn best_rank_from_cards(cards: &[Card]) -> HandRank {
    let flush_suit = find_flush_suit(cards);

    if let Some(sf) = check_straight_flush(cards, flush_suit) {
        return sf;
    }

    let counts = rank_counts(cards);
    let values = values_desc(cards);

    if let Some(r) = check_n_of_a_kind(&counts, &values, 4, HandCategory::Quads, 1) {
        return r;
    }
    if let Some(r) = check_full_house(&counts) {
        return r;
    }
    if let Some(r) = check_flush(cards, flush_suit) {
        return r;
    }
    if let Some(r) = check_straight(&values) {
        return r;
    }
    if let Some(r) = check_n_of_a_kind(&counts, &values, 3, HandCategory::Trips, 2) {
        return r;
    }
    if let Some(r) = check_two_pair(&counts, &values) {
        return r;
    }
    if let Some(r) = check_n_of_a_kind(&counts, &values, 2, HandCategory::Pair, 3) {
        return r;
    }
    check_high_card(&values)
}

fn find_flush_suit(cards: &[Card]) -> Option<Suit> {
    let mut counts = [0u8; 4];
    for c in cards {
        counts[c.suit() as usize] += 1;
    }
    (0..4)
        .find(|&s| counts[s] >= 5)
        .map(|s| Suit::ALL[s])
}

fn rank_counts(cards: &[Card]) -> [u8; RANK_SLOTS] {
    let mut counts = [0u8; RANK_SLOTS];
    for c in cards {
        counts[c.rank().value() as usize] += 1;
    }
    counts
}

/// Distinct rank values present, descending (14=Ace..2).
fn values_desc(cards: &[Card]) -> Vec<u8> {
    let mut v: Vec<u8> = cards.iter().map(|c| c.rank().value()).collect();
    v.sort_unstable_by(|a, b| b.cmp(a));
    v.dedup();
    v
}

fn straight_high(values_desc: &[u8]) -> Option<u8> {
    let mut present = [false; RANK_SLOTS];
    for &v in values_desc {
        present[v as usize] = true;
    }
    if present[14] {
        present[1] = true; // wheel: Ace plays low
    }
    let mut best: Option<u8> = None;
    let mut run = 0usize;
    for v in (1..=14).rev() {
        if present[v] {
            run += 1;
        } else {
            run = 0;
        }
        if run >= 5 {
            let high = (v + 4) as u8;
            if best.is_none() {
                best = Some(high);
            }
        }
    }
    best
}

fn check_straight_flush(cards: &[Card], flush_suit: Option<Suit>) -> Option<HandRank> {
    let suit = flush_suit?;
    let suited: Vec<Card> = cards.iter().copied().filter(|c| c.suit() == suit).collect();
    let values = values_desc(&suited);
    let high = straight_high(&values)?;
    Some(HandRank {
        category: HandCategory::StraightFlush,
        tiebreakers: vec![high],
    })
}

fn check_flush(cards: &[Card], flush_suit: Option<Suit>) -> Option<HandRank> {
    let suit = flush_suit?;
    let mut vs: Vec<u8> = cards
        .iter()
        .filter(|c| c.suit() == suit)
        .map(|c| c.rank().value())
        .collect();
    vs.sort_unstable_by(|a, b| b.cmp(a));
    vs.truncate(5);
    Some(HandRank {
        category: HandCategory::Flush,
        tiebreakers: vs,
    })
}

fn check_straight(values_desc: &[u8]) -> Option<HandRank> {
    let high = straight_high(values_desc)?;
    Some(HandRank {
        category: HandCategory::Straight,
        tiebreakers: vec![high],
    })
}

fn check_n_of_a_kind(
    counts: &[u8; RANK_SLOTS],
    values_desc: &[u8],
    n: u8,
    category: HandCategory,
    kicker_count: usize,
) -> Option<HandRank> {
    let rank = (2..=14).rev().find(|&v| counts[v as usize] == n)?;
    let mut kickers: Vec<u8> = values_desc.iter().copied().filter(|&v| v != rank).collect();
    kickers.truncate(kicker_count);
    let mut tiebreakers = vec![rank];
    tiebreakers.extend(kickers);
    Some(HandRank {
        category,
        tiebreakers,
    })
}

fn check_full_house(counts: &[u8; RANK_SLOTS]) -> Option<HandRank> {
    let mut trips: Vec<u8> = (2..=14).rev().filter(|&v| counts[v as usize] >= 3).collect();
    if trips.is_empty() {
        return None;
    }
    let trip = trips.remove(0);
    let pair = (2..=14)
        .rev()
        .filter(|&v| v != trip && counts[v as usize] >= 2)
        .max_by_key(|&v| v)
        .or_else(|| trips.first().copied());
    pair.map(|p| HandRank {
        category: HandCategory::FullHouse,
        tiebreakers: vec![trip, p],
    })
}

fn check_two_pair(counts: &[u8; RANK_SLOTS], values_desc: &[u8]) -> Option<HandRank> {
    let pairs: Vec<u8> = (2..=14).rev().filter(|&v| counts[v as usize] >= 2).collect();
    if pairs.len() < 2 {
        return None;
    }
    let (p_high, p_low) = (pairs[0], pairs[1]);
    let kicker = values_desc
        .iter()
        .copied()
        .find(|&v| v != p_high && v != p_low)
        .unwrap_or(2);
    Some(HandRank {
        category: HandCategory::TwoPair,
        tiebreakers: vec![p_high, p_low, kicker],
    })
}

fn check_high_card(values_desc: &[u8]) -> HandRank {
    let mut highs = values_desc.to_vec();
    highs.truncate(5);
    HandRank {
        category: HandCategory::HighCard,
        tiebreakers: highs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_protocol::Rank::*;
    use table_protocol::Suit::*;

    fn c(r: table_protocol::Rank, s: table_protocol::Suit) -> Card {
        Card::new(r, s)
    }

    #[test]
    fn pair_tiebreakers_compare_correctly() {
        let community = [
            c(Three, Diamonds),
            c(Four, Diamonds),
            c(Nine, Clubs),
            c(Eight, Hearts),
            c(Seven, Spades),
        ];
        let kings = evaluate_best_hand([c(King, Clubs), c(King, Hearts)], &community);
        let queens = evaluate_best_hand([c(Queen, Clubs), c(Queen, Hearts)], &community);
        assert_eq!(kings.category, HandCategory::Pair);
        assert!(kings > queens);
        assert_eq!(kings.tiebreakers[0], 13);
    }

    #[test]
    fn wheel_straight_is_low() {
        let community = [c(Two, Clubs), c(Three, Diamonds), c(Four, Hearts), c(Nine, Spades), c(King, Clubs)];
        let hand = evaluate_best_hand([c(Ace, Spades), c(Five, Clubs)], &community);
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.tiebreakers[0], 5);
    }

    #[test]
    fn straight_flush_beats_quads() {
        let community = [c(Nine, Hearts), c(Ten, Hearts), c(Jack, Hearts), c(Queen, Hearts), c(Queen, Clubs)];
        let sf = evaluate_best_hand([c(King, Hearts), c(Eight, Hearts)], &community);
        let quads = evaluate_best_hand([c(Queen, Diamonds), c(Queen, Spades)], &community);
        assert_eq!(sf.category, HandCategory::StraightFlush);
        assert!(sf > quads);
    }

    #[test]
    fn pick_best_five_returns_exact_winning_combo() {
        let community = [c(Two, Clubs), c(Seven, Diamonds), c(Nine, Hearts), c(Jack, Spades), c(King, Clubs)];
        let hole = [c(Ace, Clubs), c(Ace, Hearts)];
        let best = pick_best_five(hole, &community);
        let rank = evaluate_best_hand(hole, &community);
        assert_eq!(best_rank_from_cards(&best), rank);
    }
}

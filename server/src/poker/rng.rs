//! Deterministic per-hand shuffle.
//!
//! `hand_seed = hash(table_seed || hand_number)` and the shuffle is
//! Fisher-Yates driven by an RNG seeded from that value, so replaying the
//! same `(table_seed, hand_number)` always produces the same deck order.
//! No global RNG state is consulted during a hand.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use table_protocol::Card;

/// FNV-1a over the seed and hand number. Plain and fully deterministic
/// across platforms and Rust versions, unlike `DefaultHasher` (whose
/// internal algorithm is not a stability guarantee of the standard
/// library).
fn hand_seed(table_seed: u64, hand_number: u64) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut h = FNV_OFFSET;
    for byte in table_seed.to_le_bytes().into_iter().chain(hand_number.to_le_bytes()) {
        h ^= byte as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Produce a freshly shuffled 52-card deck for `(table_seed, hand_number)`.
/// Deterministic: identical inputs always yield an identical deck order.
pub fn shuffled_deck(table_seed: u64, hand_number: u64) -> Vec<Card> {
    let seed = hand_seed(table_seed, hand_number);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut deck = Card::full_deck();
    deck.shuffle(&mut rng);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_hand_number_reproduces_shuffle() {
        let d1 = shuffled_deck(42, 7);
        let d2 = shuffled_deck(42, 7);
        assert_eq!(d1, d2);
    }

    #[test]
    fn different_hand_number_reshuffles() {
        let d1 = shuffled_deck(42, 7);
        let d2 = shuffled_deck(42, 8);
        assert_ne!(d1, d2);
    }

    #[test]
    fn deck_is_52_unique_cards() {
        let d = shuffled_deck(1, 1);
        assert_eq!(d.len(), 52);
        let unique: std::collections::HashSet<_> = d.iter().collect();
        assert_eq!(unique.len(), 52);
    }
}

//! Card representation shared by the engine and the wire protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card rank, ordered low to high. `Ace` is high everywhere except the
/// wheel straight (A-2-3-4-5), which the evaluator special-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// High value used for straight/kicker comparisons (2..=14).
    pub fn value(self) -> u8 {
        self as u8 + 2
    }

    fn from_u8(v: u8) -> Self {
        Self::ALL[v as usize]
    }

    fn char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    fn from_u8(v: u8) -> Self {
        Self::ALL[v as usize]
    }

    fn char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

/// A single playing card, packed as `suit * 13 + rank` (0..52).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card(pub u8);

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card((suit as u8) * 13 + rank as u8)
    }

    pub fn rank(self) -> Rank {
        Rank::from_u8(self.0 % 13)
    }

    pub fn suit(self) -> Suit {
        Suit::from_u8(self.0 / 13)
    }

    /// Full 52-card deck in a fixed, deterministic order (before shuffling).
    pub fn full_deck() -> Vec<Card> {
        let mut deck = Vec::with_capacity(52);
        for &suit in &Suit::ALL {
            for &rank in &Rank::ALL {
                deck.push(Card::new(rank, suit));
            }
        }
        deck
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().char(), self.suit().char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_has_52_unique_cards() {
        let deck = Card::full_deck();
        assert_eq!(deck.len(), 52);
        let unique: std::collections::HashSet<_> = deck.iter().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn round_trips_rank_and_suit() {
        let c = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(c.rank(), Rank::Ten);
        assert_eq!(c.suit(), Suit::Hearts);
        assert_eq!(c.to_string(), "Th");
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// Canonical build order of a fresh deck.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn name(&self) -> &'static str {
        match self {
            Suit::Hearts => "Hearts",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Spades => "Spades",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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
    /// Canonical build order of a fresh deck (Ace last).
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

    /// Base pip value. Aces count 1 here; the soft bonus is applied by hand valuation.
    pub fn value(&self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
        }
    }
}

/// A single playing card. Only `hidden` changes after creation (the dealer's hole card).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub hidden: bool,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            suit,
            rank,
            hidden: false,
        }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// Same card identity, ignoring the face-down flag.
    pub fn same_face(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }

    pub fn to_display(&self) -> String {
        if self.hidden {
            "**".to_string()
        } else {
            format!("{} of {}", self.rank.name(), self.suit.name())
        }
    }

    /// Maps 0..52 onto the canonical deck order (suit-major, Ace last).
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= 52 {
            return None;
        }
        Some(Card::new(Rank::ALL[index % 13], Suit::ALL[index / 13]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_display() {
        let mut card = Card::new(Rank::King, Suit::Hearts);
        assert_eq!(card.to_display(), "King of Hearts");

        card.hidden = true;
        assert_eq!(card.to_display(), "**");
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(Rank::Ace.value(), 1);
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Nine.value(), 9);
        for face in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
            assert_eq!(face.value(), 10);
        }
    }

    #[test]
    fn test_from_index_canonical_order() {
        assert_eq!(Card::from_index(0), Some(Card::new(Rank::Two, Suit::Hearts)));
        assert_eq!(Card::from_index(12), Some(Card::new(Rank::Ace, Suit::Hearts)));
        assert_eq!(Card::from_index(13), Some(Card::new(Rank::Two, Suit::Diamonds)));
        assert_eq!(Card::from_index(51), Some(Card::new(Rank::Ace, Suit::Spades)));
        assert_eq!(Card::from_index(52), None);
    }

    #[test]
    fn test_same_face_ignores_hidden() {
        let up = Card::new(Rank::Ace, Suit::Clubs);
        let mut down = up;
        down.hidden = true;
        assert!(up.same_face(&down));
        assert!(!up.same_face(&Card::new(Rank::Ace, Suit::Spades)));
    }
}

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::rules::{MAX_DECKS, MIN_DECKS, RESHUFFLE_THRESHOLD};
use crate::{Card, Rank, Suit};

pub const CARDS_PER_DECK: usize = 52;

/// Multi-deck card supply. Cards are dealt from the end of the vector.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    num_decks: u8,
    discarded: usize,
    shuffles: u32,
    rng: ChaCha8Rng,
}

impl Shoe {
    /// Builds and shuffles a shoe using an entropy-seeded RNG.
    pub fn new(num_decks: u8) -> Result<Self> {
        Self::with_rng(num_decks, ChaCha8Rng::from_entropy())
    }

    /// Deterministic shoe; the same seed always yields the same deal order.
    pub fn with_seed(num_decks: u8, seed: u64) -> Result<Self> {
        Self::with_rng(num_decks, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(num_decks: u8, rng: ChaCha8Rng) -> Result<Self> {
        let mut shoe = Self {
            cards: Vec::new(),
            num_decks,
            discarded: 0,
            shuffles: 0,
            rng,
        };
        shoe.build(num_decks)?;
        shoe.shuffle();
        Ok(shoe)
    }

    /// A full, unshuffled shoe whose next draws are exactly `top`, in order.
    ///
    /// The stacked cards are taken out of the canonical build, so the shoe
    /// still holds `num_decks * 52` cards. Fails if `top` asks for more copies
    /// of a card than the shoe contains.
    pub fn stacked(num_decks: u8, top: &[Card]) -> Result<Self> {
        let mut shoe = Self {
            cards: Vec::new(),
            num_decks,
            discarded: 0,
            shuffles: 0,
            rng: ChaCha8Rng::seed_from_u64(u64::from(num_decks)),
        };
        shoe.build(num_decks)?;

        for wanted in top {
            let pos = shoe
                .cards
                .iter()
                .position(|c| c.same_face(wanted))
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "cannot stack {}: not enough copies in a {num_decks} deck shoe",
                        wanted.to_display()
                    ))
                })?;
            shoe.cards.remove(pos);
        }
        shoe.cards
            .extend(top.iter().rev().map(|c| Card::new(c.rank, c.suit)));
        Ok(shoe)
    }

    /// Replaces the contents with `num_decks` canonical 52-card decks.
    pub fn build(&mut self, num_decks: u8) -> Result<()> {
        if !(MIN_DECKS..=MAX_DECKS).contains(&num_decks) {
            return Err(Error::Configuration(format!(
                "Number of decks must be between {MIN_DECKS} and {MAX_DECKS}, got {num_decks}"
            )));
        }

        self.num_decks = num_decks;
        self.discarded = 0;
        self.cards.clear();
        self.cards.reserve(num_decks as usize * CARDS_PER_DECK);
        for _ in 0..num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    self.cards.push(Card::new(rank, suit));
                }
            }
        }
        Ok(())
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.shuffles += 1;
    }

    /// Discards whatever is left and starts over with a fresh shuffled shoe.
    pub fn rebuild(&mut self) -> Result<()> {
        self.build(self.num_decks)?;
        self.shuffle();
        log::info!("Re-shuffled {} deck shoe", self.num_decks);
        Ok(())
    }

    pub fn draw(&mut self) -> Result<Card> {
        self.cards.pop().ok_or(Error::ExhaustedShoe)
    }

    /// Records cards that left play at the end of a round.
    pub fn discard(&mut self, count: usize) {
        self.discarded += count;
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.cards.len() < RESHUFFLE_THRESHOLD
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    pub fn total_cards(&self) -> usize {
        self.num_decks as usize * CARDS_PER_DECK
    }

    /// Number of shuffles performed over the shoe's lifetime.
    pub fn shuffles(&self) -> u32 {
        self.shuffles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sizes() {
        for decks in MIN_DECKS..=MAX_DECKS {
            let shoe = Shoe::new(decks).unwrap();
            assert_eq!(shoe.remaining(), 52 * decks as usize);
            assert_eq!(shoe.total_cards(), 52 * decks as usize);
        }
    }

    #[test]
    fn test_build_rejects_out_of_range() {
        assert!(matches!(Shoe::new(0), Err(Error::Configuration(_))));
        assert!(matches!(Shoe::new(9), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_build_canonical_order() {
        let mut shoe = Shoe::stacked(1, &[]).unwrap();
        // Last card built is the Ace of Spades, first is the Two of Hearts.
        assert_eq!(shoe.draw().unwrap(), Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(shoe.cards[0], Card::new(Rank::Two, Suit::Hearts));
    }

    #[test]
    fn test_each_card_appears_once_per_deck() {
        let shoe = Shoe::new(3).unwrap();
        for index in 0..52 {
            let card = Card::from_index(index).unwrap();
            let copies = shoe.cards.iter().filter(|c| c.same_face(&card)).count();
            assert_eq!(copies, 3);
        }
    }

    #[test]
    fn test_draw_removes_card() {
        let mut shoe = Shoe::new(1).unwrap();
        shoe.draw().unwrap();
        assert_eq!(shoe.remaining(), 51);
    }

    #[test]
    fn test_draw_exhausted() {
        let mut shoe = Shoe::new(1).unwrap();
        for _ in 0..52 {
            shoe.draw().unwrap();
        }
        assert_eq!(shoe.draw(), Err(Error::ExhaustedShoe));
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = Shoe::with_seed(2, 42).unwrap();
        let mut b = Shoe::with_seed(2, 42).unwrap();
        for _ in 0..104 {
            assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        }
    }

    #[test]
    fn test_shuffle_changes_order() {
        let a = Shoe::with_seed(1, 1).unwrap();
        let b = Shoe::stacked(1, &[]).unwrap();
        assert_ne!(a.cards, b.cards);
    }

    #[test]
    fn test_stacked_draw_order_and_size() {
        let top = [
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Ace, Suit::Hearts),
        ];
        let mut shoe = Shoe::stacked(2, &top).unwrap();
        assert_eq!(shoe.remaining(), 104);
        for expected in top {
            assert_eq!(shoe.draw().unwrap(), expected);
        }
    }

    #[test]
    fn test_stacked_rejects_missing_copies() {
        let ace = Card::new(Rank::Ace, Suit::Hearts);
        assert!(matches!(
            Shoe::stacked(1, &[ace, ace]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_needs_reshuffle_and_rebuild() {
        let mut shoe = Shoe::with_seed(1, 7).unwrap();
        assert!(!shoe.needs_reshuffle());
        shoe.draw().unwrap();
        shoe.discard(1);
        assert!(shoe.needs_reshuffle());

        shoe.rebuild().unwrap();
        assert_eq!(shoe.remaining(), 52);
        assert_eq!(shoe.discarded(), 0);
        assert_eq!(shoe.shuffles(), 2);
    }
}

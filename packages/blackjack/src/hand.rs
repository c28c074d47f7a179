use std::collections::BTreeSet;

use crate::rules::BLACKJACK;
use crate::{Card, Money};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Loss,
    Push,
    Blackjack,
}

/// All distinct totals of a hand that do not exceed 21, ascending.
///
/// Every Ace forks each running total into `x + 1` and `x + 11`. Face-down
/// cards are skipped unless `include_hidden` is set. When every combination
/// busts, the result is the single smallest raw total.
pub fn hand_values(cards: &[Card], include_hidden: bool) -> Vec<u8> {
    let mut totals: BTreeSet<u16> = BTreeSet::from([0]);

    for card in cards {
        if card.hidden && !include_hidden {
            continue;
        }

        let v = u16::from(card.value());
        totals = if card.is_ace() {
            totals.iter().flat_map(|&x| [x + 1, x + 11]).collect()
        } else {
            totals.iter().map(|&x| x + v).collect()
        };
    }

    let valid: Vec<u8> = totals
        .iter()
        .filter(|&&x| x <= u16::from(BLACKJACK))
        .map(|&x| x as u8)
        .collect();

    if valid.is_empty() {
        let smallest = totals.first().copied().unwrap_or(0);
        vec![u8::try_from(smallest).unwrap_or(u8::MAX)]
    } else {
        valid
    }
}

/// Check if a hand is soft (its best total counts an Ace as 11)
pub fn is_soft_hand(cards: &[Card]) -> bool {
    hand_values(cards, true).len() > 1
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Card]) -> bool {
    hand_values(cards, true)
        .iter()
        .all(|&v| v > BLACKJACK)
}

/// Check if two cards can be split (same rank)
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1.rank == card2.rank
}

/// One bettor's (or the dealer's) cards for a single round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub wager: Money,
    pub blackjack: bool,
    pub busted: bool,
    pub win: bool,
    pub push: bool,
    pub doubled: bool,
    pub insurance: bool,
    pub final_value: Option<u8>,
    pub first_action: bool,
}

impl Hand {
    pub fn new() -> Self {
        Self::with_wager(Money::ZERO)
    }

    pub fn with_wager(wager: Money) -> Self {
        Self {
            cards: Vec::new(),
            wager,
            blackjack: false,
            busted: false,
            win: false,
            push: false,
            doubled: false,
            insurance: false,
            final_value: None,
            first_action: true,
        }
    }

    pub fn deal(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Side-effect free valuation, see [`hand_values`].
    pub fn values(&self, include_hidden: bool) -> Vec<u8> {
        hand_values(&self.cards, include_hidden)
    }

    /// Values the hand and, while it is still on its first action, flags a
    /// reachable 21 as blackjack.
    pub fn evaluate(&mut self, include_hidden: bool) -> Vec<u8> {
        let values = self.values(include_hidden);
        if self.first_action && values.contains(&BLACKJACK) {
            self.blackjack = true;
            self.final_value = Some(BLACKJACK);
        }
        values
    }

    pub fn check_busted(&mut self) -> bool {
        let values = self.evaluate(true);
        if values.iter().all(|&v| v > BLACKJACK) {
            self.busted = true;
            self.final_value = values.last().copied();
        }
        self.busted
    }

    /// Highest valid total, or the bust value.
    pub fn best_value(&self) -> u8 {
        self.values(true).last().copied().unwrap_or(0)
    }

    /// Resolves the hand at its best total.
    pub fn stay(&mut self) {
        self.final_value = Some(self.best_value());
    }

    pub fn is_soft(&self) -> bool {
        is_soft_hand(&self.cards)
    }

    pub fn is_resolved(&self) -> bool {
        self.final_value.is_some()
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }

    pub fn has_hidden(&self) -> bool {
        self.cards.iter().any(|c| c.hidden)
    }

    /// Turns every card face up.
    pub fn reveal(&mut self) {
        for card in &mut self.cards {
            card.hidden = false;
        }
    }

    /// Outcome from the flags set when the round was adjudicated.
    /// A blackjack that was also marked as a push tied a dealer blackjack.
    pub fn outcome(&self) -> HandOutcome {
        if self.push {
            HandOutcome::Push
        } else if self.blackjack {
            HandOutcome::Blackjack
        } else if self.win {
            HandOutcome::Win
        } else {
            HandOutcome::Loss
        }
    }

    /// `"18"` once resolved, otherwise every candidate total, e.g. `"7 or 17"`.
    pub fn display_value(&self, include_hidden: bool) -> String {
        if let Some(value) = self.final_value {
            return value.to_string();
        }
        self.values(include_hidden)
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    }

    pub fn annotation(&self) -> Option<&'static str> {
        if self.busted {
            Some("Busted")
        } else if self.blackjack {
            Some("Blackjack!")
        } else {
            None
        }
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

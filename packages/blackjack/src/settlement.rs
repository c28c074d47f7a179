use serde::{Deserialize, Serialize};

use crate::rules::PayoutRatio;
use crate::{Hand, HandOutcome, Money};

/// Money owed on one adjudicated hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSettlement {
    pub outcome: HandOutcome,
    /// Insurance component alone (zero when no insurance was taken).
    pub insurance: Money,
    /// Insurance plus outcome component.
    pub delta: Money,
}

/// Translates a hand's outcome flags into a balance delta.
///
/// Insurance is settled first (half the wager either way), then exactly one
/// of blackjack (3:2), push (0), win (1:1) or loss (-wager).
pub fn settle_hand(hand: &Hand, dealer_blackjack: bool) -> HandSettlement {
    let insurance = if hand.insurance {
        let stake = PayoutRatio::INSURANCE.calculate_payout(hand.wager);
        if dealer_blackjack {
            stake
        } else {
            -stake
        }
    } else {
        Money::ZERO
    };

    let outcome = hand.outcome();
    let result = match outcome {
        HandOutcome::Blackjack => PayoutRatio::THREE_TO_TWO.calculate_payout(hand.wager),
        HandOutcome::Push => Money::ZERO,
        HandOutcome::Win => PayoutRatio::EVEN_MONEY.calculate_payout(hand.wager),
        HandOutcome::Loss => -hand.wager,
    };

    HandSettlement {
        outcome,
        insurance,
        delta: insurance + result,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub seat: usize,
    pub name: String,
    pub hand_index: usize,
    /// Number of hands the bettor played this round.
    pub hand_count: usize,
    pub outcome: HandOutcome,
    pub wager: Money,
    pub insurance: Money,
    pub delta: Money,
    /// Bettor's balance after this entry was applied.
    pub balance: Money,
}

/// Ledger of balance deltas produced at the end of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub dealer_blackjack: bool,
    pub entries: Vec<SettlementEntry>,
}

impl Settlement {
    pub fn net_for(&self, seat: usize) -> Money {
        self.entries
            .iter()
            .filter(|e| e.seat == seat)
            .map(|e| e.delta)
            .sum()
    }

    pub fn total(&self) -> Money {
        self.entries.iter().map(|e| e.delta).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(wager: i64) -> Hand {
        Hand::with_wager(Money::from_dollars(wager))
    }

    // Replays a bettor's running balance through a sequence of outcomes.
    #[test]
    fn test_settle_sequence_matches_ledger() {
        let mut balance = Money::from_dollars(500);
        let mut h = hand(100);

        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_dollars(400));

        h.win = true;
        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_dollars(500));

        h.win = false;
        h.push = true;
        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_dollars(500));

        h.insurance = true;
        balance += settle_hand(&h, true).delta;
        assert_eq!(balance, Money::from_dollars(550));

        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_dollars(500));

        h.insurance = false;
        h.push = false;
        h.blackjack = true;
        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_dollars(650));

        h.wager = Money::from_dollars(5);
        balance += settle_hand(&h, false).delta;
        assert_eq!(balance, Money::from_cents(65750));
        assert_eq!(balance.to_string(), "657.50");

        h.blackjack = false;
        balance += settle_hand(&h, true).delta;
        assert_eq!(balance, Money::from_cents(65250));
    }

    #[test]
    fn test_blackjack_pays_three_to_two() {
        let mut h = hand(5);
        h.blackjack = true;
        let s = settle_hand(&h, false);
        assert_eq!(s.outcome, HandOutcome::Blackjack);
        assert_eq!(s.delta, Money::from_cents(750));
    }

    #[test]
    fn test_blackjack_against_dealer_blackjack_is_push() {
        let mut h = hand(20);
        h.blackjack = true;
        h.push = true;
        let s = settle_hand(&h, true);
        assert_eq!(s.outcome, HandOutcome::Push);
        assert_eq!(s.delta, Money::ZERO);
    }

    #[test]
    fn test_insurance_component_reported_separately() {
        let mut h = hand(30);
        h.insurance = true;
        let s = settle_hand(&h, true);
        assert_eq!(s.insurance, Money::from_dollars(15));
        assert_eq!(s.delta, Money::from_dollars(-15));
    }

    #[test]
    fn test_net_for_seat() {
        let entry = |seat, delta| SettlementEntry {
            seat,
            name: format!("P{seat}"),
            hand_index: 0,
            hand_count: 1,
            outcome: HandOutcome::Win,
            wager: Money::from_dollars(10),
            insurance: Money::ZERO,
            delta: Money::from_dollars(delta),
            balance: Money::ZERO,
        };
        let ledger = Settlement {
            dealer_blackjack: false,
            entries: vec![entry(0, 10), entry(0, -20), entry(1, 5)],
        };
        assert_eq!(ledger.net_for(0), Money::from_dollars(-10));
        assert_eq!(ledger.net_for(1), Money::from_dollars(5));
        assert_eq!(ledger.total(), Money::from_dollars(-5));
    }

    #[test]
    fn test_ledger_json_shape() {
        let ledger = Settlement {
            dealer_blackjack: true,
            entries: vec![SettlementEntry {
                seat: 2,
                name: "Kyle".to_string(),
                hand_index: 1,
                hand_count: 2,
                outcome: HandOutcome::Push,
                wager: Money::from_dollars(25),
                insurance: Money::from_cents(1250),
                delta: Money::from_cents(1250),
                balance: Money::from_dollars(100),
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["dealer_blackjack"], true);
        assert_eq!(json["entries"][0]["outcome"], "Push");
        assert_eq!(json["entries"][0]["delta"], 1250);
        assert_eq!(json["entries"][0]["name"], "Kyle");
    }
}

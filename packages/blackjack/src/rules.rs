use serde::{Deserialize, Serialize};

use crate::Money;

pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 5;

pub const MIN_DECKS: u8 = 1;
pub const MAX_DECKS: u8 = 8;

pub const MIN_BUY_IN: i64 = 1;
pub const MAX_BUY_IN: i64 = 500;

pub const MIN_WAGER: i64 = 1;

/// A new round is never dealt from a shoe holding fewer cards than this.
pub const RESHUFFLE_THRESHOLD: usize = 52;

/// One original hand plus up to three splits.
pub const MAX_HANDS_PER_BETTOR: usize = 4;

pub const BLACKJACK: u8 = 21;

/// Dealer stands on this total or more, except on a soft 17.
pub const DEALER_STAND_TOTAL: u8 = 17;

/// Payout multiplier applied to a wager, as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    /// Natural blackjack.
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    /// Ordinary win.
    pub const EVEN_MONEY: Self = Self {
        numerator: 1,
        denominator: 1,
    };
    /// Insurance side bet, won or lost as half the hand's wager.
    pub const INSURANCE: Self = Self {
        numerator: 1,
        denominator: 2,
    };

    /// Scales `bet` by the ratio, rounding half-cents away from zero.
    pub fn calculate_payout(&self, bet: Money) -> Money {
        let scaled = bet.cents() * i64::from(self.numerator);
        let den = i64::from(self.denominator);
        let rounded = if scaled >= 0 {
            (scaled + den / 2) / den
        } else {
            (scaled - den / 2) / den
        };
        Money::from_cents(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_ratio_three_to_two() {
        let ratio = PayoutRatio::THREE_TO_TWO;
        assert_eq!(ratio.calculate_payout(Money::from_dollars(100)), Money::from_dollars(150));
        assert_eq!(ratio.calculate_payout(Money::from_dollars(10)), Money::from_dollars(15));
        assert_eq!(ratio.calculate_payout(Money::from_dollars(5)), Money::from_cents(750));
    }

    #[test]
    fn test_payout_ratio_even_money() {
        let ratio = PayoutRatio::EVEN_MONEY;
        assert_eq!(ratio.calculate_payout(Money::from_dollars(100)), Money::from_dollars(100));
        assert_eq!(ratio.calculate_payout(Money::from_dollars(25)), Money::from_dollars(25));
    }

    #[test]
    fn test_payout_ratio_insurance() {
        let ratio = PayoutRatio::INSURANCE;
        assert_eq!(ratio.calculate_payout(Money::from_dollars(100)), Money::from_dollars(50));
        assert_eq!(ratio.calculate_payout(Money::from_dollars(25)), Money::from_cents(1250));
    }

    #[test]
    fn test_payout_rounds_to_cent() {
        let ratio = PayoutRatio::INSURANCE;
        assert_eq!(ratio.calculate_payout(Money::from_cents(1)), Money::from_cents(1));
        assert_eq!(ratio.calculate_payout(Money::from_cents(-1)), Money::from_cents(-1));
    }
}

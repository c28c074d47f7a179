use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Signed monetary amount held as whole cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole dollars available, rounding fractional balances down.
    pub fn whole_dollars(&self) -> i64 {
        self.0.div_euclid(100)
    }

    pub fn is_whole(&self) -> bool {
        self.0 % 100 == 0
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    /// `550`, `657.50`, `-7.50`: whole amounts drop the fractional part.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if abs % 100 == 0 {
            write!(f, "{sign}{}", abs / 100)
        } else {
            write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
        }
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Money;
    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_and_fractional() {
        assert_eq!(Money::from_dollars(550).to_string(), "550");
        assert_eq!(Money::from_cents(65750).to_string(), "657.50");
        assert_eq!(Money::from_cents(750).to_string(), "7.50");
        assert_eq!(Money::from_cents(-750).to_string(), "-7.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0");
    }

    #[test]
    fn test_whole_dollars_rounds_down() {
        assert_eq!(Money::from_cents(65750).whole_dollars(), 657);
        assert_eq!(Money::from_dollars(3).whole_dollars(), 3);
    }

    #[test]
    fn test_arithmetic() {
        let mut balance = Money::from_dollars(500);
        balance -= Money::from_dollars(100);
        balance += Money::from_cents(750);
        assert_eq!(balance, Money::from_cents(40750));
        assert_eq!(Money::from_dollars(25) * 2, Money::from_dollars(50));
        assert_eq!(-Money::from_dollars(5), Money::from_dollars(-5));

        let total: Money = [Money::from_dollars(1), Money::from_cents(50)].iter().sum();
        assert_eq!(total, Money::from_cents(150));
    }
}

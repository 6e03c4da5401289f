//! Integer-cents money type with a dollars-denominated wire format.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An amount of money, stored internally as integer cents to avoid floating
/// point drift in totals, but serialized on the wire as a dollar amount
/// (`f64`) to match the event and HTTP payloads in spec.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money { cents: 0 };

    /// Builds a `Money` value from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Builds a `Money` value from a dollar amount, rounding to the nearest
    /// cent.
    pub fn from_dollars(dollars: f64) -> Self {
        Self {
            cents: (dollars * 100.0).round() as i64,
        }
    }

    /// Returns the amount as whole cents.
    pub fn as_cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a dollar-denominated float, for wire payloads.
    pub fn as_dollars(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Multiplies the amount by a non-negative integer quantity.
    pub fn checked_mul_quantity(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(quantity as i64)
            .map(Money::from_cents)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.as_dollars())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_cents(self.cents + rhs.cents)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.cents += rhs.cents;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::from_cents(self.cents - rhs.cents)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.cents -= rhs.cents;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;
        Ok(Money::from_dollars(dollars))
    }
}

//! Chilean peso amounts.
//!
//! CLP has no minor unit, so amounts are whole pesos stored in an `i64`.
//! Percentages (IVA) go through `rust_decimal` so rounding is exact.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of Chilean pesos.
///
/// Displays with a `$` prefix and `.` as the thousands separator, the way
/// prices are printed on Chilean receipts.
///
/// ```
/// use huerto_hogar_core::Clp;
///
/// assert_eq!(Clp::new(1_234_567).to_string(), "$1.234.567");
/// assert_eq!(Clp::new(990).to_string(), "$990");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Clp(i64);

impl Clp {
    /// Zero pesos.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole pesos.
    #[must_use]
    pub const fn new(pesos: i64) -> Self {
        Self(pesos)
    }

    /// Whole pesos.
    #[must_use]
    pub const fn pesos(self) -> i64 {
        self.0
    }

    /// `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Apply a percentage rate and round to whole pesos, half away from zero.
    ///
    /// `rate` is a fraction, e.g. `Decimal::new(19, 2)` for 19%.
    #[must_use]
    pub fn percent(self, rate: Decimal) -> Self {
        let exact = Decimal::from(self.0) * rate;
        let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(rounded.to_i64().unwrap_or(0))
    }
}

impl fmt::Display for Clp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            write!(f, "-${grouped}")
        } else {
            write!(f, "${grouped}")
        }
    }
}

impl Add for Clp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Clp {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Clp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Clp {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * i64::from(quantity))
    }
}

impl Sum for Clp {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Clp {
    fn from(pesos: i64) -> Self {
        Self(pesos)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A whole-Rupiah amount. The currency has no sub-unit in circulation, so the
/// smallest representable value is one Rupiah.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupiah(i64);

impl Rupiah {
    pub fn from_units(units: i64) -> Self {
        Rupiah(units)
    }

    pub fn units(self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Rupiah(0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl From<u64> for Rupiah {
    fn from(units: u64) -> Self {
        Rupiah(i64::try_from(units).unwrap_or(i64::MAX))
    }
}

/// Indonesian grouping: `Rp 1.250.000`.
impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-Rp {grouped}")
        } else {
            write!(f, "Rp {grouped}")
        }
    }
}

impl Add for Rupiah {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Rupiah(self.0 + rhs.0)
    }
}

impl Sub for Rupiah {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Rupiah(self.0 - rhs.0)
    }
}

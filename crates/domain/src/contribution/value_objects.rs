//! Value objects for the contribution domain.

/// Money amount in currency minor units (cents) to avoid floating point
/// issues. One KES = 100 cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    /// Amount in cents (e.g., 50_000 = KES 500.00)
    cents: i64,
}

impl Amount {
    /// Creates a new amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new amount from whole shillings.
    pub fn from_kes(kes: i64) -> Self {
        Self { cents: kes * 100 }
    }

    /// Creates an amount from a fractional shilling value, rounding to
    /// the nearest cent. Provider metadata occasionally carries amounts
    /// as JSON floats.
    pub fn from_kes_f64(kes: f64) -> Self {
        Self {
            cents: (kes * 100.0).round() as i64,
        }
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-shilling portion.
    pub fn kes(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole shillings).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a fractional shilling value, for API payloads.
    pub fn as_kes_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-KES {}.{:02}", self.kes().abs(), self.cents_part())
        } else {
            write!(f, "KES {}.{:02}", self.kes(), self.cents_part())
        }
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

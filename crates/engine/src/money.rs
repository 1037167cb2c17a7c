use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (incomes,
/// allocations, balances, goal amounts) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Addition clamped to the `i64` range.
    #[must_use]
    pub const fn saturating_add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_add(rhs.0))
    }

    /// Ratio `self / whole` as a percentage, `0.0` when `whole` is not
    /// positive.
    #[must_use]
    pub fn percentage_of(self, whole: MoneyCents) -> f64 {
        if whole.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

/// Totals saturate instead of overflowing, so reports over many large
/// stored amounts stay well defined.
impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, MoneyCents::saturating_add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Projects `current + delta`, refusing results that would go negative.
///
/// This is the one formula used both to preview a balance change and to
/// commit it, so previews cannot drift from what the ledger accepts.
///
/// ```rust
/// use engine::{MoneyCents, project_balance};
///
/// let current = MoneyCents::new(500);
/// assert_eq!(project_balance(current, MoneyCents::new(-200)), Some(MoneyCents::new(300)));
/// assert_eq!(project_balance(current, MoneyCents::new(-600)), None);
/// ```
#[must_use]
pub fn project_balance(current: MoneyCents, delta: MoneyCents) -> Option<MoneyCents> {
    current
        .checked_add(delta)
        .filter(|projected| !projected.is_negative())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn sums_slices_and_iterators() {
        let amounts = [MoneyCents::new(100), MoneyCents::new(250)];
        assert_eq!(amounts.iter().sum::<MoneyCents>(), MoneyCents::new(350));
        assert_eq!(
            Vec::<MoneyCents>::new().into_iter().sum::<MoneyCents>(),
            MoneyCents::ZERO
        );
    }

    #[test]
    fn sums_clamp_instead_of_overflowing() {
        let huge = [MoneyCents::new(i64::MAX), MoneyCents::new(i64::MAX)];
        assert_eq!(huge.iter().sum::<MoneyCents>(), MoneyCents::new(i64::MAX));

        let debts = [MoneyCents::new(i64::MIN), MoneyCents::new(-1)];
        assert_eq!(debts.into_iter().sum::<MoneyCents>(), MoneyCents::new(i64::MIN));
    }

    #[test]
    fn percentage_of_handles_zero_whole() {
        assert_eq!(MoneyCents::new(50).percentage_of(MoneyCents::ZERO), 0.0);
        assert_eq!(MoneyCents::new(50).percentage_of(MoneyCents::new(200)), 25.0);
    }

    #[test]
    fn project_balance_rejects_negative_and_overflow() {
        assert_eq!(
            project_balance(MoneyCents::new(100), MoneyCents::new(-100)),
            Some(MoneyCents::ZERO)
        );
        assert_eq!(
            project_balance(MoneyCents::new(100), MoneyCents::new(-101)),
            None
        );
        assert_eq!(
            project_balance(MoneyCents::new(i64::MAX), MoneyCents::new(1)),
            None
        );
    }
}

//! # Circulation Policy
//!
//! Pure circulation rules: loan periods and overdue fee math.
//!
//! ## Where Policy Is Applied
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Overdue Fee Calculation                             │
//! │                                                                         │
//! │  checkout ──► due_date = transaction_date + loan_period (14d default)  │
//! │                                                                         │
//! │  return ──► returned.date() > due_date ?                               │
//! │                │                                                        │
//! │                ├── no  ──► no fee                                       │
//! │                │                                                        │
//! │                └── yes ──► overdue_days × daily_rate ($0.50/day)       │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                            Fee { kind: Overdue, amount, unpaid }        │
//! │                                                                         │
//! │  Fees are realized ONLY at return time. A transaction that stays open  │
//! │  past its due date accrues nothing until the book comes back.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use libris_core::policy::CirculationPolicy;
//!
//! let policy = CirculationPolicy::default();
//!
//! let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let returned = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
//!
//! assert_eq!(policy.overdue_days(due, returned), 10);
//! assert_eq!(policy.overdue_fee(due, returned).cents(), 500);
//! ```

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::money::Money;
use crate::{DEFAULT_LOAN_PERIOD_DAYS, DEFAULT_OVERDUE_RATE_CENTS};

// =============================================================================
// Circulation Policy
// =============================================================================

/// Tunable circulation rules.
///
/// Both knobs come from configuration; the defaults match the classic
/// 14-day loan with a $0.50/day late charge. The engine holds one policy
/// value and threads it through every checkout and return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirculationPolicy {
    /// How long a checkout runs before the book is due back.
    pub loan_period_days: i64,

    /// Charge per full day late.
    pub daily_overdue_rate: Money,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        CirculationPolicy {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            daily_overdue_rate: Money::from_cents(DEFAULT_OVERDUE_RATE_CENTS),
        }
    }
}

impl CirculationPolicy {
    /// Creates a policy with explicit knobs.
    pub const fn new(loan_period_days: i64, daily_overdue_rate: Money) -> Self {
        CirculationPolicy {
            loan_period_days,
            daily_overdue_rate,
        }
    }

    /// Computes the default due date for a checkout happening at `now`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use libris_core::policy::CirculationPolicy;
    ///
    /// let policy = CirculationPolicy::default();
    /// let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    ///
    /// assert_eq!(
    ///     policy.default_due_date(now),
    ///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    /// );
    /// ```
    pub fn default_due_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.date_naive() + Days::new(self.loan_period_days as u64)
    }

    /// Number of full calendar days a return is late.
    ///
    /// Compares the return timestamp's calendar date against the due date;
    /// a return at 23:59 on the due date is not late, a return at 00:01 the
    /// next day is late by one day. Never negative.
    pub fn overdue_days(&self, due_date: NaiveDate, returned: DateTime<Utc>) -> i64 {
        (returned.date_naive() - due_date).num_days().max(0)
    }

    /// Computes the overdue fee for a return.
    ///
    /// Returns zero when the book came back on or before the due date,
    /// otherwise `overdue_days × daily_overdue_rate`. Monotonically
    /// non-decreasing in how late the return is.
    pub fn overdue_fee(&self, due_date: NaiveDate, returned: DateTime<Utc>) -> Money {
        let days = self.overdue_days(due_date, returned);
        if days <= 0 {
            return Money::zero();
        }
        self.daily_overdue_rate.multiply_days(days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = CirculationPolicy::default();
        assert_eq!(policy.loan_period_days, 14);
        assert_eq!(policy.daily_overdue_rate.cents(), 50);
    }

    #[test]
    fn test_default_due_date_is_fourteen_days_out() {
        let policy = CirculationPolicy::default();
        assert_eq!(
            policy.default_due_date(at(2024, 1, 1, 8)),
            date(2024, 1, 15)
        );
        // Crosses a month boundary
        assert_eq!(
            policy.default_due_date(at(2024, 2, 20, 23)),
            date(2024, 3, 5)
        );
    }

    #[test]
    fn test_on_time_return_is_free() {
        let policy = CirculationPolicy::default();
        let due = date(2024, 1, 1);

        // Same calendar date, later in the day: not overdue
        assert_eq!(policy.overdue_fee(due, at(2024, 1, 1, 8)).cents(), 0);
        // Early return
        assert_eq!(policy.overdue_fee(due, at(2023, 12, 20, 12)).cents(), 0);
    }

    #[test]
    fn test_ten_days_late_costs_five_dollars() {
        let policy = CirculationPolicy::default();
        let due = date(2024, 1, 1);
        let returned = at(2024, 1, 11, 0);

        assert_eq!(policy.overdue_days(due, returned), 10);
        assert_eq!(policy.overdue_fee(due, returned).cents(), 500);
    }

    #[test]
    fn test_one_day_late() {
        let policy = CirculationPolicy::default();
        let due = date(2024, 1, 1);
        let returned = at(2024, 1, 2, 0);

        assert_eq!(policy.overdue_days(due, returned), 1);
        assert_eq!(policy.overdue_fee(due, returned).cents(), 50);
    }

    #[test]
    fn test_fee_is_monotone_in_lateness() {
        let policy = CirculationPolicy::default();
        let due = date(2024, 1, 1);

        let mut previous = Money::zero();
        for day in 0..60u32 {
            let returned = at(2024, 1, 1, 0) + chrono::Days::new(day as u64);
            let fee = policy.overdue_fee(due, returned);
            assert!(fee >= previous, "fee decreased at day {day}");
            previous = fee;
        }
    }

    #[test]
    fn test_custom_rate() {
        let policy = CirculationPolicy::new(7, Money::from_cents(25));
        let due = date(2024, 1, 1);

        assert_eq!(policy.default_due_date(at(2024, 1, 1, 0)), date(2024, 1, 8));
        assert_eq!(policy.overdue_fee(due, at(2024, 1, 5, 0)).cents(), 100);
    }
}

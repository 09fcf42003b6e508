//! Shared growth/forecast/diff contract for series and groups
//!
//! Both leaves and composites provide sums and growth; forecasts extrapolate the
//! still-running current period, and diffs compare a forecast against the
//! previous period's actual value.

use chrono::{Datelike, Local, NaiveDate};

/// Days used as the yearly denominator when extrapolating the current year
const DAYS_PER_YEAR: f64 = 365.0;

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        year.checked_add(1).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
    } else {
        month.checked_add(1).and_then(|m| NaiveDate::from_ymd_opt(year, m, 1))
    };
    match (NaiveDate::from_ymd_opt(year, month, 1), next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

/// Scale factor turning a partial-period value into a full-period estimate.
///
/// 1.0 for any period other than the one containing `today`.
pub fn forecast_rate(year: i32, month: Option<u32>, today: NaiveDate) -> f64 {
    if year != today.year() {
        return 1.0;
    }
    match month {
        None => DAYS_PER_YEAR / f64::from(today.ordinal()),
        Some(m) if m == today.month() => {
            f64::from(days_in_month(year, m)) / f64::from(today.day())
        }
        Some(_) => 1.0,
    }
}

/// Percentage change of `next` relative to `prev`; 0 when `prev` is 0
pub fn percentage_diff(prev: i64, next: i64) -> i64 {
    if prev == 0 {
        return 0;
    }
    (next as f64 / prev as f64 * 100.0).round() as i64 - 100
}

/// Difference in points between two percentage values; 0 when `prev` is 0
pub fn point_diff(prev: i64, next: i64) -> i64 {
    if prev == 0 {
        return 0;
    }
    next.saturating_sub(prev)
}

/// Aggregate queries answered by every node of a report tree
pub trait Aggregate {
    fn sum_by_year(&self, year: i32) -> i64;

    fn sum_by_year_and_month(&self, year: i32, month: u32) -> i64;

    fn growth_by_year(&self, year: i32) -> i64;

    fn growth_by_year_and_month(&self, year: i32, month: u32) -> i64;

    fn forecast_by_year_as_of(&self, year: i32, today: NaiveDate) -> i64;

    fn forecast_by_year_and_month_as_of(&self, year: i32, month: u32, today: NaiveDate) -> i64;

    /// Whether diffs are expressed in percentage points instead of percent
    fn diff_in_points(&self) -> bool {
        false
    }

    fn forecast_by_year(&self, year: i32) -> i64 {
        self.forecast_by_year_as_of(year, today())
    }

    fn forecast_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        self.forecast_by_year_and_month_as_of(year, month, today())
    }

    fn diff_of_year_as_of(&self, prev_year: i32, next_year: i32, today: NaiveDate) -> i64 {
        let prev = self.sum_by_year(prev_year);
        if prev == 0 {
            return 0;
        }
        let next = self.forecast_by_year_as_of(next_year, today);
        if self.diff_in_points() {
            point_diff(prev, next)
        } else {
            percentage_diff(prev, next)
        }
    }

    fn diff_of_year(&self, prev_year: i32, next_year: i32) -> i64 {
        self.diff_of_year_as_of(prev_year, next_year, today())
    }

    fn diff_of_month_as_of(
        &self,
        prev_year: i32,
        next_year: i32,
        month: u32,
        today: NaiveDate,
    ) -> i64 {
        let prev = self.sum_by_year_and_month(prev_year, month);
        if prev == 0 {
            return 0;
        }
        let next = self.forecast_by_year_and_month_as_of(next_year, month, today);
        if self.diff_in_points() {
            point_diff(prev, next)
        } else {
            percentage_diff(prev, next)
        }
    }

    fn diff_of_month(&self, prev_year: i32, next_year: i32, month: u32) -> i64 {
        self.diff_of_month_as_of(prev_year, next_year, month, today())
    }
}

//! Sample report with subscription, renewal and transaction data

use chrono::{Datelike, NaiveDate};

use super::report::Report;
use super::series::Series;
use crate::types::{Formatter, GroupOptions, Record, ReportOptions, SumType};

/// Years of history generated before the current year
const HISTORY_YEARS: i32 = 7;

/// Deterministic pseudo-random value in `0..max` for a (salt, year, month) point
fn sample_value(salt: u64, year: i32, month: u32, max: u64) -> i64 {
    let mut x = salt
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((year as u64) << 8)
        .wrapping_add(u64::from(month));
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    (x % max.max(1)) as i64
}

fn monthly_series(series: &mut Series, salt: u64, today: NaiveDate, max: u64) {
    for year in today.year() - HISTORY_YEARS..=today.year() {
        let last_month = if year == today.year() { today.month() } else { 12 };
        for month in 1..=last_month {
            let value = sample_value(salt, year, month, max);
            if let Ok(record) = Record::at(year, month, 1, 0, value) {
                series.add_record(record);
            }
        }
    }
}

/// Build the sample report as of `today`, comparing against the previous year
pub fn demo_report(today: NaiveDate, top_view: usize) -> Report {
    let mut report = Report::new(ReportOptions {
        diff_year: today.year() - 1,
        show_diff: true,
        ..ReportOptions::default()
    });
    let mut salt = 0u64;
    let mut next_salt = || {
        salt += 1;
        salt
    };

    let subscriptions = report.create_group("Subscriptions", "", GroupOptions::default());
    let paid = subscriptions.create_sub_group("New paid subscriptions", "This is a description");
    *paid.options_mut() = GroupOptions {
        sum: true,
        show_percentage_diff: true,
        sum_formatter: Some(Formatter::scalar()),
        ..GroupOptions::default()
    };
    for product in ["Starter", "Plus", "Premium"] {
        let series = paid.add_series(Series::new(product, "").with_formatter(Formatter::scalar()));
        monthly_series(series, next_salt(), today, 200);
    }

    let free = subscriptions.create_sub_group("New free subscriptions", "");
    free.options_mut().sum = true;
    for product in ["Free", "Trial"] {
        let series = free.add_series(Series::new(product, "").with_formatter(Formatter::scalar()));
        monthly_series(series, next_salt(), today, 200);
    }

    let conversion = subscriptions.add_series(
        Series::new("Conversion rate", "Paid share of new subscriptions")
            .with_sum_type(SumType::Avg)
            .with_formatter(Formatter::Percentage),
    );
    monthly_series(conversion, next_salt(), today, 30);

    let renewals = report.create_group("Renewals", "", GroupOptions::default());
    let paid_renewals = renewals.create_sub_group("Paid renewals", "");
    paid_renewals.options_mut().sum = true;
    for product in ["Starter", "Plus", "Premium"] {
        let series =
            paid_renewals.add_series(Series::new(product, "").with_formatter(Formatter::scalar()));
        monthly_series(series, next_salt(), today, 200);
    }
    let active = renewals.add_series(
        Series::new("Active subscriptions", "Snapshot at month end")
            .with_sum_type(SumType::Last)
            .with_formatter(Formatter::scalar()),
    );
    monthly_series(active, next_salt(), today, 5000);

    let transactions = report.create_group(
        "Transactions",
        "",
        GroupOptions {
            top_view,
            ..GroupOptions::default()
        },
    );
    for currency in ["CHF", "EUR", "USD", "PHP", "GBP"] {
        let series = transactions
            .add_series(Series::new(currency, "").with_formatter(Formatter::currency()));
        monthly_series(series, next_salt(), today, 100_000);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Aggregate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()
    }

    #[test]
    fn test_sample_value_is_deterministic_and_bounded() {
        assert_eq!(sample_value(3, 2020, 5, 200), sample_value(3, 2020, 5, 200));
        for month in 1..=12 {
            assert!((0..200).contains(&sample_value(1, 2020, month, 200)));
        }
        assert_eq!(sample_value(1, 2020, 1, 0), 0);
    }

    #[test]
    fn test_demo_report_shape() {
        let report = demo_report(today(), 3);
        let titles: Vec<&str> = report.groups().iter().map(|g| g.title()).collect();
        assert_eq!(titles, vec!["Subscriptions", "Renewals", "Transactions"]);
        assert_eq!(report.diff_year(), 2020);
        assert!(report.show_diff());
    }

    #[test]
    fn test_demo_records_stop_at_current_month() {
        let report = demo_report(today(), 3);
        let transactions = &report.groups()[2];
        let chf = transactions.children()[0].as_series().unwrap();
        // 7 full years plus January to March
        assert_eq!(chf.record_count(), 7 * 12 + 3);
        assert_eq!(chf.sum_by_year_and_month(2021, 4), 0);
    }

    #[test]
    fn test_demo_transactions_collapse() {
        let report = demo_report(today(), 3);
        let transactions = &report.groups()[2];
        let displayed = transactions.displayed_children(2021, &report.months_as_of(today()));
        assert_eq!(displayed.len(), 4);
        assert!(displayed[3].is_others());
    }
}

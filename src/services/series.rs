//! Leaf time series: bucketed records plus the sum/last/avg rules

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::{forecast_rate, Aggregate};
use crate::types::{Formatter, NodeId, Record, Result, SeriesOptions, SumType, TallyError};

type HourBuckets = BTreeMap<u32, Record>;
type DayBuckets = BTreeMap<u32, HourBuckets>;
type MonthBuckets = BTreeMap<u32, DayBuckets>;
type YearBuckets = BTreeMap<i32, MonthBuckets>;

/// Combine the values of one scope according to a sum type.
///
/// `records` must be chronological for `SumType::Last`.
fn accumulate<'a>(sum_type: SumType, records: impl Iterator<Item = &'a Record>) -> i64 {
    match sum_type {
        SumType::Sum => records.fold(0i64, |acc, r| acc.saturating_add(r.value())),
        SumType::Last => records.last().map_or(0, Record::value),
        SumType::Avg => {
            let (total, count) = records.fold((0i64, 0i64), |(total, count), r| {
                (total.saturating_add(r.value()), count + 1)
            });
            if count == 0 {
                0
            } else {
                total.div_euclid(count)
            }
        }
    }
}

fn day_bucket_records(month: &DayBuckets) -> impl Iterator<Item = &Record> {
    month.values().flat_map(|hours| hours.values())
}

/// A named metric holding at most one record per (year, month, day, hour)
#[derive(Debug, Serialize)]
pub struct Series {
    #[serde(skip)]
    id: NodeId,
    #[serde(skip)]
    parent: Option<NodeId>,
    title: String,
    description: String,
    #[serde(skip)]
    sum_type: SumType,
    #[serde(skip)]
    formatter: Formatter,
    #[serde(skip)]
    options: SeriesOptions,
    records: YearBuckets,
}

impl Series {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            title: title.into(),
            description: description.into(),
            sum_type: SumType::default(),
            formatter: Formatter::default(),
            options: SeriesOptions::default(),
            records: BTreeMap::new(),
        }
    }

    pub fn with_sum_type(mut self, sum_type: SumType) -> Self {
        self.sum_type = sum_type;
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_options(mut self, options: SeriesOptions) -> Self {
        self.options = options;
        self
    }

    /// Empty series sharing this one's sum type, formatter and options
    pub fn derive_empty(&self, title: impl Into<String>) -> Self {
        Self::new(title, "")
            .with_sum_type(self.sum_type)
            .with_formatter(self.formatter)
            .with_options(self.options.clone())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn sum_type(&self) -> SumType {
        self.sum_type
    }

    pub fn formatter(&self) -> Formatter {
        self.formatter
    }

    pub fn options(&self) -> &SeriesOptions {
        &self.options
    }

    /// Insert a record into its bucket.
    ///
    /// An occupied bucket keeps its record and the new one is dropped.
    /// Returns whether the record was inserted.
    pub fn add_record(&mut self, mut record: Record) -> bool {
        let (year, month, day, hour) = record.key();
        let hours = self
            .records
            .entry(year)
            .or_default()
            .entry(month)
            .or_default()
            .entry(day)
            .or_default();

        if hours.contains_key(&hour) {
            tracing::debug!(
                series = %self.title,
                year, month, day, hour,
                "bucket occupied, record skipped"
            );
            return false;
        }

        record.set_series(Some(self.id));
        hours.insert(hour, record);
        true
    }

    /// Remove a resident record and hand it back without an owner.
    ///
    /// Fails with `NotFound` unless the record's bucket holds an equal record.
    pub fn remove_record(&mut self, record: &Record) -> Result<Record> {
        let (year, month, day, hour) = record.key();
        let not_found = || {
            TallyError::NotFound(format!(
                "record {:04}-{:02}-{:02} {:02}h in series '{}'",
                year, month, day, hour, self.title
            ))
        };

        let resident = self
            .bucket(year, month, day, hour)
            .is_some_and(|stored| stored == record);
        if !resident {
            return Err(not_found());
        }

        let months = self.records.get_mut(&year).ok_or_else(not_found)?;
        let days = months.get_mut(&month).ok_or_else(not_found)?;
        let hours = days.get_mut(&day).ok_or_else(not_found)?;
        let mut removed = hours.remove(&hour).ok_or_else(not_found)?;

        // Prune emptied levels so aggregation never sees hollow buckets
        if hours.is_empty() {
            days.remove(&day);
        }
        if days.is_empty() {
            months.remove(&month);
        }
        if months.is_empty() {
            self.records.remove(&year);
        }

        removed.set_series(None);
        Ok(removed)
    }

    pub fn has_record(&self, record: &Record) -> bool {
        let (year, month, day, hour) = record.key();
        self.bucket(year, month, day, hour).is_some()
    }

    fn bucket(&self, year: i32, month: u32, day: u32, hour: u32) -> Option<&Record> {
        self.records
            .get(&year)?
            .get(&month)?
            .get(&day)?
            .get(&hour)
    }

    /// All records in chronological order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records
            .values()
            .flat_map(|months| months.values())
            .flat_map(day_bucket_records)
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    /// Whether any record falls into the given month
    pub fn has_month(&self, year: i32, month: u32) -> bool {
        self.records
            .get(&year)
            .is_some_and(|months| months.contains_key(&month))
    }

    fn year_records(&self, year: i32) -> impl Iterator<Item = &Record> {
        self.records
            .get(&year)
            .into_iter()
            .flat_map(|months| months.values())
            .flat_map(day_bucket_records)
    }

    fn month_records(&self, year: i32, month: u32) -> impl Iterator<Item = &Record> {
        self.records
            .get(&year)
            .and_then(|months| months.get(&month))
            .into_iter()
            .flat_map(day_bucket_records)
    }

    pub fn format(&self, value: i64) -> String {
        self.formatter.format(value)
    }

    /// Value of the year before `year`; a year before `i32::MIN` is empty
    fn prior_year_sum(&self, year: i32) -> i64 {
        year.checked_sub(1).map_or(0, |prev| self.sum_by_year(prev))
    }

    fn prior_year_month_sum(&self, year: i32, month: u32) -> i64 {
        year.checked_sub(1).map_or(0, |prev| self.sum_by_year_and_month(prev, month))
    }

    fn extrapolate(&self, growth: i64, baseline: i64, rate: f64) -> i64 {
        let scaled = growth as f64 * rate;
        match self.sum_type {
            SumType::Sum | SumType::Avg => scaled.round() as i64,
            SumType::Last => (scaled + baseline as f64).round() as i64,
        }
    }
}

impl Aggregate for Series {
    fn sum_by_year(&self, year: i32) -> i64 {
        accumulate(self.sum_type, self.year_records(year))
    }

    fn sum_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        accumulate(self.sum_type, self.month_records(year, month))
    }

    fn growth_by_year(&self, year: i32) -> i64 {
        let current = self.sum_by_year(year);
        match self.sum_type {
            SumType::Sum | SumType::Avg => current,
            SumType::Last => current.saturating_sub(self.prior_year_sum(year)),
        }
    }

    fn growth_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        let current = self.sum_by_year_and_month(year, month);
        match self.sum_type {
            SumType::Sum | SumType::Avg => current,
            SumType::Last => current.saturating_sub(self.prior_year_month_sum(year, month)),
        }
    }

    fn forecast_by_year_as_of(&self, year: i32, today: NaiveDate) -> i64 {
        let baseline = match self.sum_type {
            SumType::Last => self.prior_year_sum(year),
            SumType::Sum | SumType::Avg => 0,
        };
        self.extrapolate(
            self.growth_by_year(year),
            baseline,
            forecast_rate(year, None, today),
        )
    }

    fn forecast_by_year_and_month_as_of(&self, year: i32, month: u32, today: NaiveDate) -> i64 {
        let baseline = match self.sum_type {
            SumType::Last => self.prior_year_month_sum(year, month),
            SumType::Sum | SumType::Avg => 0,
        };
        self.extrapolate(
            self.growth_by_year_and_month(year, month),
            baseline,
            forecast_rate(year, Some(month), today),
        )
    }

    fn diff_in_points(&self) -> bool {
        self.formatter.is_percentage()
    }
}

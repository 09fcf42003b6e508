//! Record and sum type definitions

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{NodeId, Result, TallyError};

/// Bucket key of a record inside its series: (year, month, day, hour)
pub type BucketKey = (i32, u32, u32, u32);

/// One integer measurement at a specific year/month/day/hour.
///
/// Equality compares the bucket key and value, not the owning series.
#[derive(Debug, Clone)]
pub struct Record {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    value: i64,
    series: Option<NodeId>,
}

impl Record {
    pub fn new(date: NaiveDateTime, value: i64) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            hour: date.hour(),
            value,
            series: None,
        }
    }

    /// Build a record from calendar parts, rejecting impossible dates
    pub fn at(year: i32, month: u32, day: u32, hour: u32, value: i64) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .ok_or_else(|| {
                TallyError::Config(format!(
                    "invalid record date {:04}-{:02}-{:02} {:02}h",
                    year, month, day, hour
                ))
            })?;
        Ok(Self::new(date, value))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn key(&self) -> BucketKey {
        (self.year, self.month, self.day, self.hour)
    }

    /// Owning series, if the record is resident in one
    pub fn series(&self) -> Option<NodeId> {
        self.series
    }

    pub(crate) fn set_series(&mut self, series: Option<NodeId>) {
        self.series = series;
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.value == other.value
    }
}

impl Eq for Record {}

/// Records serialize as their bare value; the date is implied by the bucket path.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

/// Aggregation rule of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SumType {
    /// Total of all values
    #[default]
    Sum,
    /// Chronologically last value (snapshot metrics)
    Last,
    /// Integer-truncated mean
    Avg,
}

impl SumType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SumType::Sum => "sum",
            SumType::Last => "last",
            SumType::Avg => "avg",
        }
    }
}

impl fmt::Display for SumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SumType {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(SumType::Sum),
            "last" => Ok(SumType::Last),
            "avg" | "average" => Ok(SumType::Avg),
            _ => Err(TallyError::UnsupportedSumType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_at_valid() {
        let r = Record::at(2020, 2, 29, 23, 7).unwrap();
        assert_eq!(r.key(), (2020, 2, 29, 23));
        assert_eq!(r.value(), 7);
        assert!(r.series().is_none());
    }

    #[test]
    fn test_record_at_invalid_date() {
        assert!(matches!(
            Record::at(2019, 2, 29, 0, 1),
            Err(TallyError::Config(_))
        ));
        assert!(Record::at(2020, 13, 1, 0, 1).is_err());
        assert!(Record::at(2020, 1, 1, 24, 1).is_err());
    }

    #[test]
    fn test_record_from_datetime_truncates_to_hour() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15)
            .unwrap()
            .and_hms_opt(14, 35, 10)
            .unwrap();
        let r = Record::new(date, 3);
        assert_eq!(r.key(), (2021, 6, 15, 14));
    }

    #[test]
    fn test_record_equality_ignores_owner() {
        let mut a = Record::at(2020, 1, 1, 0, 10).unwrap();
        let b = Record::at(2020, 1, 1, 0, 10).unwrap();
        a.set_series(Some(NodeId::next()));
        assert_eq!(a, b);
        assert_ne!(a, Record::at(2020, 1, 1, 0, 11).unwrap());
    }

    #[test]
    fn test_record_serializes_as_value() {
        let r = Record::at(2020, 1, 1, 0, 42).unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "42");
    }

    // ========== SumType ==========

    #[test]
    fn test_sum_type_parse() {
        assert_eq!("sum".parse::<SumType>().unwrap(), SumType::Sum);
        assert_eq!("LAST".parse::<SumType>().unwrap(), SumType::Last);
        assert_eq!(" avg ".parse::<SumType>().unwrap(), SumType::Avg);
    }

    #[test]
    fn test_sum_type_parse_unsupported() {
        let err = "median".parse::<SumType>().unwrap_err();
        assert!(matches!(err, TallyError::UnsupportedSumType(ref s) if s == "median"));
    }

    #[test]
    fn test_sum_type_default_is_sum() {
        assert_eq!(SumType::default(), SumType::Sum);
        assert_eq!(SumType::Last.to_string(), "last");
    }
}

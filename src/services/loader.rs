//! JSON report definitions
//!
//! A definition file describes the whole tree:
//!
//! ```json
//! {
//!   "options": { "diffYear": 2019, "showDiff": true },
//!   "groups": [{
//!     "title": "Transactions",
//!     "options": { "topView": 3 },
//!     "children": [
//!       { "type": "series", "title": "CHF", "formatter": "currency",
//!         "records": [{ "date": "2020-01-01", "value": 120 }] }
//!     ]
//!   }]
//! }
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Instant;

use super::group::Group;
use super::report::Report;
use super::series::Series;
use crate::types::{
    Formatter, GroupOptions, Record, ReportOptions, Result, SeriesOptions, SumType, TallyError,
};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Deserialize)]
pub struct ReportDefinition {
    #[serde(default)]
    pub options: ReportOptions,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct GroupDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: GroupOptions,
    #[serde(default)]
    pub children: Vec<ChildDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildDefinition {
    Group(GroupDefinition),
    Series(SeriesDefinition),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// "sum", "last" or "avg"; defaults to sum
    #[serde(default)]
    pub sum_type: Option<String>,
    #[serde(default)]
    pub formatter: Formatter,
    #[serde(default)]
    pub options: SeriesOptions,
    #[serde(default)]
    pub records: Vec<RecordDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct RecordDefinition {
    /// "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM:SS"
    pub date: String,
    pub value: i64,
}

impl RecordDefinition {
    fn build(&self) -> Result<Record> {
        Ok(Record::new(parse_datetime(&self.date)?, self.value))
    }
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TallyError::Parse(format!("invalid record date: {}", s)))
}

impl SeriesDefinition {
    fn build(self) -> Result<Series> {
        let sum_type = match self.sum_type.as_deref() {
            Some(s) => s.parse()?,
            None => SumType::default(),
        };
        self.options.log_ignored(&self.title);
        let mut series = Series::new(self.title, self.description)
            .with_sum_type(sum_type)
            .with_formatter(self.formatter)
            .with_options(self.options);

        let mut skipped = 0usize;
        for record in &self.records {
            if !series.add_record(record.build()?) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::warn!(
                series = %series.title(),
                skipped,
                "duplicate record dates ignored"
            );
        }
        Ok(series)
    }
}

impl GroupDefinition {
    fn build(self) -> Result<Group> {
        self.options.log_ignored(&self.title);
        let mut group = Group::new(self.title, self.description).with_options(self.options);
        for child in self.children {
            match child {
                ChildDefinition::Group(def) => {
                    group.add_child(def.build()?);
                }
                ChildDefinition::Series(def) => {
                    group.add_series(def.build()?);
                }
            }
        }
        Ok(group)
    }
}

impl ReportDefinition {
    pub fn build(self) -> Result<Report> {
        self.options.log_ignored();
        let mut report = Report::new(self.options);
        for group in self.groups {
            report.add_group(group.build()?);
        }
        Ok(report)
    }
}

/// Parse a JSON report definition into a report tree
pub fn parse_report(json: &str) -> Result<Report> {
    let definition: ReportDefinition =
        serde_json::from_str(json).map_err(|e| TallyError::Parse(e.to_string()))?;
    definition.build()
}

/// Load a JSON report definition from disk
pub fn load_report(path: &Path) -> Result<Report> {
    let started = Instant::now();
    let content = fs::read_to_string(path)?;
    let report = parse_report(&content)?;
    tracing::info!(
        path = %path.display(),
        groups = report.groups().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report definition loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Aggregate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "options": { "targetYear": 2020, "diffYear": 2019, "showDiff": true, "unknown": 1 },
        "groups": [{
            "title": "Subscriptions",
            "description": "All plans",
            "options": { "sum": true },
            "children": [
                { "type": "group", "title": "Paid", "children": [
                    { "type": "series", "title": "Plus", "formatter": "scalar",
                      "records": [
                        { "date": "2020-01-01", "value": 10 },
                        { "date": "2020-02-01T00:00:00", "value": 20 },
                        { "date": "2020-02-01", "value": 99 }
                      ] }
                ] },
                { "type": "series", "title": "Conversion", "sumType": "avg",
                  "formatter": "percentage", "options": { "invertColor": true },
                  "records": [
                    { "date": "2020-01-01 08:00:00", "value": 4 },
                    { "date": "2020-02-01", "value": 10 }
                  ] }
            ]
        }]
    }"#;

    #[test]
    fn test_parse_report_builds_tree() {
        let report = parse_report(SAMPLE).unwrap();
        assert_eq!(report.options().diff_year, 2019);
        assert!(report.show_diff());

        let group = &report.groups()[0];
        assert_eq!(group.title(), "Subscriptions");
        assert!(group.options().sum);
        assert_eq!(group.children().len(), 2);

        let paid = group.children()[0].as_group().unwrap();
        assert_eq!(paid.parent(), Some(group.id()));
        let plus = paid.children()[0].as_series().unwrap();
        assert_eq!(plus.formatter(), Formatter::scalar());
        // duplicate February record keeps the first one
        assert_eq!(plus.sum_by_year(2020), 30);

        let conversion = group.children()[1].as_series().unwrap();
        assert_eq!(conversion.sum_type(), SumType::Avg);
        assert!(conversion.options().invert_color);
        assert_eq!(conversion.sum_by_year(2020), 7);
    }

    #[test]
    fn test_unsupported_sum_type() {
        let json = r#"{ "groups": [{ "title": "G", "children": [
            { "type": "series", "title": "S", "sumType": "median" } ] }] }"#;
        assert!(matches!(
            parse_report(json),
            Err(TallyError::UnsupportedSumType(_))
        ));
    }

    #[test]
    fn test_invalid_date() {
        let json = r#"{ "groups": [{ "title": "G", "children": [
            { "type": "series", "title": "S",
              "records": [{ "date": "2020-02-30", "value": 1 }] } ] }] }"#;
        assert!(matches!(parse_report(json), Err(TallyError::Parse(_))));
    }

    #[test]
    fn test_unknown_option_keys_are_kept_aside() {
        let report = parse_report(SAMPLE).unwrap();
        assert!(report.options().ignored.contains_key("unknown"));
        assert!(report.groups()[0].options().ignored.is_empty());
    }

    #[test]
    fn test_wrong_option_type_is_parse_error() {
        let json = r#"{ "groups": [{ "title": "G", "options": { "topView": "three" } }] }"#;
        assert!(matches!(parse_report(json), Err(TallyError::Parse(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_report("{"), Err(TallyError::Parse(_))));
    }

    #[test]
    fn test_empty_definition() {
        let report = parse_report("{}").unwrap();
        assert!(report.groups().is_empty());
        assert_eq!(report.css_class(), "big-data-table");
    }

    #[test]
    fn test_load_report_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let report = load_report(file.path()).unwrap();
        assert_eq!(report.groups().len(), 1);
    }

    #[test]
    fn test_load_report_missing_file() {
        let err = load_report(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(matches!(err, TallyError::Io(_)));
    }
}

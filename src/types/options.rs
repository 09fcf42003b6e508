//! Per-node display and aggregation options
//!
//! Options are read from JSON objects. Missing keys keep their defaults and
//! unrecognized keys are collected into `ignored`, logged at debug and
//! otherwise unused.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::Formatter;

fn log_ignored(kind: &str, owner: &str, ignored: &BTreeMap<String, Value>) {
    if ignored.is_empty() {
        return;
    }
    let keys: Vec<&str> = ignored.keys().map(String::as_str).collect();
    tracing::debug!(kind, owner, ?keys, "unrecognized options ignored");
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesOptions {
    pub css_class: String,
    /// Render growth as bad and decline as good (e.g. churn)
    pub invert_color: bool,
    #[serde(flatten)]
    pub ignored: BTreeMap<String, Value>,
}

impl SeriesOptions {
    pub fn log_ignored(&self, owner: &str) {
        log_ignored("series", owner, &self.ignored);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupOptions {
    pub css_class: String,
    /// Keep only the N largest children; 0 disables collapsing
    pub top_view: usize,
    pub top_view_other_label: String,
    /// Render a sum row for the group
    pub sum: bool,
    pub show_percentage_diff: bool,
    #[serde(rename = "sumFormatterKind")]
    pub sum_formatter: Option<Formatter>,
    #[serde(flatten)]
    pub ignored: BTreeMap<String, Value>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            css_class: String::new(),
            top_view: 0,
            top_view_other_label: "Others".to_string(),
            sum: false,
            show_percentage_diff: false,
            sum_formatter: None,
            ignored: BTreeMap::new(),
        }
    }
}

impl GroupOptions {
    pub fn log_ignored(&self, owner: &str) {
        log_ignored("group", owner, &self.ignored);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportOptions {
    pub css_class: String,
    /// Year to display; 0 means the current year
    pub target_year: i32,
    /// Comparison year; 0 disables the comparison
    pub diff_year: i32,
    pub show_diff: bool,
    #[serde(flatten)]
    pub ignored: BTreeMap<String, Value>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            css_class: "big-data-table".to_string(),
            target_year: 0,
            diff_year: 0,
            show_diff: false,
            ignored: BTreeMap::new(),
        }
    }
}

impl ReportOptions {
    pub fn log_ignored(&self) {
        log_ignored("report", "", &self.ignored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::json;

    fn from_value<T: DeserializeOwned>(value: Value) -> serde_json::Result<T> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_group_defaults() {
        let opts = GroupOptions::default();
        assert_eq!(opts.top_view, 0);
        assert_eq!(opts.top_view_other_label, "Others");
        assert!(!opts.sum);
        assert!(opts.sum_formatter.is_none());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let opts: GroupOptions = from_value(json!({"topView": 3})).unwrap();
        assert_eq!(opts.top_view, 3);
        assert_eq!(opts.top_view_other_label, "Others");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let opts: ReportOptions =
            from_value(json!({"diffYear": 2019, "showDiff": true, "colour": "red"})).unwrap();
        assert_eq!(opts.diff_year, 2019);
        assert!(opts.show_diff);
        assert_eq!(opts.css_class, "big-data-table");
        assert_eq!(opts.ignored.keys().collect::<Vec<_>>(), vec!["colour"]);
    }

    #[test]
    fn test_known_keys_are_not_ignored() {
        let opts: GroupOptions =
            from_value(json!({"topView": 2, "sumFormatterKind": "scalar", "cssClass": "x"}))
                .unwrap();
        assert!(opts.ignored.is_empty());
        assert_eq!(opts.sum_formatter, Some(Formatter::scalar()));

        let opts: SeriesOptions = from_value(json!({"invertColour": true})).unwrap();
        assert!(!opts.invert_color);
        assert!(opts.ignored.contains_key("invertColour"));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        assert!(from_value::<GroupOptions>(json!({"topView": "three"})).is_err());
    }

    #[test]
    fn test_sum_formatter_kind() {
        let opts: GroupOptions =
            from_value(json!({"sum": true, "sumFormatterKind": "currency"})).unwrap();
        assert!(opts.sum);
        assert_eq!(opts.sum_formatter, Some(Formatter::currency()));
    }

    #[test]
    fn test_series_options() {
        let opts: SeriesOptions = from_value(json!({"invertColor": true})).unwrap();
        assert!(opts.invert_color);
        assert_eq!(opts.css_class, "");
    }
}

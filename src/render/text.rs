//! Plain-text table renderer

use chrono::NaiveDate;

use super::Renderer;
use crate::services::{today, Aggregate, Group, MonthColumn, Node, Report};
use crate::types::Result;

const INDENT: &str = "  ";
const MIN_VALUE_WIDTH: usize = 8;

enum Column {
    Year(i32),
    YearDiff { prev: i32, next: i32 },
    Month(MonthColumn),
    MonthDiff { prev: i32, next: i32, month: u32 },
}

impl Column {
    fn header(&self) -> String {
        match self {
            Column::Year(year) => year.to_string(),
            Column::YearDiff { .. } | Column::MonthDiff { .. } => "Δ".to_string(),
            Column::Month(column) => column.label.clone(),
        }
    }

    fn is_diff(&self) -> bool {
        matches!(self, Column::YearDiff { .. } | Column::MonthDiff { .. })
    }
}

struct Row {
    label: String,
    cells: Vec<String>,
}

/// Shared per-render state
struct Layout {
    today: NaiveDate,
    target_year: i32,
    window: Vec<MonthColumn>,
    columns: Vec<Column>,
}

impl Layout {
    fn new(report: &Report, today: NaiveDate) -> Self {
        let target_year = report.target_year_as_of(today);
        let window = report.months_as_of(today);
        let show_diff = report.show_diff();
        let diff_year = report.diff_year();

        let mut columns: Vec<Column> = report
            .years_as_of(today)
            .into_iter()
            .map(Column::Year)
            .collect();
        if show_diff {
            columns.push(Column::YearDiff {
                prev: diff_year,
                next: target_year,
            });
        }

        for (i, column) in window.iter().enumerate() {
            columns.push(Column::Month(column.clone()));
            let month_done = window.get(i + 1).is_none_or(|next| next.month != column.month);
            if show_diff && month_done {
                columns.push(Column::MonthDiff {
                    prev: diff_year,
                    next: target_year,
                    month: column.month,
                });
            }
        }

        Self {
            today,
            target_year,
            window,
            columns,
        }
    }

    fn cells(
        &self,
        node: &dyn Aggregate,
        format: &dyn Fn(i64) -> String,
        with_diffs: bool,
    ) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match column {
                Column::Year(year) => format(node.sum_by_year(*year)),
                Column::Month(c) => format(node.sum_by_year_and_month(c.year, c.month)),
                _ if !with_diffs => String::new(),
                Column::YearDiff { prev, next } => format_diff(
                    node.diff_of_year_as_of(*prev, *next, self.today),
                    node.diff_in_points(),
                ),
                Column::MonthDiff { prev, next, month } => format_diff(
                    node.diff_of_month_as_of(*prev, *next, *month, self.today),
                    node.diff_in_points(),
                ),
            })
            .collect()
    }
}

fn format_diff(value: i64, points: bool) -> String {
    let unit = if points { "pp" } else { "%" };
    format!("{:+}{}", value, unit)
}

/// Renders a report as an aligned text table.
///
/// One row per group heading, per displayed child and per group sum row;
/// one column per year, per displayed month and, with diffs enabled, per diff.
#[derive(Debug, Default)]
pub struct TextRenderer {
    today: Option<NaiveDate>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the calendar used for the window and forecasts
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn render_group(&self, group: &Group, depth: usize, layout: &Layout, rows: &mut Vec<Row>) {
        rows.push(Row {
            label: format!("{}{}", INDENT.repeat(depth), group.title()),
            cells: vec![String::new(); layout.columns.len()],
        });

        for child in group.displayed_children(layout.target_year, &layout.window) {
            match &*child {
                Node::Series(series) => rows.push(Row {
                    label: format!("{}{}", INDENT.repeat(depth + 1), series.title()),
                    cells: layout.cells(series, &|v| series.format(v), true),
                }),
                Node::Group(nested) => self.render_group(nested, depth + 1, layout, rows),
            }
        }

        if group.options().sum {
            rows.push(Row {
                label: format!("{}Σ {}", INDENT.repeat(depth + 1), group.title()),
                cells: layout.cells(
                    group,
                    &|v| group.format(v),
                    group.options().show_percentage_diff,
                ),
            });
        }
    }
}

impl Renderer for TextRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn render(&self, report: &Report) -> Result<String> {
        let layout = Layout::new(report, self.today.unwrap_or_else(today));

        let mut rows = Vec::new();
        for group in report.groups() {
            self.render_group(group, 0, &layout, &mut rows);
        }

        let label_width = rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = layout
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|r| r.cells[i].chars().count())
                    .chain([column.header().chars().count()])
                    .max()
                    .unwrap_or(0)
                    .max(if column.is_diff() { 0 } else { MIN_VALUE_WIDTH })
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        let mut header = format!("{:<label_width$}", "");
        for (column, width) in layout.columns.iter().zip(&widths) {
            header.push_str(&format!(" | {:>width$}", column.header()));
        }
        let rule_width = header.chars().count();
        lines.push(header);
        lines.push("-".repeat(rule_width));

        for row in &rows {
            let mut line = format!("{:<label_width$}", row.label);
            for (cell, width) in row.cells.iter().zip(&widths) {
                line.push_str(&format!(" | {:>width$}", cell));
            }
            lines.push(line.trim_end().to_string());
        }

        Ok(lines.join("\n"))
    }
}

//! Report root: top-level groups plus the display window

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Instant;

use super::aggregate::today;
use super::group::{Group, Node};
use crate::render::Renderer;
use crate::types::{GroupOptions, NodeId, ReportOptions, Result, TallyError};

/// One displayed month column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthColumn {
    pub year: i32,
    pub month: u32,
    /// e.g. "Mar 2020"
    pub label: String,
}

impl MonthColumn {
    pub fn new(year: i32, month: u32) -> Self {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{:02}/{}", month, year));
        Self { year, month, label }
    }
}

pub struct Report {
    groups: Vec<Group>,
    options: ReportOptions,
    renderer: Option<Box<dyn Renderer>>,
}

impl Report {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            groups: Vec::new(),
            options,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ReportOptions {
        &mut self.options
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn css_class(&self) -> &str {
        &self.options.css_class
    }

    /// Comparison year, 0 when disabled
    pub fn diff_year(&self) -> i32 {
        self.options.diff_year
    }

    /// Diff columns are shown only with a comparison year set
    pub fn show_diff(&self) -> bool {
        self.options.show_diff && self.options.diff_year != 0
    }

    pub fn target_year_as_of(&self, today: NaiveDate) -> i32 {
        if self.options.target_year == 0 {
            today.year()
        } else {
            self.options.target_year
        }
    }

    /// Target year plus comparison year, ascending and de-duplicated
    pub fn years_as_of(&self, today: NaiveDate) -> Vec<i32> {
        let mut years = vec![self.target_year_as_of(today)];
        if self.options.diff_year != 0 {
            years.push(self.options.diff_year);
        }
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn years(&self) -> Vec<i32> {
        self.years_as_of(today())
    }

    /// Month columns, most recent month first, every displayed year per month.
    ///
    /// A target year equal to the current year stops at the current month.
    pub fn months_as_of(&self, today: NaiveDate) -> Vec<MonthColumn> {
        let years = self.years_as_of(today);
        let last_month = if self.target_year_as_of(today) == today.year() {
            today.month()
        } else {
            12
        };

        (1..=last_month)
            .rev()
            .flat_map(|month| years.iter().map(move |&year| MonthColumn::new(year, month)))
            .collect()
    }

    pub fn months(&self) -> Vec<MonthColumn> {
        self.months_as_of(today())
    }

    pub fn add_group(&mut self, mut group: Group) -> &mut Group {
        group.set_parent(None);
        self.groups.push(group);
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub fn create_group(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        options: GroupOptions,
    ) -> &mut Group {
        self.add_group(Group::new(title, description).with_options(options))
    }

    pub fn remove_group(&mut self, id: NodeId) -> Result<Group> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id() == id)
            .ok_or_else(|| TallyError::NotFound(format!("group {} in report", id)))?;
        Ok(self.groups.remove(index))
    }

    pub fn group(&self, id: NodeId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    /// Any group in the tree, e.g. to resolve a node's parent id
    pub fn find_group(&self, id: NodeId) -> Option<&Group> {
        self.groups.iter().find_map(|g| g.find_group(id))
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.groups.iter().find_map(|g| g.find(id))
    }

    pub fn render(&self) -> Result<String> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or(TallyError::NoRendererConfigured)?;

        let started = Instant::now();
        let output = renderer.render(self).map_err(|e| match e {
            TallyError::Render(_) => e,
            other => TallyError::Render(other.to_string()),
        })?;
        tracing::info!(
            renderer = renderer.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "report rendered"
        );
        Ok(output)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("groups", &self.groups)
            .field("options", &self.options)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name()))
            .finish()
    }
}

/// A report serializes as its list of groups
impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.groups.serialize(serializer)
    }
}

//! Composite tree nodes: groups of series and nested groups

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::ops::Deref;

use super::aggregate::Aggregate;
use super::report::MonthColumn;
use super::series::Series;
use crate::types::{GroupOptions, NodeId, Record, Result, TallyError};

/// A child of a group: either a leaf series or a nested group
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Node {
    Series(Series),
    Group(Group),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Series(s) => s.id(),
            Node::Group(g) => g.id(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Series(s) => s.parent(),
            Node::Group(g) => g.parent(),
        }
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Series(s) => s.set_parent(parent),
            Node::Group(g) => g.set_parent(parent),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Node::Series(s) => s.title(),
            Node::Group(g) => g.title(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Node::Series(s) => s.description(),
            Node::Group(g) => g.description(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Node::Series(s) => Some(s),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            Node::Series(_) => None,
        }
    }

    pub fn format(&self, value: i64) -> String {
        match self {
            Node::Series(s) => s.format(value),
            Node::Group(g) => g.format(value),
        }
    }
}

impl From<Series> for Node {
    fn from(series: Series) -> Self {
        Node::Series(series)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl Aggregate for Node {
    fn sum_by_year(&self, year: i32) -> i64 {
        match self {
            Node::Series(s) => s.sum_by_year(year),
            Node::Group(g) => g.sum_by_year(year),
        }
    }

    fn sum_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        match self {
            Node::Series(s) => s.sum_by_year_and_month(year, month),
            Node::Group(g) => g.sum_by_year_and_month(year, month),
        }
    }

    fn growth_by_year(&self, year: i32) -> i64 {
        match self {
            Node::Series(s) => s.growth_by_year(year),
            Node::Group(g) => g.growth_by_year(year),
        }
    }

    fn growth_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        match self {
            Node::Series(s) => s.growth_by_year_and_month(year, month),
            Node::Group(g) => g.growth_by_year_and_month(year, month),
        }
    }

    fn forecast_by_year_as_of(&self, year: i32, today: NaiveDate) -> i64 {
        match self {
            Node::Series(s) => s.forecast_by_year_as_of(year, today),
            Node::Group(g) => g.forecast_by_year_as_of(year, today),
        }
    }

    fn forecast_by_year_and_month_as_of(&self, year: i32, month: u32, today: NaiveDate) -> i64 {
        match self {
            Node::Series(s) => s.forecast_by_year_and_month_as_of(year, month, today),
            Node::Group(g) => g.forecast_by_year_and_month_as_of(year, month, today),
        }
    }

    fn diff_in_points(&self) -> bool {
        match self {
            Node::Series(s) => s.diff_in_points(),
            Node::Group(g) => g.diff_in_points(),
        }
    }
}

/// A child as shown in a report: a real child or the synthetic "Others" merge
#[derive(Debug)]
pub enum DisplayedChild<'a> {
    Child(&'a Node),
    Others(Node),
}

impl DisplayedChild<'_> {
    pub fn is_others(&self) -> bool {
        matches!(self, DisplayedChild::Others(_))
    }
}

impl Deref for DisplayedChild<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        match self {
            DisplayedChild::Child(node) => *node,
            DisplayedChild::Others(node) => node,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Group {
    #[serde(skip)]
    id: NodeId,
    #[serde(skip)]
    parent: Option<NodeId>,
    title: String,
    description: String,
    #[serde(skip)]
    options: GroupOptions,
    children: Vec<Node>,
}

impl Group {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            title: title.into(),
            description: description.into(),
            options: GroupOptions::default(),
            children: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: GroupOptions) -> Self {
        self.options = options;
        self
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

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut GroupOptions {
        &mut self.options
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Append a child and point its parent at this group
    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Node {
        let mut child = child.into();
        child.set_parent(Some(self.id));
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn add_series(&mut self, series: Series) -> &mut Series {
        match self.add_child(series) {
            Node::Series(s) => s,
            Node::Group(_) => unreachable!("a series was just attached"),
        }
    }

    pub fn create_sub_group(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Group {
        match self.add_child(Group::new(title, description)) {
            Node::Group(g) => g,
            Node::Series(_) => unreachable!("a group was just attached"),
        }
    }

    /// Detach a direct child, clearing its parent
    pub fn remove_child(&mut self, id: NodeId) -> Result<Node> {
        let index = self
            .children
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| {
                TallyError::NotFound(format!("child {} in group '{}'", id, self.title))
            })?;
        let mut child = self.children.remove(index);
        child.set_parent(None);
        Ok(child)
    }

    pub fn child(&self, id: NodeId) -> Option<&Node> {
        self.children.iter().find(|c| c.id() == id)
    }

    /// Depth-first lookup of any descendant
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.children.iter().find_map(|c| {
            if c.id() == id {
                Some(c)
            } else {
                c.as_group().and_then(|g| g.find(id))
            }
        })
    }

    /// Depth-first lookup of this group or a nested group
    pub fn find_group(&self, id: NodeId) -> Option<&Group> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_group)
            .find_map(|g| g.find_group(id))
    }

    pub fn format(&self, value: i64) -> String {
        match self.options.sum_formatter {
            Some(formatter) => formatter.format(value),
            None => value.to_string(),
        }
    }

    fn is_flat(&self) -> bool {
        !self.children.iter().any(Node::is_group)
    }

    /// Children in display order for `year`.
    ///
    /// With `top_view = k > 0` on a flat list of series, children are ranked by
    /// their yearly sum (ties keep insertion order), the first `k` are kept and
    /// the remainder is merged into one trailing "Others" series. For every
    /// year shown in `window` it holds one record per month in which any
    /// merged child has data, so yearly figures cover the whole year.
    pub fn displayed_children(
        &self,
        year: i32,
        window: &[MonthColumn],
    ) -> Vec<DisplayedChild<'_>> {
        let top = self.options.top_view;
        if top == 0 || !self.is_flat() {
            return self.children.iter().map(DisplayedChild::Child).collect();
        }

        let mut ranked: Vec<(i64, &Node)> = self
            .children
            .iter()
            .map(|c| (c.sum_by_year(year), c))
            .collect();
        ranked.sort_by_key(|(sum, _)| Reverse(*sum));

        let rest: Vec<&Node> = ranked.iter().skip(top).map(|(_, c)| *c).collect();
        let mut displayed: Vec<DisplayedChild<'_>> = ranked
            .iter()
            .take(top)
            .map(|(_, c)| DisplayedChild::Child(*c))
            .collect();

        if let Some(others) = self.merge_others(&rest, window) {
            tracing::debug!(
                group = %self.title,
                kept = top,
                merged = rest.len(),
                "collapsed children into others"
            );
            displayed.push(DisplayedChild::Others(Node::Series(others)));
        }
        displayed
    }

    fn merge_others(&self, rest: &[&Node], window: &[MonthColumn]) -> Option<Series> {
        let template = rest.iter().find_map(|c| c.as_series())?;
        let mut others = template.derive_empty(self.options.top_view_other_label.clone());
        others.set_parent(Some(self.id));

        let years: BTreeSet<i32> = window.iter().map(|column| column.year).collect();
        for year in years {
            for month in 1..=12 {
                let has_data = rest
                    .iter()
                    .filter_map(|c| c.as_series())
                    .any(|s| s.has_month(year, month));
                if !has_data {
                    continue;
                }
                let value = rest.iter().fold(0i64, |acc, c| {
                    acc.saturating_add(c.sum_by_year_and_month(year, month))
                });
                match Record::at(year, month, 1, 0, value) {
                    Ok(record) => {
                        others.add_record(record);
                    }
                    Err(e) => tracing::warn!(group = %self.title, "skipping others month: {}", e),
                }
            }
        }
        Some(others)
    }

    fn children_total(&self, per_child: impl Fn(&Node) -> i64) -> i64 {
        self.children
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(per_child(c)))
    }
}

impl Aggregate for Group {
    fn sum_by_year(&self, year: i32) -> i64 {
        self.children_total(|c| c.sum_by_year(year))
    }

    fn sum_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        self.children_total(|c| c.sum_by_year_and_month(year, month))
    }

    fn growth_by_year(&self, year: i32) -> i64 {
        self.children_total(|c| c.growth_by_year(year))
    }

    fn growth_by_year_and_month(&self, year: i32, month: u32) -> i64 {
        self.children_total(|c| c.growth_by_year_and_month(year, month))
    }

    fn forecast_by_year_as_of(&self, year: i32, today: NaiveDate) -> i64 {
        self.children_total(|c| c.forecast_by_year_as_of(year, today))
    }

    fn forecast_by_year_and_month_as_of(&self, year: i32, month: u32, today: NaiveDate) -> i64 {
        self.children_total(|c| c.forecast_by_year_and_month_as_of(year, month, today))
    }
}

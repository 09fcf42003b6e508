//! Report tree, aggregation and report sources

pub mod aggregate;
pub mod demo;
pub mod group;
pub mod loader;
pub mod report;
pub mod series;
pub mod settings;

pub use aggregate::{today, Aggregate};
pub use group::{DisplayedChild, Group, Node};
pub use loader::ReportDefinition;
pub use report::{MonthColumn, Report};
pub use series::Series;
pub use settings::Settings;

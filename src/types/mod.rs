//! Type definitions for tallytable

mod error;
mod format;
mod node;
pub mod options;
mod record;

pub use error::*;
pub use format::Formatter;
pub use node::NodeId;
pub use options::{GroupOptions, ReportOptions, SeriesOptions};
pub use record::{BucketKey, Record, SumType};

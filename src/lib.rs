//! tallytable: hierarchical yearly/monthly aggregation tables
//!
//! A [`services::Report`] owns groups of [`services::Series`] and nested
//! [`services::Group`]s. Every node answers sum, growth, forecast and diff
//! queries through [`services::Aggregate`]; a [`render::Renderer`] walks the
//! tree to produce output.

pub mod cli;
pub mod render;
pub mod services;
pub mod types;

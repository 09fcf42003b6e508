//! Renderers turning a report tree into output text

mod json;
mod text;

pub use json::JsonRenderer;
pub use text::TextRenderer;

use crate::services::Report;
use crate::types::Result;

/// Read-only consumer of a report producing formatted output
pub trait Renderer: Send + Sync {
    /// Renderer name (e.g., "text")
    fn name(&self) -> &str;

    /// Render the whole report
    fn render(&self, report: &Report) -> Result<String>;
}

use super::Renderer;
use crate::services::Report;
use crate::types::{Result, TallyError};

/// Pretty-printed JSON of the report tree
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, report: &Report) -> Result<String> {
        serde_json::to_string_pretty(report).map_err(|e| TallyError::Render(e.to_string()))
    }
}

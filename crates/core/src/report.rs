//! The structured report: its shape, recovery from model output, and the
//! canonical markdown rendering.

mod extract;
mod markdown;
mod schema;

use schemars::schema_for;
use serde_json::Value;

pub use extract::{extract_report, validate_report};
pub use markdown::{Markdown, render_markdown};
pub use schema::*;

/// A validated report together with its markdown rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedReport {
    /// The validated report.
    pub report: StructuredReport,
    /// `render_markdown(&report)`.
    pub markdown: String,
}

impl GeneratedReport {
    /// Renders the report and bundles both forms.
    #[inline]
    pub fn new(report: StructuredReport) -> Self {
        let markdown = render_markdown(&report);
        Self { report, markdown }
    }
}

/// Returns the JSON Schema of [`StructuredReport`].
pub fn report_schema() -> Value {
    schema_for!(StructuredReport).to_value()
}

use serde_json::Value;

use super::StructuredReport;
use crate::error::{Error, Result};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Recovers a [`StructuredReport`] from raw model output.
///
/// The whole text is parsed as JSON first. If that fails, the first fenced
/// block tagged `json` is parsed instead. Text that yields no JSON fails
/// with [`Error::ReportParse`]; JSON that is not a complete report fails
/// with [`Error::ReportValidation`]. Nothing is coerced or defaulted.
pub fn extract_report(raw: &str) -> Result<StructuredReport> {
    let value = parse_json(raw)?;
    validate_report(value)
}

/// Checks that a JSON value has the exact report shape.
pub fn validate_report(value: Value) -> Result<StructuredReport> {
    serde_json::from_value(value)
        .map_err(|err| Error::ReportValidation(err.to_string()))
}

fn parse_json(raw: &str) -> Result<Value> {
    let direct_err = match serde_json::from_str::<Value>(raw) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    trace!("model output is not plain JSON: {direct_err}");

    let Some(block) = find_json_block(raw) else {
        return Err(Error::ReportParse(direct_err.to_string()));
    };
    debug!("parsing fenced JSON block of {} bytes", block.len());
    serde_json::from_str(block).map_err(|err| Error::ReportParse(err.to_string()))
}

/// Returns the trimmed content of the first ```` ```json ```` block.
fn find_json_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

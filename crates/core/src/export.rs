//! Shareable renderings of an idea. Writing them anywhere is up to the
//! caller.

use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::error::{Error, Result};
use crate::store::Idea;

/// Renders an idea, including its report if any, as a markdown document.
pub fn idea_markdown(idea: &Idea) -> String {
    let mut md = format!(
        "# {}\n\n**Status:** {}\n**Created:** {}\n**Updated:** {}\n\n",
        idea.title,
        idea.status,
        idea.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        idea.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    // Writing into a `String` cannot fail.
    if !idea.tags.is_empty() {
        let _ = write!(md, "**Tags:** {}\n\n", idea.tags.join(", "));
    }
    if !idea.summary.is_empty() {
        let _ = write!(md, "## Summary\n\n{}\n\n", idea.summary);
    }
    if !idea.report_md.is_empty() {
        let _ = writeln!(md, "## Report\n\n{}", idea.report_md);
    }
    md
}

/// Renders an idea as pretty-printed JSON.
pub fn idea_json(idea: &Idea) -> Result<String> {
    serde_json::to_string_pretty(idea)
        .map_err(|err| Error::ReportValidation(err.to_string()))
}

/// Returns a file name for an exported idea: the title with every
/// character other than an ASCII letter or digit replaced by `_`, then the
/// timestamp and the extension.
pub fn export_file_name(idea: &Idea, extension: &str, timestamp_millis: i64) -> String {
    let stem: String = idea
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}_{timestamp_millis}.{extension}")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::{IdeaId, IdeaStatus};

    fn idea() -> Idea {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        Idea {
            id: IdeaId::new(),
            title: "HabitLoop: adaptive goals!".to_owned(),
            created_at,
            updated_at: created_at,
            tags: Vec::new(),
            status: IdeaStatus::Draft,
            summary: String::new(),
            report_md: String::new(),
            report_json: None,
            synced_at: None,
        }
    }

    #[test]
    fn test_markdown_draft() {
        assert_eq!(
            idea_markdown(&idea()),
            "# HabitLoop: adaptive goals!\n\n\
             **Status:** draft\n\
             **Created:** 2025-01-05T10:00:00.000Z\n\
             **Updated:** 2025-01-05T10:00:00.000Z\n\n"
        );
    }

    #[test]
    fn test_markdown_refined() {
        let mut idea = idea();
        idea.status = IdeaStatus::Refined;
        idea.tags = vec!["health".to_owned(), "mobile".to_owned()];
        idea.summary = "A habit tracker that adapts goals.".to_owned();
        idea.report_md = "# HabitLoop\n\n**Adaptive.**\n".to_owned();

        let md = idea_markdown(&idea);
        assert!(md.contains("**Status:** refined\n"));
        assert!(md.contains(
            "**Tags:** health, mobile\n\n## Summary\n\nA habit tracker that adapts goals.\n\n## Report\n\n# HabitLoop\n\n**Adaptive.**\n\n"
        ));
        assert!(md.ends_with("**Adaptive.**\n\n"));
    }

    #[test]
    fn test_json_uses_wire_names() {
        let idea = idea();
        let json = idea_json(&idea).unwrap();
        // Same timestamp format as the markdown export.
        assert!(json.contains("\n  \"createdAt\": \"2025-01-05T10:00:00.000Z\""));
        assert!(json.contains("\n  \"syncedAt\": null"));
        assert!(json.contains("\"reportJson\": null"));
        assert_eq!(Idea::from_json(&json).unwrap(), idea);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            export_file_name(&idea(), "md", 1736071200000),
            "HabitLoop__adaptive_goals__1736071200000.md"
        );
        let mut idea = idea();
        idea.title = "Café".to_owned();
        assert_eq!(export_file_name(&idea, "json", 1), "Caf__1.json");
    }
}

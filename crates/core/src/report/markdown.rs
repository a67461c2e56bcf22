use std::fmt::{self, Display, Formatter};

use super::StructuredReport;

/// Renders a report as markdown.
///
/// The section order, heading levels and bullet prefixes are stable, so
/// identical reports always render to identical text.
#[inline]
pub fn render_markdown(report: &StructuredReport) -> String {
    Markdown(report).to_string()
}

/// A [`Display`] adapter that writes a report as markdown.
#[derive(Clone, Copy, Debug)]
pub struct Markdown<'a>(pub &'a StructuredReport);

impl Display for Markdown<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;

        write!(f, "# {}\n\n", report.pitch.title)?;
        write!(f, "**{}**\n\n", report.pitch.one_liner)?;

        f.write_str("## Problem\n\n")?;
        write!(f, "{}\n\n", report.problem.statement)?;
        write!(f, "**Why Now:** {}\n\n", report.problem.why_now)?;

        f.write_str("## Audience\n\n")?;
        for persona in &report.audience.personas {
            write!(f, "### {}\n\n", persona.name)?;
            write!(f, "{}\n\n", persona.description)?;
            f.write_str("**Pain Points:**\n")?;
            bullets(f, "- ", &persona.pain_points)?;
            f.write_str("\n")?;
        }

        f.write_str("## Solution\n\n")?;
        write!(f, "{}\n\n", report.solution.description)?;
        f.write_str("**Differentiators:**\n")?;
        bullets(f, "- ", &report.solution.differentiators)?;
        f.write_str("\n")?;

        f.write_str("## Features\n\n")?;
        f.write_str("### MVP\n")?;
        bullets(f, "- ", &report.features.mvp)?;
        f.write_str("\n### Later\n")?;
        bullets(f, "- ", &report.features.later)?;
        f.write_str("\n")?;

        f.write_str("## Architecture\n\n")?;
        write!(f, "{}\n\n", report.architecture.overview)?;
        f.write_str("**Components:**\n")?;
        bullets(f, "- ", &report.architecture.components)?;
        f.write_str("\n")?;

        f.write_str("## Data Model\n\n")?;
        for entity in &report.data_model.entities {
            writeln!(f, "### {}", entity.name)?;
            for field in &entity.fields {
                writeln!(f, "- {}: {}", field.name, field.ty)?;
            }
            f.write_str("\n")?;
        }

        f.write_str("## Roadmap\n\n")?;
        for phase in &report.roadmap.phases {
            writeln!(f, "### {} ({})", phase.name, phase.duration)?;
            bullets(f, "- ", &phase.deliverables)?;
            f.write_str("\n")?;
        }

        f.write_str("## Risks\n\n")?;
        for item in &report.risks.items {
            writeln!(f, "### {}", item.risk)?;
            write!(f, "**Mitigation:** {}\n\n", item.mitigation)?;
        }

        f.write_str("## Checklist\n\n")?;
        f.write_str("### Security\n")?;
        bullets(f, "- [ ] ", &report.checklist.security)?;
        f.write_str("\n### Privacy\n")?;
        bullets(f, "- [ ] ", &report.checklist.privacy)?;
        f.write_str("\n### Cost\n")?;
        bullets(f, "- [ ] ", &report.checklist.cost)
    }
}

fn bullets(f: &mut Formatter<'_>, prefix: &str, items: &[String]) -> fmt::Result {
    for item in items {
        writeln!(f, "{prefix}{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = include_str!("../../fixtures/report.json");

    const EXPECTED: &str = "\
# HabitLoop

**A habit tracker that adapts goals to your real week.**

## Problem

People abandon habit trackers after a missed streak because goals are rigid.

**Why Now:** Wearables now report sleep and activity data that can inform realistic goals.

## Audience

### Busy Parent

Works full time and squeezes habits into unpredictable evenings.

**Pain Points:**
- Streaks break on chaotic days
- No time to reconfigure goals

### Returning Athlete

Rebuilding a routine after an injury.

**Pain Points:**
- Overambitious targets lead to burnout

## Solution

A mobile app that scales daily targets using recent sleep and schedule data.

**Differentiators:**
- Adaptive targets instead of fixed streaks
- Forgiving streak model

## Features

### MVP
- Habit creation
- Daily check-in
- Adaptive target suggestions

### Later
- Wearable sync
- Shared accountability groups

## Architecture

Offline-first mobile client with an optional sync backend.

**Components:**
- Mobile client
- Local database
- Suggestion engine

## Data Model

### Habit
- id: uuid
- title: string
- baseTarget: integer

### CheckIn
- habitId: uuid
- date: date

## Roadmap

### Prototype (4 weeks)
- Clickable prototype
- Five user interviews

### Beta (8 weeks)
- TestFlight build

## Risks

### Suggestions feel patronising
**Mitigation:** Let users cap how far targets move.

## Checklist

### Security
- [ ] Encrypt the local database

### Privacy
- [ ] Keep health data on device by default

### Cost
- [ ] Stay within free tier during beta
";

    fn report() -> StructuredReport {
        serde_json::from_str(REPORT).unwrap()
    }

    #[test]
    fn test_golden_output() {
        assert_eq!(render_markdown(&report()), EXPECTED);
    }

    #[test]
    fn test_deterministic() {
        let report = report();
        let first = render_markdown(&report);
        for _ in 0..10 {
            assert_eq!(render_markdown(&report.clone()), first);
        }
    }

    #[test]
    fn test_empty_lists() {
        let mut report = report();
        report.audience.personas.clear();
        report.data_model.entities.clear();
        report.roadmap.phases.clear();
        report.risks.items.clear();
        report.checklist.cost.clear();
        let md = render_markdown(&report);
        assert!(md.contains("## Audience\n\n## Solution\n\n"));
        assert!(md.contains("## Data Model\n\n## Roadmap\n\n## Risks\n\n## Checklist"));
        assert!(md.ends_with("### Cost\n"));
    }
}

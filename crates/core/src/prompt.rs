//! Instruction text for the interview and for the final report.
//!
//! Builders here are pure: the same input always produces byte-identical
//! text, which keeps recorded conversations replayable.

use std::fmt::Write as _;

use crate::conversation::ConversationMessage;

const DEFAULT_IDEA_TITLE: &str = "a new idea";

/// What the interview prompt is built from.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterviewContext<'a> {
    /// Working title of the idea, if known.
    pub idea_title: Option<&'a str>,
    /// The whole conversation so far, oldest first.
    pub previous_messages: &'a [ConversationMessage],
}

/// Builds the system instruction for the next interview turn.
pub fn build_interview_prompt(context: &InterviewContext<'_>) -> String {
    let idea_title = context
        .idea_title
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_IDEA_TITLE);

    format!(
        "You are a product strategist helping to refine an idea. Your goal is to ask clarifying questions and challenge assumptions to help the user develop a well-thought-out product plan.

The user is working on: {idea_title}

Guidelines:
- Ask one question at a time
- Be concise and focused
- Challenge assumptions when appropriate
- Cover these areas: problem statement, target audience, solution approach, MVP scope, constraints, and risks
- Be conversational and helpful, not interrogative
- Build on previous answers to go deeper

Previous conversation:
{history}

Ask your next question to help refine this idea.",
        history = render_history(context.previous_messages, "\n"),
    )
}

/// Builds the instruction that asks for the final structured report.
pub fn build_report_prompt(history: &[ConversationMessage]) -> String {
    format!(
        "You are a product strategist. Based on the following conversation, generate a comprehensive structured report.

The report should include:
1. Pitch: title and one-liner
2. Problem: statement and why now
3. Audience: personas with descriptions and pain points
4. Solution: description and differentiators
5. Features: MVP features vs later features
6. Architecture: overview and components
7. Data Model: entities with fields and relations
8. Roadmap: phases with duration and deliverables
9. Risks: items with mitigations
10. Checklist: security, privacy, and cost considerations

Conversation history:
{history}

Generate a complete, actionable report in JSON format matching the IdeaReport schema. Be specific and practical.",
        history = render_history(history, "\n\n"),
    )
}

/// Renders messages as `role: content` entries in chronological order.
fn render_history(messages: &[ConversationMessage], separator: &str) -> String {
    let mut out = String::new();
    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            out.push_str(separator);
        }
        // Writing into a `String` cannot fail.
        let _ = write!(out, "{}: {}", msg.role(), msg.content());
    }
    out
}

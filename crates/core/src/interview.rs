//! The interview state machine.

use ideaforge_model::ModelMessage;

use crate::conversation::{ConversationMessage, ConversationState, Role};
use crate::error::{Error, Result};
use crate::gateway::ModelGateway;
use crate::prompt::{InterviewContext, build_interview_prompt, build_report_prompt};
use crate::report::{GeneratedReport, StructuredReport};

/// How many of the latest messages are sent along with the system prompt.
pub const CONTEXT_WINDOW: usize = 5;

/// Drives an interview from the first user message to the final report.
///
/// The orchestrator holds no conversation state of its own. Each call takes
/// a snapshot and, on success, returns a new one; on failure the caller
/// still owns the old snapshot and can retry from it.
#[derive(Clone)]
pub struct InterviewOrchestrator {
    gateway: ModelGateway,
}

impl InterviewOrchestrator {
    /// Creates an orchestrator on top of the given gateway.
    #[inline]
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    /// Returns the underlying gateway.
    #[inline]
    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// Runs one interview turn.
    ///
    /// The system prompt is built from the whole history, but only the
    /// [`CONTEXT_WINDOW`] latest messages are sent after it.
    pub async fn process_message(
        &self,
        state: &ConversationState,
        user_text: impl Into<String>,
    ) -> Result<(String, ConversationState)> {
        if state.is_complete() {
            return Err(Error::InterviewComplete);
        }

        let updated = state.appended(Role::User, user_text);
        let title = updated.title();
        let prompt = build_interview_prompt(&InterviewContext {
            idea_title: title.as_deref(),
            previous_messages: updated.messages(),
        });

        let mut messages = vec![ModelMessage::System(prompt)];
        messages.extend(to_model_messages(
            updated.recent_messages(CONTEXT_WINDOW),
        ));
        debug!(
            "interview turn {} of {}",
            updated.messages().len(),
            updated.conversation_id()
        );

        let reply = self.gateway.chat(messages).await?;
        let next = updated.appended(Role::Assistant, reply.as_str());
        Ok((reply, next))
    }

    /// Generates the report for the conversation so far and returns the
    /// validated report only.
    ///
    /// An empty history is not rejected, the model is asked anyway.
    #[inline]
    pub async fn generate_report(
        &self,
        state: &ConversationState,
    ) -> Result<StructuredReport> {
        Ok(self.generate(state).await?.report)
    }

    /// Generates the report and returns it with its markdown rendering,
    /// together with the completed state.
    ///
    /// On failure the caller keeps the active state and may try again.
    pub async fn finish(
        &self,
        state: &ConversationState,
    ) -> Result<(GeneratedReport, ConversationState)> {
        let generated = self.generate(state).await?;
        info!("interview {} complete", state.conversation_id());
        Ok((generated, state.completed()))
    }

    async fn generate(&self, state: &ConversationState) -> Result<GeneratedReport> {
        if state.messages().is_empty() {
            warn!(
                "generating a report for {} without any messages",
                state.conversation_id()
            );
        }

        let mut messages =
            vec![ModelMessage::System(build_report_prompt(state.messages()))];
        messages.extend(to_model_messages(state.messages()));
        self.gateway.generate_report(messages).await
    }
}

fn to_model_messages(
    messages: &[ConversationMessage],
) -> impl Iterator<Item = ModelMessage> + '_ {
    messages.iter().map(ConversationMessage::to_model_message)
}

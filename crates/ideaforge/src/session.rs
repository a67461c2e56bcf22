use std::sync::Arc;

use chrono::Utc;
use ideaforge_core::conversation::{ConversationState, truncate_title};
use ideaforge_core::export::{export_file_name, idea_json, idea_markdown};
use ideaforge_core::report::GeneratedReport;
use ideaforge_core::store::{
    Idea, IdeaId, IdeaRepository, IdeaStatus, IdeaUpdate, MemoryStore,
    MessageRepository, NewIdea,
};
use ideaforge_core::{
    Error, GatewayConfig, InterviewOrchestrator, ModelGateway, Result,
};
use ideaforge_model::ModelProvider;

type MakeGatewayFn = Box<dyn FnOnce(GatewayConfig) -> ModelGateway + Send>;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    make_gateway: MakeGatewayFn,
    gateway_config: GatewayConfig,
    ideas: Option<Arc<dyn IdeaRepository>>,
    messages: Option<Arc<dyn MessageRepository>>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(provider: M) -> Self {
        let make_gateway: MakeGatewayFn =
            Box::new(move |config| ModelGateway::with_config(provider, config));
        Self {
            make_gateway,
            gateway_config: GatewayConfig::default(),
            ideas: None,
            messages: None,
        }
    }

    /// Sets the retry settings for model calls.
    #[inline]
    pub fn with_gateway_config(mut self, config: GatewayConfig) -> Self {
        self.gateway_config = config;
        self
    }

    /// Uses the given store for ideas and messages.
    ///
    /// Without one, the session keeps everything in a fresh [`MemoryStore`].
    #[inline]
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: IdeaRepository + MessageRepository + 'static,
    {
        self.ideas = Some(store.clone());
        self.messages = Some(store);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let gateway = (self.make_gateway)(self.gateway_config);
        let (ideas, messages) = match (self.ideas, self.messages) {
            (Some(ideas), Some(messages)) => (ideas, messages),
            _ => {
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn IdeaRepository>,
                    store as Arc<dyn MessageRepository>,
                )
            }
        };
        Session {
            orchestrator: InterviewOrchestrator::new(gateway),
            ideas,
            messages,
        }
    }
}

/// The entry point for working with ideas: starts and resumes interviews
/// and gives access to the stored ideas.
#[derive(Clone)]
pub struct Session {
    orchestrator: InterviewOrchestrator,
    ideas: Arc<dyn IdeaRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl Session {
    /// Creates a draft idea and starts an empty interview for it.
    pub async fn start(&self, title: &str) -> Result<Interview> {
        let idea = self.ideas.create(NewIdea::draft(title)).await?;
        info!("started interview for idea {}", idea.id);
        Ok(Interview {
            state: ConversationState::new(idea.id),
            idea,
            session: self.clone(),
        })
    }

    /// Continues the interview of a stored idea.
    pub async fn resume(&self, idea_id: IdeaId) -> Result<Interview> {
        let Some(idea) = self.ideas.find_by_id(idea_id).await? else {
            return Err(Error::not_found("idea", idea_id));
        };
        let messages = self.messages.find_messages_by_conversation(idea_id).await?;
        debug!("resuming idea {idea_id} with {} messages", messages.len());
        Ok(Interview {
            state: ConversationState::from_messages(idea_id, messages),
            idea,
            session: self.clone(),
        })
    }

    /// Returns the idea repository.
    #[inline]
    pub fn ideas(&self) -> &Arc<dyn IdeaRepository> {
        &self.ideas
    }
}

/// An interview in progress, bound to one stored idea.
///
/// The new messages of a step are stored in one write before the in-memory
/// state moves on, so a failed step leaves both untouched and can simply be
/// retried.
pub struct Interview {
    session: Session,
    idea: Idea,
    state: ConversationState,
}

impl Interview {
    /// Returns the idea as last stored.
    #[inline]
    pub fn idea(&self) -> &Idea {
        &self.idea
    }

    /// Returns the current conversation state.
    #[inline]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Sends a user message and returns the assistant's reply.
    ///
    /// Blank input is ignored and yields `None`. The first message of an
    /// interview also becomes the idea's title.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let is_first = self.state.messages().is_empty();
        let (reply, next) = self
            .session
            .orchestrator
            .process_message(&self.state, text)
            .await?;

        let new_messages = &next.messages()[self.state.messages().len()..];
        self.session.messages.create_messages(new_messages).await?;
        self.state = next;

        // Best effort, the exchange is already stored.
        if is_first {
            let update = IdeaUpdate {
                title: Some(truncate_title(text)),
                ..Default::default()
            };
            if let Err(err) = self.update_idea(update).await {
                warn!("failed to set the title of idea {}: {err}", self.idea.id);
            }
        }

        Ok(Some(reply))
    }

    /// Generates the final report and stores it with the idea.
    ///
    /// An interview without any message has nothing to report on and yields
    /// `None` without calling the model.
    pub async fn end_interview(&mut self) -> Result<Option<GeneratedReport>> {
        if self.state.messages().is_empty() {
            debug!("nothing to report for idea {}", self.idea.id);
            return Ok(None);
        }

        let (generated, completed) =
            self.session.orchestrator.finish(&self.state).await?;

        self.update_idea(IdeaUpdate {
            status: Some(IdeaStatus::Refined),
            summary: Some(generated.report.pitch.one_liner.clone()),
            report_md: Some(generated.markdown.clone()),
            report_json: Some(Some(generated.report.clone())),
            ..Default::default()
        })
        .await?;

        self.state = completed;
        Ok(Some(generated))
    }

    /// Renders the idea as markdown, returning a file name and the content.
    pub fn export_markdown(&self) -> (String, String) {
        let name = export_file_name(&self.idea, "md", Utc::now().timestamp_millis());
        (name, idea_markdown(&self.idea))
    }

    /// Renders the idea as JSON, returning a file name and the content.
    pub fn export_json(&self) -> Result<(String, String)> {
        let name =
            export_file_name(&self.idea, "json", Utc::now().timestamp_millis());
        Ok((name, idea_json(&self.idea)?))
    }

    async fn update_idea(&mut self, update: IdeaUpdate) -> Result<()> {
        self.idea = self.session.ideas.update(self.idea.id, update).await?;
        Ok(())
    }
}

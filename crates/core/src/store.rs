//! Persistence of ideas and their interview messages.
//!
//! The traits are what the session layer depends on; [`MemoryStore`] is
//! the bundled implementation. Stores are explicit handles passed to
//! whoever needs them, there is no global database.

mod memory;

use std::fmt::{self, Display};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use self::memory::MemoryStore;
use crate::conversation::{ConversationId, ConversationMessage};
use crate::error::{Error, Result};
use crate::report::StructuredReport;

/// Identifies an idea. An idea's interview uses the same identifier as its
/// conversation.
pub type IdeaId = ConversationId;

/// How far an idea has progressed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    /// Still being discussed.
    #[default]
    Draft,
    /// A report has been generated.
    Refined,
    /// Put aside by the user.
    Archived,
}

impl Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdeaStatus::Draft => "draft",
            IdeaStatus::Refined => "refined",
            IdeaStatus::Archived => "archived",
        })
    }
}

/// A stored idea.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Identifier, also the identifier of the idea's conversation.
    pub id: IdeaId,
    /// Display title.
    pub title: String,
    /// When the idea was created.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the idea was last changed.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Lifecycle status.
    pub status: IdeaStatus,
    /// Short summary, the report's one-liner once refined.
    pub summary: String,
    /// Rendered report, empty until refined.
    pub report_md: String,
    /// The validated report, if any.
    pub report_json: Option<StructuredReport>,
    /// Last sync time. Nothing sets this yet.
    #[serde(with = "timestamp::option")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl Idea {
    /// Decodes a stored idea, rejecting anything that does not have the
    /// exact idea shape (including a malformed report).
    pub fn from_json(json: &str) -> Result<Self> {
        let idea: Self = serde_json::from_str(json)
            .map_err(|err| Error::ReportValidation(err.to_string()))?;
        check_title(&idea.title)?;
        Ok(idea)
    }

    /// Encodes the idea for storage.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|err| Error::ReportValidation(err.to_string()))
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.summary.to_lowercase().contains(needle)
    }
}

fn check_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(Error::ReportValidation("idea title is empty".to_owned()));
    }
    Ok(())
}

/// Timestamps are written as RFC 3339 with exactly three fractional digits.
mod timestamp {
    use chrono::SecondsFormat;

    use super::*;

    pub fn serialize<S: Serializer>(
        time: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            time: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

/// The fields of an idea that is about to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewIdea {
    /// Display title.
    pub title: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Initial status.
    pub status: IdeaStatus,
    /// Short summary.
    pub summary: String,
}

impl NewIdea {
    /// Creates a draft with only a title.
    #[inline]
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A partial update of an idea. `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdeaUpdate {
    /// New title.
    pub title: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
    /// New status.
    pub status: Option<IdeaStatus>,
    /// New summary.
    pub summary: Option<String>,
    /// New rendered report.
    pub report_md: Option<String>,
    /// New report; `Some(None)` clears it.
    pub report_json: Option<Option<StructuredReport>>,
    /// New sync time; `Some(None)` clears it.
    pub synced_at: Option<Option<DateTime<Utc>>>,
}

impl IdeaUpdate {
    fn apply(self, idea: &mut Idea) {
        if let Some(title) = self.title {
            idea.title = title;
        }
        if let Some(tags) = self.tags {
            idea.tags = tags;
        }
        if let Some(status) = self.status {
            idea.status = status;
        }
        if let Some(summary) = self.summary {
            idea.summary = summary;
        }
        if let Some(report_md) = self.report_md {
            idea.report_md = report_md;
        }
        if let Some(report_json) = self.report_json {
            idea.report_json = report_json;
        }
        if let Some(synced_at) = self.synced_at {
            idea.synced_at = synced_at;
        }
    }
}

/// Storage of ideas.
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Stores a new idea and returns it with its identifier and timestamps.
    async fn create(&self, idea: NewIdea) -> Result<Idea>;

    /// Returns all ideas, newest first.
    async fn find_all(&self) -> Result<Vec<Idea>>;

    /// Returns the idea with the given identifier, if any.
    async fn find_by_id(&self, id: IdeaId) -> Result<Option<Idea>>;

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// Fails with [`Error::NotFound`] if there is no such idea.
    async fn update(&self, id: IdeaId, update: IdeaUpdate) -> Result<Idea>;

    /// Deletes an idea together with its messages.
    ///
    /// Fails with [`Error::NotFound`] if there is no such idea.
    async fn delete(&self, id: IdeaId) -> Result<()>;

    /// Returns the ideas whose title or summary contains `query`, ignoring
    /// case, newest first.
    async fn search(&self, query: &str) -> Result<Vec<Idea>>;
}

/// Storage of interview messages.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Stores a message.
    async fn create_message(&self, message: &ConversationMessage) -> Result<()>;

    /// Stores several messages at once: either all of them or, on error,
    /// none.
    async fn create_messages(&self, messages: &[ConversationMessage]) -> Result<()>;

    /// Returns the messages of a conversation, oldest first.
    async fn find_messages_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationMessage>>;

    /// Deletes every message of a conversation.
    async fn delete_messages_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<()>;
}

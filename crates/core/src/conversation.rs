//! Conversation-related types.

use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use ideaforge_model::ModelMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TITLE_MAX_CHARS: usize = 50;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id! {
    /// Identifies a conversation. A conversation belongs to exactly one
    /// idea and shares its identifier.
    ConversationId
}

define_id! {
    /// Identifies a single message.
    MessageId
}

/// The author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person refining the idea.
    User,
    /// The model.
    Assistant,
    /// Instructions injected by the application.
    System,
}

impl Role {
    /// Returns the wire name of the role.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation. Messages never change once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    id: MessageId,
    conversation_id: ConversationId,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Creates a message with a fresh identifier.
    #[inline]
    pub fn new(
        conversation_id: ConversationId,
        role: Role,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Returns the message identifier.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the conversation this belongs to.
    #[inline]
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the author of the message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the message text.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was created.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Converts the message into the provider protocol form.
    #[inline]
    pub fn to_model_message(&self) -> ModelMessage {
        let content = self.content.clone();
        match self.role {
            Role::User => ModelMessage::User(content),
            Role::Assistant => ModelMessage::Assistant(content),
            Role::System => ModelMessage::System(content),
        }
    }
}

/// Where an interview is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterviewPhase {
    /// Still exchanging messages.
    Active,
    /// A report has been generated. Terminal.
    Complete,
}

/// A snapshot of a conversation.
///
/// The state is a value: every update returns a new snapshot and leaves
/// the old one untouched, so callers can keep the previous snapshot around
/// and retry from it after a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    conversation_id: ConversationId,
    messages: Vec<ConversationMessage>,
    is_complete: bool,
}

impl ConversationState {
    /// Creates an empty, active conversation.
    #[inline]
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
            is_complete: false,
        }
    }

    /// Rebuilds an active conversation from persisted messages, restoring
    /// chronological order.
    pub fn from_messages(
        conversation_id: ConversationId,
        mut messages: Vec<ConversationMessage>,
    ) -> Self {
        messages.sort_by_key(|msg| msg.timestamp);
        Self {
            conversation_id,
            messages,
            is_complete: false,
        }
    }

    /// Returns the conversation this belongs to.
    #[inline]
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Returns whether a report has been generated.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Returns the lifecycle phase.
    #[inline]
    pub fn phase(&self) -> InterviewPhase {
        if self.is_complete {
            InterviewPhase::Complete
        } else {
            InterviewPhase::Active
        }
    }

    /// Returns at most `count` of the most recent messages.
    #[inline]
    pub fn recent_messages(&self, count: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// Returns a new state with one more message at the end.
    ///
    /// The new message is stamped strictly after the previous one, even if
    /// the system clock did not move in between.
    pub fn appended(&self, role: Role, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp >= now => {
                last.timestamp + TimeDelta::microseconds(1)
            }
            _ => now,
        };
        let mut next = self.clone();
        next.messages.push(ConversationMessage::new(
            self.conversation_id,
            role,
            content,
            timestamp,
        ));
        next
    }

    /// Returns a new state marked as complete.
    #[inline]
    pub fn completed(&self) -> Self {
        Self {
            is_complete: true,
            ..self.clone()
        }
    }

    /// Derives the idea title from the first user message.
    pub fn title(&self) -> Option<String> {
        let first = self
            .messages
            .iter()
            .find(|msg| msg.role == Role::User)?
            .content
            .trim();
        if first.is_empty() {
            return None;
        }
        Some(truncate_title(first))
    }
}

/// Shortens a text to a title: at most 50 characters, with `...` appended
/// when something was cut.
pub fn truncate_title(text: &str) -> String {
    if text.chars().count() <= TITLE_MAX_CHARS {
        return text.to_owned();
    }
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

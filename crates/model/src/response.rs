use serde::{Deserialize, Serialize};

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model has finished generating text.
    Stop,
    /// The output was cut off by the token limit.
    Length,
    /// The output was withheld by the provider's content filter.
    ContentFilter,
}

/// A complete response from the model provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The assistant message body. Providers may return no content at all,
    /// and it's up to the caller to decide whether that is an error.
    pub content: Option<String>,
    /// The reason the model finished generating, if reported.
    pub finish_reason: Option<ModelFinishReason>,
}

impl ModelResponse {
    /// Creates a response with the given content that finished normally.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some(ModelFinishReason::Stop),
        }
    }

    /// Returns the content if it is present and not blank.
    #[inline]
    pub fn non_empty_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

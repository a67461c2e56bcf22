//! Error taxonomy of the interview pipeline.

/// A specialized `Result` type for the interview pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a user utterance and a validated
/// report.
///
/// Variants are coarse on purpose: callers pick the user-facing message
/// with [`Error::user_hint`] and decide about retrying with
/// [`Error::is_transient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No provider credential is configured. Never retried.
    #[error(
        "model provider API key is not configured, set OPENAI_API_KEY and try again"
    )]
    Configuration,

    /// The provider is rate limiting us.
    #[error("rate limit exceeded, please try again later")]
    RateLimited,

    /// The provider rejected the configured credential.
    #[error("invalid API key, please check your configuration")]
    InvalidCredential,

    /// The provider answered without a message body.
    #[error("empty response from the model provider")]
    EmptyResponse,

    /// Any other provider failure, with the provider's message verbatim.
    #[error("{0}")]
    Provider(String),

    /// The model output is not recoverable JSON.
    #[error("invalid JSON response from the model: {0}")]
    ReportParse(String),

    /// The model output is JSON but not a valid report.
    #[error("report does not match the expected shape: {0}")]
    ReportValidation(String),

    /// A record addressed by identifier does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// The kind of record, e.g. `idea`.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The interview has already produced its report.
    #[error("the interview is already complete")]
    InterviewComplete,
}

impl Error {
    /// Creates a [`Error::NotFound`] error.
    #[inline]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns whether the failure came from the provider round trip and
    /// may go away by retrying the same call.
    ///
    /// An invalid credential is included: it is retried like any other
    /// provider failure, even though retrying rarely helps.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::RateLimited
                | Error::InvalidCredential
                | Error::EmptyResponse
                | Error::Provider(_)
        )
    }

    /// Returns a short suggestion to show next to the error message.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Error::Configuration | Error::InvalidCredential => {
                "Check the API key configuration."
            }
            Error::RateLimited | Error::EmptyResponse | Error::Provider(_) => {
                "Please try again later."
            }
            Error::ReportParse(_) | Error::ReportValidation(_) => {
                "Please try generating the report again."
            }
            Error::NotFound { .. } => "The record may have been deleted.",
            Error::InterviewComplete => {
                "Start a new interview to keep refining the idea."
            }
        }
    }
}

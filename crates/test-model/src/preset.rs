use ideaforge_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// The failure injected before a preset response succeeds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetFailure {
    /// The provider fails with the given message and `ErrorKind::Other`.
    #[serde(rename = "error")]
    Error(String),
    /// The provider reports a rate limit.
    #[serde(rename = "rate_limited")]
    RateLimited,
    /// The provider rejects the credential.
    #[serde(rename = "invalid_credential")]
    InvalidCredential,
    /// The provider succeeds but returns no message body.
    #[serde(rename = "empty")]
    Empty,
}

impl PresetFailure {
    #[inline]
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            PresetFailure::RateLimited => ErrorKind::RateLimitExceeded,
            PresetFailure::InvalidCredential => ErrorKind::InvalidCredential,
            PresetFailure::Error(_) | PresetFailure::Empty => ErrorKind::Other,
        }
    }

    #[inline]
    pub(crate) fn message(&self) -> &str {
        match self {
            PresetFailure::Error(message) => message,
            PresetFailure::RateLimited => "Rate limit reached for requests",
            PresetFailure::InvalidCredential => "Incorrect API key provided",
            PresetFailure::Empty => "",
        }
    }
}

/// The preset response for one logical request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Content of the response once it succeeds.
    pub content: String,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
    /// How the failing attempts fail.
    pub failure: PresetFailure,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified content.
    #[inline]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            failures: None,
            failure: PresetFailure::Error("connection reset".to_owned()),
        }
    }

    /// Creates a `PresetResponse` that never succeeds.
    #[inline]
    pub fn always_failing(failure: PresetFailure) -> Self {
        Self::with_content("").with_failures(0).with_failure(failure)
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Sets how the failing attempts fail.
    #[inline]
    pub fn with_failure(mut self, failure: PresetFailure) -> Self {
        self.failure = failure;
        self
    }
}

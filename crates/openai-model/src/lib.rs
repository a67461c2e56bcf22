//! A model provider for OpenAI-compatible chat-completion APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use ideaforge_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use mime::Mime;
use reqwest::{Client, StatusCode, header};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use proto::{ChatCompletion, ErrorBody};

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    #[inline]
    fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let mut builder = self
            .client
            .post(format!("{}{}", self.config.base_url, "/chat/completions"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(&openai_req);
        if let Some(api_key) = &self.config.api_key {
            builder =
                builder.header(header::AUTHORIZATION, format!("Bearer {api_key}"));
        }
        let resp_fut = builder.send();

        async move {
            let resp = resp_fut
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                debug!("request failed with {status}: {body}");
                return Err(error_from_status(status, &body));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype() == mime::JSON)
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            let completion = resp
                .json::<ChatCompletion>()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            trace!("got completion: {}", completion.id);
            Ok(proto::into_model_response(completion))
        }
    }
}

/// Maps a failed HTTP exchange to an [`Error`], keeping the provider's own
/// message when the body carries one.
fn error_from_status(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let code = detail.as_ref().and_then(|d| d.code.as_deref());
    let ty = detail.as_ref().and_then(|d| d.r#type.as_deref());

    let kind = match (status, code, ty) {
        (StatusCode::TOO_MANY_REQUESTS, _, _)
        | (_, Some("rate_limit_exceeded"), _)
        | (_, _, Some("rate_limit_error")) => ErrorKind::RateLimitExceeded,
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _, _)
        | (_, Some("invalid_api_key"), _) => ErrorKind::InvalidCredential,
        _ => ErrorKind::Other,
    };
    let message = match detail {
        Some(detail) => detail.message,
        None => format!("{status}: {body}"),
    };
    Error::new(message, kind)
}

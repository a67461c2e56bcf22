//! Access to the model provider with retries and error classification.

mod backoff;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use ::backoff::future::retry_notify;
use ideaforge_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ResponseFormat,
};
use tracing::Instrument;

pub use self::backoff::LinearBackoff;
use crate::error::{Error, Result};
use crate::report::{GeneratedReport, extract_report, report_schema};

const CHAT_TEMPERATURE: f32 = 0.7;
const REPORT_TEMPERATURE: f32 = 0.3;

const REPORT_INSTRUCTION: &str = "You are a product strategist. Generate a structured report in JSON format matching the IdeaReport schema. Also provide a markdown version of the report.";
const REPORT_REQUEST: &str = "Generate the final report in JSON format. The JSON must match the IdeaReport schema exactly. Also provide a markdown version.";

type SendRequestResult = std::result::Result<ModelResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// Retry settings of a [`ModelGateway`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    max_retries: u32,
    retry_delay: Duration,
}

impl Default for GatewayConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl GatewayConfig {
    /// Sets how many times a failed call is retried.
    #[inline]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay; the nth retry waits `retry_delay × n`.
    #[inline]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Returns how many times a failed call is retried.
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the base retry delay.
    #[inline]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    fn retry_policy(&self) -> LinearBackoff {
        LinearBackoff::new(self.retry_delay, self.max_retries)
    }
}

/// A type-erased handle to a model provider.
///
/// Every call checks for a credential first, then runs the provider round
/// trip under a [`LinearBackoff`] retry policy. Provider failures are
/// classified into [`Error::RateLimited`], [`Error::InvalidCredential`]
/// and [`Error::Provider`]; all of them, as well as empty bodies, are
/// retried until the budget runs out, after which the last error is
/// returned.
#[derive(Clone)]
pub struct ModelGateway {
    handler_fn: HandlerFn,
    has_credential: bool,
    config: GatewayConfig,
}

impl ModelGateway {
    /// Creates a gateway with the default retry settings.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        Self::with_config(provider, GatewayConfig::default())
    }

    /// Creates a gateway with the given retry settings.
    pub fn with_config<P: ModelProvider + 'static>(
        provider: P,
        config: GatewayConfig,
    ) -> Self {
        let has_credential = provider.has_credential();
        // Erase `P` so that the orchestrator does not need a type parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {req:?}");
                    match fut.await {
                        Ok(resp) => Ok(resp),
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ModelProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model gateway req")),
            )
        });
        Self {
            handler_fn,
            has_credential,
            config,
        }
    }

    /// Returns the retry settings.
    #[inline]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends a chat turn and returns the assistant's text.
    pub async fn chat(&self, messages: Vec<ModelMessage>) -> Result<String> {
        self.ensure_credential()?;

        let req = ModelRequest::with_messages(messages)
            .with_temperature(CHAT_TEMPERATURE);
        let req = &req;
        retry_notify(
            self.config.retry_policy(),
            || self.attempt(req),
            log_retry,
        )
        .await
    }

    /// Asks for the final report and returns it validated and rendered.
    ///
    /// Output that cannot be parsed or validated fails immediately, only
    /// the provider round trip itself is retried.
    pub async fn generate_report(
        &self,
        history: Vec<ModelMessage>,
    ) -> Result<GeneratedReport> {
        self.ensure_credential()?;

        let mut messages = history;
        messages.push(ModelMessage::System(format!(
            "{REPORT_INSTRUCTION}\n\nIdeaReport JSON Schema:\n{}",
            report_schema()
        )));
        messages.push(ModelMessage::User(REPORT_REQUEST.to_owned()));

        let req = ModelRequest::with_messages(messages)
            .with_response_format(ResponseFormat::JsonObject)
            .with_temperature(REPORT_TEMPERATURE);
        let req = &req;
        let report = retry_notify(
            self.config.retry_policy(),
            || async move {
                let raw = self.attempt(req).await?;
                extract_report(&raw).map_err(::backoff::Error::permanent)
            },
            log_retry,
        )
        .await?;

        debug!("report generated: {}", report.pitch.title);
        Ok(GeneratedReport::new(report))
    }

    fn ensure_credential(&self) -> Result<()> {
        if self.has_credential {
            Ok(())
        } else {
            error!("no provider credential configured");
            Err(Error::Configuration)
        }
    }

    /// Makes one provider round trip.
    async fn attempt(
        &self,
        req: &ModelRequest,
    ) -> std::result::Result<String, ::backoff::Error<Error>> {
        let resp = (self.handler_fn)(req.clone())
            .await
            .map_err(|err| ::backoff::Error::transient(classify(err.as_ref())))?;
        resp.non_empty_content()
            .map(str::to_owned)
            .ok_or(::backoff::Error::transient(Error::EmptyResponse))
    }
}

fn log_retry(err: Error, delay: Duration) {
    warn!("model request failed, retrying in {delay:?}: {err}");
}

/// Maps a provider failure onto the error taxonomy.
fn classify(err: &dyn ModelProviderError) -> Error {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    match err.kind() {
        ErrorKind::RateLimitExceeded => Error::RateLimited,
        ErrorKind::InvalidCredential => Error::InvalidCredential,
        ErrorKind::Other if lowered.contains("rate limit") => Error::RateLimited,
        ErrorKind::Other if lowered.contains("api key") => {
            Error::InvalidCredential
        }
        ErrorKind::Other => Error::Provider(message),
    }
}

//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ideaforge_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse,
};
use tokio::time::{Instant, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
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

/// A request received by [`TestModelProvider`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// The request as it was sent.
    pub request: ModelRequest,
    /// When the attempt was made, on the tokio clock.
    pub at: Instant,
}

#[derive(Default)]
struct ScriptState {
    step: usize,
    failed_attempts: u64,
    log: Vec<RecordedRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each logical request. Steps are consumed in
/// order; a step only advances once it has produced a successful response,
/// so injected failures are replayed on every retry of the same request.
/// If there are no enough steps in the script, an error will be returned.
///
/// Clones share the script position and the request log, so a test can
/// keep a clone around to inspect what the code under test sent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<PresetResponse>,
    delay: Option<Duration>,
    credential_missing: bool,
    state: Arc<Mutex<ScriptState>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response_step(&mut self, preset: PresetResponse) {
        self.script.push(preset);
    }

    #[inline]
    pub fn add_content_step(&mut self, content: impl Into<String>) {
        self.add_response_step(PresetResponse::with_content(content));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Makes the provider report that no credential is configured.
    #[inline]
    pub fn set_credential_missing(&mut self) {
        self.credential_missing = true;
    }

    /// Returns every attempt made so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock_state().log.clone()
    }

    /// Returns the number of attempts made so far.
    pub fn attempt_count(&self) -> usize {
        self.lock_state().log.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_result(&self, req: &ModelRequest) -> Result<ModelResponse, Error> {
        let mut state = self.lock_state();
        state.log.push(RecordedRequest {
            request: req.clone(),
            at: Instant::now(),
        });

        let Some(preset) = self.script.get(state.step) else {
            return Err(Error {
                message: "no enough steps".to_owned(),
                kind: ErrorKind::Other,
            });
        };

        let should_fail = match preset.failures {
            None => false,
            Some(0) => true,
            Some(failures) => state.failed_attempts < failures,
        };
        if should_fail {
            state.failed_attempts += 1;
            return match &preset.failure {
                PresetFailure::Empty => Ok(ModelResponse {
                    content: None,
                    finish_reason: Some(ModelFinishReason::Stop),
                }),
                failure => Err(Error {
                    message: failure.message().to_owned(),
                    kind: failure.kind(),
                }),
            };
        }

        state.step += 1;
        state.failed_attempts = 0;
        Ok(ModelResponse::with_content(preset.content.clone()))
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    #[inline]
    fn has_credential(&self) -> bool {
        !self.credential_missing
    }

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let result = self.next_result(req);
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }
}

use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::response::ModelResponse;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which is an entry for sending
/// chat-completion requests.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Returns whether a credential has been configured for this provider.
    ///
    /// Callers use this to detect a missing credential before attempting
    /// any network call. Providers that need no credential can rely on the
    /// default implementation.
    fn has_credential(&self) -> bool {
        true
    }

    /// Sends a request to the model.
    ///
    /// The returned future must be fully independent of `self`, so that it
    /// can be awaited (and re-created for retries) by the caller freely.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static;
}

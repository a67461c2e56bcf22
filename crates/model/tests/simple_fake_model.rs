use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::time::Duration;

use ideaforge_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ResponseFormat,
};
use tokio::time::sleep;

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message back, or wraps it in a JSON object when
/// structured output is requested.
struct EchoModelProvider;

impl ModelProvider for EchoModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let Some(last_user) =
                req.messages.iter().rev().find_map(|msg| match msg {
                    ModelMessage::User(text) => Some(text.clone()),
                    _ => None,
                })
            else {
                break 'blk Err(FakeModelProviderError(ErrorKind::Other));
            };

            let content = match req.response_format {
                ResponseFormat::Text => format!("You said {last_user}"),
                ResponseFormat::JsonObject => {
                    format!(r#"{{"echo":"{last_user}"}}"#)
                }
            };
            Ok(ModelResponse::with_content(content))
        };
        async move {
            sleep(Duration::from_millis(1)).await;
            result
        }
    }
}

struct LockedModelProvider;

impl ModelProvider for LockedModelProvider {
    type Error = FakeModelProviderError;

    fn has_credential(&self) -> bool {
        false
    }

    fn send_request(
        &self,
        _req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        ready(Err(FakeModelProviderError(ErrorKind::InvalidCredential)))
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = EchoModelProvider;
        let req = ModelRequest::with_messages([
            ModelMessage::System("Be brief.".to_string()),
            ModelMessage::User("Good morning".to_string()),
        ]);
        assert!(provider.has_credential());
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("You said Good morning"));
        assert_eq!(resp.finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_json_mode() {
        let provider = EchoModelProvider;
        let req = ModelRequest::with_messages([ModelMessage::User(
            "hi".to_string(),
        )])
        .with_response_format(ResponseFormat::JsonObject)
        .with_temperature(0.3);
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.non_empty_content(), Some(r#"{"echo":"hi"}"#));
    }

    #[tokio::test]
    async fn test_error() {
        let provider = EchoModelProvider;
        let req = ModelRequest::with_messages(vec![]);
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let provider = LockedModelProvider;
        assert!(!provider.has_credential());
        let req = ModelRequest::with_messages([ModelMessage::User(
            "hi".to_string(),
        )]);
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn test_blank_content_is_empty() {
        assert_eq!(ModelResponse::default().non_empty_content(), None);
        assert_eq!(
            ModelResponse::with_content("  \n").non_empty_content(),
            None
        );
    }
}

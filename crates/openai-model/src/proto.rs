use ideaforge_model::{
    ModelFinishReason, ModelMessage, ModelRequest, ModelResponse,
    ResponseFormat,
};
use serde::{Deserialize, Serialize};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: Option<String>,
    pub code: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct ResponseFormatSpec {
    r#type: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        temperature: req.temperature,
        response_format: match req.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(ResponseFormatSpec {
                r#type: "json_object",
            }),
        },
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(content) => Message::Assistant {
            content: content.clone(),
        },
    }
}

/// Takes the first choice of a completion. A completion without choices
/// is mapped to a response without content.
pub fn into_model_response(completion: ChatCompletion) -> ModelResponse {
    let Some(choice) = completion.choices.into_iter().next() else {
        return ModelResponse::default();
    };
    let finish_reason =
        choice.finish_reason.as_deref().map(|reason| match reason {
            "length" => ModelFinishReason::Length,
            "content_filter" => ModelFinishReason::ContentFilter,
            _ => ModelFinishReason::Stop,
        });
    ModelResponse {
        content: choice.message.content,
        finish_reason,
    }
}

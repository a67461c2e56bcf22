/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    /// The input messages, in chronological order.
    pub messages: Vec<ModelMessage>,
    /// The format the response body must be in.
    pub response_format: ResponseFormat,
    /// Sampling temperature, `None` leaves it to the provider.
    pub temperature: Option<f32>,
}

impl ModelRequest {
    /// Creates a plain-text request with the given messages.
    #[inline]
    pub fn with_messages(messages: impl Into<Vec<ModelMessage>>) -> Self {
        Self {
            messages: messages.into(),
            response_format: ResponseFormat::Text,
            temperature: None,
        }
    }

    /// Sets the response format.
    #[inline]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Sets the sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
}

impl ModelMessage {
    /// Returns the text content of the message.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            ModelMessage::System(content)
            | ModelMessage::User(content)
            | ModelMessage::Assistant(content) => content,
        }
    }
}

/// Constrains the shape of the response body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object (provider-level structured output mode).
    JsonObject,
}

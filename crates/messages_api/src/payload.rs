use serde::{Deserialize, Serialize};

/// One replayed conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

/// Canonical request body for the messages endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<RequestMessage>,
}

impl MessagesRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32, system: Option<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: system.filter(|value| !value.trim().is_empty()),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(RequestMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

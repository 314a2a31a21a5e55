//! Minimal provider-agnostic contract for executing a single chat request.
//!
//! This crate defines only the request lifecycle shared between the chat
//! core and concrete transports. It excludes HTTP details, wire payload
//! quirks, and any knowledge of how responses are turned into file edits.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

use serde::{Deserialize, Serialize};

/// Identifier for one provider request.
pub type RequestId = u64;

/// Shared cancellation flag for a request.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Speaker of a model-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Provider-neutral model-facing message history item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Fully composed request body: model selection, system prompt and replayed history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Input required to start a provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub request_id: RequestId,
    pub payload: ChatPayload,
}

/// Reason a request ended without a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// No credentials are configured for the transport.
    ConfigMissing,
    /// The transport returned a non-success status or could not connect.
    Transport { code: Option<u16>, message: String },
    /// The response body could not be decoded or carried no text.
    MalformedResponse { message: String },
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMissing => f.write_str("API key is not configured"),
            Self::Transport {
                code: Some(code),
                message,
            } => write!(f, "transport error {code}: {message}"),
            Self::Transport {
                code: None,
                message,
            } => write!(f, "transport error: {message}"),
            Self::MalformedResponse { message } => write!(f, "malformed response: {message}"),
        }
    }
}

/// Provider-emitted lifecycle event for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Started {
        request_id: RequestId,
    },
    Completed {
        request_id: RequestId,
        text: String,
    },
    Failed {
        request_id: RequestId,
        failure: ProviderFailure,
    },
    Cancelled {
        request_id: RequestId,
    },
}

impl ProviderEvent {
    /// Returns the request identifier associated with this event.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Started { request_id }
            | Self::Completed { request_id, .. }
            | Self::Failed { request_id, .. }
            | Self::Cancelled { request_id } => *request_id,
        }
    }

    /// Returns true when this event terminates the request lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// Immutable metadata describing a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one chat request.
pub trait ChatProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Reports whether the provider can issue requests at all.
    ///
    /// Transports that need credentials return [`ProviderFailure::ConfigMissing`]
    /// when none are configured.
    fn check_ready(&self) -> Result<(), ProviderFailure> {
        Ok(())
    }

    /// Executes a request and emits lifecycle events in provider order.
    ///
    /// Implementations emit exactly one terminal event and poll `cancel`
    /// while waiting on the transport.
    fn send(
        &self,
        req: ChatRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(ProviderEvent),
    ) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::{
        CancelSignal, ChatMessage, ChatPayload, ChatProvider, ChatRequest, ChatRole,
        ProviderEvent, ProviderFailure, ProviderInitError, ProviderProfile,
    };

    struct MinimalProvider;

    impl ChatProvider for MinimalProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "minimal".to_string(),
                model_id: "minimal-model".to_string(),
            }
        }

        fn send(
            &self,
            req: ChatRequest,
            _cancel: CancelSignal,
            emit: &mut dyn FnMut(ProviderEvent),
        ) -> Result<(), String> {
            emit(ProviderEvent::Started {
                request_id: req.request_id,
            });
            emit(ProviderEvent::Completed {
                request_id: req.request_id,
                text: "ok".to_string(),
            });
            Ok(())
        }
    }

    #[test]
    fn provider_event_request_id_returns_event_request_id() {
        let request_id = 42;
        let events = [
            ProviderEvent::Started { request_id },
            ProviderEvent::Completed {
                request_id,
                text: "partial".to_string(),
            },
            ProviderEvent::Failed {
                request_id,
                failure: ProviderFailure::ConfigMissing,
            },
            ProviderEvent::Cancelled { request_id },
        ];

        for event in events {
            assert_eq!(event.request_id(), request_id);
        }
    }

    #[test]
    fn provider_event_terminal_detection_matches_lifecycle() {
        assert!(!ProviderEvent::Started { request_id: 1 }.is_terminal());
        assert!(ProviderEvent::Completed {
            request_id: 1,
            text: "hello".to_string(),
        }
        .is_terminal());
        assert!(ProviderEvent::Failed {
            request_id: 1,
            failure: ProviderFailure::MalformedResponse {
                message: "boom".to_string(),
            },
        }
        .is_terminal());
        assert!(ProviderEvent::Cancelled { request_id: 1 }.is_terminal());
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing key");
        assert_eq!(error.message(), "missing key");
        assert_eq!(error.to_string(), "missing key");
    }

    #[test]
    fn default_readiness_check_reports_ready() {
        assert_eq!(MinimalProvider.check_ready(), Ok(()));
    }

    #[test]
    fn failure_display_includes_transport_code_when_known() {
        let with_code = ProviderFailure::Transport {
            code: Some(529),
            message: "overloaded".to_string(),
        };
        let without_code = ProviderFailure::Transport {
            code: None,
            message: "connection refused".to_string(),
        };

        assert_eq!(with_code.to_string(), "transport error 529: overloaded");
        assert_eq!(
            without_code.to_string(),
            "transport error: connection refused"
        );
    }

    #[test]
    fn payload_serializes_roles_in_lowercase_wire_form() {
        let payload = ChatPayload {
            model: "model".to_string(),
            max_tokens: 16,
            system: "sys".to_string(),
            messages: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
        };

        let value = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][1]["role"], "assistant");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}

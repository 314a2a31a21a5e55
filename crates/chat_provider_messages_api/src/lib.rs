//! Messages API-backed implementation of the shared `chat_provider` contract.
//!
//! This adapter turns one composed [`ChatPayload`](chat_provider::ChatPayload)
//! into a single blocking request/response exchange and reports the outcome as
//! a terminal [`ProviderEvent`].

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ChatProvider, ChatRequest, ProviderEvent, ProviderFailure, ProviderInitError,
    ProviderProfile,
};
use messages_api::{MessagesApiClient, MessagesApiConfig, MessagesApiError, MessagesRequest};

/// Stable provider identifier used by startup selection.
pub const MESSAGES_API_PROVIDER_ID: &str = "messages-api";

/// Runtime configuration for the messages provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesApiProviderConfig {
    pub api_key: String,
    pub model_id: String,
    pub api_url: Option<String>,
    pub api_version: Option<String>,
    pub timeout: Option<Duration>,
}

impl MessagesApiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_id: model_id.into(),
            api_url: None,
            api_version: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_messages_api_config(self) -> MessagesApiConfig {
        let mut config = MessagesApiConfig::new(self.api_key)
            .with_user_agent(concat!("scene-composer/", env!("CARGO_PKG_VERSION")));

        if let Some(api_url) = self.api_url {
            config = config.with_api_url(api_url);
        }

        if let Some(api_version) = self.api_version {
            config = config.with_api_version(api_version);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait SendClient: Send + Sync {
    fn send(
        &self,
        request: &MessagesRequest,
        cancel: &CancelSignal,
    ) -> Result<String, MessagesApiError>;
}

#[derive(Debug)]
struct DefaultSendClient {
    client: MessagesApiClient,
}

impl SendClient for DefaultSendClient {
    fn send(
        &self,
        request: &MessagesRequest,
        cancel: &CancelSignal,
    ) -> Result<String, MessagesApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                MessagesApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.send(request, Some(cancel)))
    }
}

/// `ChatProvider` adapter backed by `messages_api` transport primitives.
pub struct MessagesApiProvider {
    model_id: String,
    has_api_key: bool,
    send_client: Arc<dyn SendClient>,
}

impl MessagesApiProvider {
    /// Creates a provider using the real HTTP transport.
    ///
    /// A blank API key is accepted here; requests then fail with
    /// [`ProviderFailure::ConfigMissing`] so the host can report it per submit.
    pub fn new(config: MessagesApiProviderConfig) -> Result<Self, ProviderInitError> {
        let model_id = config.model_id.trim().to_string();
        let api_config = config.into_messages_api_config();
        let has_api_key = api_config.has_api_key();
        let send_client = Arc::new(DefaultSendClient {
            client: MessagesApiClient::new(api_config).map_err(map_init_error)?,
        });

        Ok(Self {
            model_id,
            has_api_key,
            send_client,
        })
    }

    #[cfg(test)]
    fn with_send_client_for_tests(
        model_id: &str,
        has_api_key: bool,
        send_client: Arc<dyn SendClient>,
    ) -> Self {
        Self {
            model_id: model_id.to_string(),
            has_api_key,
            send_client,
        }
    }
}

impl ChatProvider for MessagesApiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MESSAGES_API_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn check_ready(&self) -> Result<(), ProviderFailure> {
        if self.has_api_key {
            Ok(())
        } else {
            Err(ProviderFailure::ConfigMissing)
        }
    }

    fn send(
        &self,
        req: ChatRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(ProviderEvent),
    ) -> Result<(), String> {
        let request_id = req.request_id;

        emit(ProviderEvent::Started { request_id });

        if cancel.load(Ordering::Acquire) {
            emit(ProviderEvent::Cancelled { request_id });
            return Ok(());
        }

        if let Err(failure) = self.check_ready() {
            emit(ProviderEvent::Failed {
                request_id,
                failure,
            });
            return Ok(());
        }

        let payload = req.payload;
        let request = payload.messages.into_iter().fold(
            MessagesRequest::new(payload.model, payload.max_tokens, Some(payload.system)),
            |request, message| request.with_message(message.role.as_str(), message.content),
        );

        tracing::debug!(
            request_id,
            messages = request.messages.len(),
            "sending messages request"
        );

        match self.send_client.send(&request, &cancel) {
            Ok(text) => emit(ProviderEvent::Completed { request_id, text }),
            Err(MessagesApiError::Cancelled) => emit(ProviderEvent::Cancelled { request_id }),
            Err(error) => {
                tracing::warn!(request_id, %error, "messages request failed");
                emit(ProviderEvent::Failed {
                    request_id,
                    failure: map_failure(error),
                });
            }
        }

        Ok(())
    }
}

fn map_failure(error: MessagesApiError) -> ProviderFailure {
    match error {
        MessagesApiError::MissingApiKey => ProviderFailure::ConfigMissing,
        MessagesApiError::MalformedResponse(message) => {
            ProviderFailure::MalformedResponse { message }
        }
        MessagesApiError::Serde(error) => ProviderFailure::MalformedResponse {
            message: error.to_string(),
        },
        MessagesApiError::Status(status, message) => ProviderFailure::Transport {
            code: Some(status.as_u16()),
            message,
        },
        other => ProviderFailure::Transport {
            code: other.status_code(),
            message: other.to_string(),
        },
    }
}

fn map_init_error(error: MessagesApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize messages-api provider: {error}"))
}

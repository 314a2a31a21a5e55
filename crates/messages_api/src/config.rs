use std::collections::BTreeMap;
use std::time::Duration;

use crate::url::DEFAULT_MESSAGES_URL;

/// Default value of the API versioning header.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Transport configuration for messages requests.
#[derive(Debug, Clone)]
pub struct MessagesApiConfig {
    /// Secret passed in the `x-api-key` header.
    pub api_key: String,
    /// Endpoint receiving the POST.
    pub api_url: String,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for MessagesApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_MESSAGES_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl MessagesApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Returns true when an API key with non-whitespace content is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

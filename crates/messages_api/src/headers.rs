use std::collections::BTreeMap;

use crate::config::MessagesApiConfig;
use crate::error::MessagesApiError;

pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_API_VERSION: &str = "anthropic-version";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for messages requests.
pub fn build_headers(
    config: &MessagesApiConfig,
) -> Result<BTreeMap<String, String>, MessagesApiError> {
    if !config.has_api_key() {
        return Err(MessagesApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_API_KEY.to_owned(), config.api_key.trim().to_owned());
    headers.insert(
        HEADER_API_VERSION.to_owned(),
        config.api_version.trim().to_owned(),
    );
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    if let Some(user_agent) = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        headers.insert(HEADER_USER_AGENT.to_owned(), user_agent.to_owned());
    }

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

use std::sync::Arc;

use chat_provider::ChatProvider;
use chat_provider_messages_api::{
    MessagesApiProvider, MessagesApiProviderConfig, MESSAGES_API_PROVIDER_ID,
};
use chat_provider_mock::{MockProvider, MOCK_PROVIDER_ID};
use scene_composer::ChatConfig;

pub const DEFAULT_PROVIDER_ID: &str = MESSAGES_API_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "SCENE_COMPOSER_PROVIDER";

pub fn provider_from_env(config: &ChatConfig) -> Result<Arc<dyn ChatProvider>, String> {
    let provider_id = std::env::var(PROVIDER_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    provider_for_id(provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID), config)
}

pub fn provider_for_id(
    provider_id: &str,
    config: &ChatConfig,
) -> Result<Arc<dyn ChatProvider>, String> {
    match provider_id {
        MESSAGES_API_PROVIDER_ID => {
            let provider_config = MessagesApiProviderConfig::new(
                config.api_key.clone().unwrap_or_default(),
                config.model.clone(),
            )
            .with_api_url(config.api_url.clone());

            let provider = MessagesApiProvider::new(provider_config).map_err(|error| {
                format!("Failed to initialize {MESSAGES_API_PROVIDER_ID} provider: {error}")
            })?;
            Ok(Arc::new(provider))
        }
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {MESSAGES_API_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        )),
    }
}

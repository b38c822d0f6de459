//! OpenAI client configuration.

use crate::config::OpenAiSettings;
use crate::error::{DocQaError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from settings.
///
/// The API key is required; a missing key is a configuration error rather than
/// a failure on the first request.
pub fn create_client(settings: &OpenAiSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = match settings.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            return Err(DocQaError::Configuration(
                "OpenAI API key is required".to_string(),
            ))
        }
    };

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base_url) = settings.base_url.as_deref() {
        config = config.with_api_base(base_url);
    }

    create_client_with_timeout(config, Duration::from_secs(settings.timeout_seconds))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DocQaError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}

//! Azure OpenAI provider.
//!
//! Same wire format as OpenAI chat completions, but addressed by
//! deployment under a tenant endpoint and authenticated with an
//! `api-key` header.

use super::{
    factory::ProviderFactory,
    openai::{map_send_error, read_chat_response},
    secrets::{ApiCredential, CredentialBuilder},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Environment variable for the Azure OpenAI API key.
pub const AZURE_API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";
/// Environment variable for the Azure OpenAI endpoint.
pub const AZURE_ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";

const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
const API_VERSION: &str = "2024-02-15-preview";

/// Azure OpenAI provider, routed as `"azure"`.
pub struct AzureOpenAiProvider {
    credential: ApiCredential,
    endpoint: String,
    deployment: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AzureOpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiProvider")
            .field("credential", &self.credential)
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl AzureOpenAiProvider {
    /// Create from a provider config block. The API key and endpoint fall
    /// back to `AZURE_OPENAI_API_KEY` / `AZURE_OPENAI_ENDPOINT`.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let creds = CredentialBuilder::new()
            .require("api_key", AZURE_API_KEY_ENV, "Azure OpenAI API key")
            .require("endpoint", AZURE_ENDPOINT_ENV, "Azure OpenAI endpoint")
            .build(config)?;

        let endpoint = creds
            .get("endpoint")?
            .expose()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            credential: ApiCredential::from_config_or_env(
                config,
                "api_key",
                AZURE_API_KEY_ENV,
                "Azure OpenAI API key",
            )?,
            endpoint,
            deployment: config["deployment"]
                .as_str()
                .unwrap_or(DEFAULT_DEPLOYMENT)
                .to_string(),
            client: reqwest::Client::new(),
        })
    }
}

#[derive(Debug, Serialize)]
struct AzureRequest {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        // The deployment fixes the model; the body carries no model field.
        let request = AzureRequest {
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            response_format: config
                .json_mode
                .then(|| serde_json::json!({ "type": "json_object" })),
        };

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, API_VERSION
        );
        let response = self
            .client
            .post(url)
            .header("api-key", self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, config.timeout))?;

        read_chat_response(response).await
    }

    fn name(&self) -> &str {
        "azure"
    }

    fn model(&self) -> &str {
        &self.deployment
    }
}

/// Factory for the Azure OpenAI provider.
pub struct AzureOpenAiProviderFactory;

impl ProviderFactory for AzureOpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "azure"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(AzureOpenAiProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", AZURE_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Azure OpenAI API key required: set 'api_key' in config or {} env",
                AZURE_API_KEY_ENV
            )));
        }
        if !ApiCredential::is_available(config, "endpoint", AZURE_ENDPOINT_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Azure OpenAI endpoint required: set 'endpoint' in config or {} env",
                AZURE_ENDPOINT_ENV
            )));
        }
        Ok(())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "deployment": DEFAULT_DEPLOYMENT })
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["compliance", "data-residency", "structured-json"]
    }

    fn description(&self) -> &'static str {
        "Azure OpenAI provider for compliance-constrained deployments"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JsonValue {
        serde_json::json!({
            "api_key": "azure-key",
            "endpoint": "https://tenant.openai.azure.com/",
            "deployment": "claims-gpt4o"
        })
    }

    #[test]
    fn test_provider_name_and_deployment() {
        let provider = AzureOpenAiProvider::from_config(&config()).unwrap();
        assert_eq!(provider.name(), "azure");
        assert_eq!(provider.model(), "claims-gpt4o");
        // Trailing slash is stripped so URL joining stays clean.
        assert_eq!(provider.endpoint, "https://tenant.openai.azure.com");
    }

    #[test]
    fn test_validate_requires_endpoint() {
        let factory = AzureOpenAiProviderFactory;
        if std::env::var(AZURE_ENDPOINT_ENV).is_err() {
            let err = factory
                .validate_config(&serde_json::json!({ "api_key": "k" }))
                .unwrap_err();
            assert!(matches!(err, ProviderError::NotConfigured(_)));
        }
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let provider = AzureOpenAiProvider::from_config(&config()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("azure-key"));
    }
}

//! Provider factory pattern for dynamic LLM provider registration.
//!
//! New providers register a factory instead of being added to an enum.
//! Availability is decided once, at registry instantiation: a provider is
//! available iff its factory validates the configuration it was given
//! (credentials present, endpoint well-formed). Nothing re-checks
//! availability per request.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let providers = registry.instantiate_available(&config.providers);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use super::{LlmProvider, ProviderError};

/// Factory for creating LLM providers from configuration.
///
/// Each factory is responsible for validating its configuration format,
/// creating provider instances, and advertising what the provider is
/// good at.
pub trait ProviderFactory: Send + Sync {
    /// Unique routing name for this provider type.
    ///
    /// Examples: "claude", "openai", "gemini", "azure"
    fn provider_type(&self) -> &'static str;

    /// Create a provider instance from JSON configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    ///
    /// Used for the availability check during registry instantiation.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    /// Default configuration for this provider.
    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    /// Capability tags surfaced on the status report.
    fn capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    /// Human-readable description of this provider.
    fn description(&self) -> &'static str {
        "LLM Provider"
    }
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in provider registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::AnthropicProviderFactory));
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry.register(Arc::new(super::GeminiProviderFactory));
        registry.register(Arc::new(super::AzureOpenAiProviderFactory));
        registry
    }

    /// Register a provider factory, replacing any with the same type.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider from type name and configuration.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "Unknown provider type: '{}'. Available: {:?}",
                    provider_type,
                    self.available_types()
                ))
            })?
            .create(config)
    }

    /// Validate configuration for a provider type.
    pub fn validate(&self, provider_type: &str, config: &JsonValue) -> Result<(), ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!("Unknown provider type: '{}'", provider_type))
            })?
            .validate_config(config)
    }

    /// Instantiate every registered provider whose configuration validates.
    ///
    /// Providers absent from `configs` still get a chance with an empty
    /// config block, since credentials may come from the environment.
    /// Failures are logged at debug and the provider is simply left out;
    /// the router never sees it.
    pub fn instantiate_available(
        &self,
        configs: &BTreeMap<String, JsonValue>,
    ) -> BTreeMap<String, Arc<dyn LlmProvider>> {
        let empty = serde_json::json!({});
        let mut providers = BTreeMap::new();
        for (name, factory) in &self.factories {
            let config = configs.get(name).unwrap_or(&empty);
            match factory.validate_config(config).and_then(|_| factory.create(config)) {
                Ok(provider) => {
                    providers.insert(name.clone(), provider);
                }
                Err(err) => {
                    debug!(provider = %name, error = %err, "provider unavailable");
                }
            }
        }
        providers
    }

    /// List registered provider types.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a provider type is registered.
    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// Get the factory for a provider type.
    pub fn get_factory(&self, provider_type: &str) -> Option<&Arc<dyn ProviderFactory>> {
        self.factories.get(provider_type)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProviderFactory;

    #[test]
    fn test_registry_register_and_create() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProviderFactory));

        assert!(registry.has_provider("mock"));
        assert!(!registry.has_provider("unknown"));

        let config = serde_json::json!({});
        let provider = registry.create("mock", &config).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_registry_unknown_provider() {
        let registry = ProviderRegistry::new();
        let config = serde_json::json!({});

        let err = registry
            .create("unknown", &config)
            .map(|p| p.name().to_string())
            .unwrap_err();
        match err {
            ProviderError::NotConfigured(msg) => {
                assert!(msg.contains("Unknown provider type"));
            }
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_register_all_backends() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(
            registry.available_types(),
            vec!["azure", "claude", "gemini", "openai"]
        );
    }

    #[test]
    fn test_instantiate_available_skips_unconfigured() {
        // Azure requires key + endpoint + deployment; with an empty config
        // block (and no env), it must be skipped while mock survives.
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProviderFactory));
        registry.register(Arc::new(super::super::AzureOpenAiProviderFactory));

        let providers = registry.instantiate_available(&BTreeMap::new());
        assert!(providers.contains_key("mock"));
        assert!(!providers.contains_key("azure"));
    }

    #[test]
    fn test_capabilities_surface_through_factory() {
        let registry = ProviderRegistry::with_defaults();
        let factory = registry.get_factory("claude").unwrap();
        assert!(!factory.capabilities().is_empty());
    }
}

//! Secure credential handling for LLM providers.
//!
//! Every provider loads its API key through this module so the same
//! guarantees hold everywhere:
//!
//! - **No accidental logging**: credentials never appear in Debug/Display
//! - **Memory safety**: values are zeroed on drop via the `secrecy` crate
//! - **Explicit exposure**: `.expose()` at the point of use, nowhere else
//! - **Source tracking**: config vs environment, for debugging setups
//!
//! ## Usage
//!
//! ```ignore
//! let cred = ApiCredential::from_config_or_env(
//!     &config, "api_key", "ANTHROPIC_API_KEY", "Anthropic API key")?;
//!
//! request.header("x-api-key", cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for debugging configuration issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from the YAML/JSON provider config
    Config,
    /// Loaded from an environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
///
/// Debug and Display show `[REDACTED]`; the value is only reachable
/// through [`ApiCredential::expose`].
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a raw string value. After this point the value can no longer
    /// be accidentally logged.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    ///
    /// `name` is the human-readable label used in error messages
    /// (e.g. "Anthropic API key"). The variable's value is never logged.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Load from JSON config, falling back to an environment variable.
    ///
    /// This is the path provider factories should use:
    /// 1. `config_key` in the provider's config block wins
    /// 2. otherwise `env_var` from the environment
    /// 3. otherwise [`ProviderError::NotConfigured`]
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str() {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        if let Ok(value) = std::env::var(env_var) {
            return Ok(Self::new(value, CredentialSource::Environment, name));
        }

        Err(ProviderError::NotConfigured(format!(
            "{} required: set '{}' in config or {} environment variable",
            name, config_key, env_var
        )))
    }

    /// Check whether a credential is available without loading it.
    ///
    /// The registry uses this to decide provider availability at startup.
    pub fn is_available(config: &JsonValue, config_key: &str, env_var: &str) -> bool {
        config[config_key].as_str().is_some() || std::env::var(env_var).is_ok()
    }

    /// Expose the credential for use in an API call.
    ///
    /// Only call this where the credential is actually needed (setting an
    /// HTTP header); never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// The source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Human-readable label of this credential.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

/// Builder for providers that need multiple credentials.
///
/// Azure OpenAI needs an API key, an endpoint and a deployment name; this
/// builder loads them in one pass with consistent error messages.
///
/// ```ignore
/// let creds = CredentialBuilder::new()
///     .require("api_key", "AZURE_OPENAI_API_KEY", "Azure OpenAI API key")
///     .require("endpoint", "AZURE_OPENAI_ENDPOINT", "Azure OpenAI endpoint")
///     .build(&config)?;
/// ```
pub struct CredentialBuilder {
    required: Vec<CredentialSpec>,
    optional: Vec<CredentialSpec>,
}

struct CredentialSpec {
    config_key: &'static str,
    env_var: &'static str,
    name: &'static str,
}

impl CredentialBuilder {
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// Add a required credential.
    pub fn require(
        mut self,
        config_key: &'static str,
        env_var: &'static str,
        name: &'static str,
    ) -> Self {
        self.required.push(CredentialSpec {
            config_key,
            env_var,
            name,
        });
        self
    }

    /// Add an optional credential.
    pub fn optional(
        mut self,
        config_key: &'static str,
        env_var: &'static str,
        name: &'static str,
    ) -> Self {
        self.optional.push(CredentialSpec {
            config_key,
            env_var,
            name,
        });
        self
    }

    /// Load every declared credential from config.
    pub fn build(self, config: &JsonValue) -> Result<CredentialSet, ProviderError> {
        let mut credentials = std::collections::BTreeMap::new();

        for spec in self.required {
            let cred = ApiCredential::from_config_or_env(
                config,
                spec.config_key,
                spec.env_var,
                spec.name,
            )?;
            credentials.insert(spec.config_key, cred);
        }

        for spec in self.optional {
            if ApiCredential::is_available(config, spec.config_key, spec.env_var) {
                let cred = ApiCredential::from_config_or_env(
                    config,
                    spec.config_key,
                    spec.env_var,
                    spec.name,
                )?;
                credentials.insert(spec.config_key, cred);
            }
        }

        Ok(CredentialSet { credentials })
    }
}

impl Default for CredentialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of loaded credentials.
pub struct CredentialSet {
    credentials: std::collections::BTreeMap<&'static str, ApiCredential>,
}

impl CredentialSet {
    /// Get a required credential by key.
    pub fn get(&self, key: &str) -> Result<&ApiCredential, ProviderError> {
        self.credentials
            .get(key)
            .ok_or_else(|| ProviderError::NotConfigured(format!("Credential '{}' not found", key)))
    }

    /// Get an optional credential by key.
    pub fn get_optional(&self, key: &str) -> Option<&ApiCredential> {
        self.credentials.get(key)
    }

    /// Check if a credential was loaded.
    pub fn has(&self, key: &str) -> bool {
        self.credentials.contains_key(key)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("keys", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redacted_in_debug() {
        let secret = "sk-ant-REDACTED";
        let cred = ApiCredential::new(secret, CredentialSource::Programmatic, "Test API key");

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(secret), "credential leaked via Debug");
        assert!(debug.contains("[REDACTED]"));

        let display = format!("{}", cred);
        assert!(!display.contains(secret), "credential leaked via Display");
    }

    #[test]
    fn test_expose_returns_value() {
        let cred = ApiCredential::new("the-key", CredentialSource::Programmatic, "Test API key");
        assert_eq!(cred.expose(), "the-key");
        assert!(!cred.is_empty());
        assert!(ApiCredential::new("", CredentialSource::Programmatic, "x").is_empty());
    }

    #[test]
    fn test_config_wins_over_env() {
        let config = serde_json::json!({"api_key": "from-config"});
        let cred = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            "CLAIMPILOT_TEST_UNSET_VAR",
            "Test API key",
        )
        .unwrap();
        assert_eq!(cred.expose(), "from-config");
        assert_eq!(cred.source(), CredentialSource::Config);
    }

    #[test]
    fn test_missing_credential_is_not_configured() {
        let config = serde_json::json!({});
        let err = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            "CLAIMPILOT_TEST_UNSET_VAR",
            "Test API key",
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_builder_collects_required_and_optional() {
        let config = serde_json::json!({
            "api_key": "k",
            "endpoint": "https://example.openai.azure.com"
        });
        let creds = CredentialBuilder::new()
            .require("api_key", "CLAIMPILOT_TEST_UNSET_VAR", "Azure OpenAI API key")
            .require("endpoint", "CLAIMPILOT_TEST_UNSET_VAR2", "Azure OpenAI endpoint")
            .optional("proxy", "CLAIMPILOT_TEST_UNSET_VAR3", "proxy")
            .build(&config)
            .unwrap();
        assert!(creds.has("api_key"));
        assert!(creds.has("endpoint"));
        assert!(creds.get_optional("proxy").is_none());
        assert!(creds.get("missing").is_err());
    }
}

//! Runtime configuration loaded from YAML.
//!
//! Everything has a default so an empty file (or no file at all) yields a
//! working pipeline with no providers configured. Provider blocks are kept
//! as raw JSON values and handed to the matching factory, which owns their
//! schema.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use claimpilot_core::RoutingPolicy;

use crate::providers::CompletionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Durations as humantime strings ("30s", "2m") in config files.
mod duration_str {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Provider config blocks keyed by routing name ("claude", "openai", ...).
    /// Each block's schema belongs to its factory.
    pub providers: BTreeMap<String, serde_json::Value>,

    /// Provider selection order per task.
    pub routing: RoutingPolicy,

    /// Redact PII before any text leaves the process.
    pub enable_pii_redaction: bool,

    /// Restore original PII into file-note output before returning it.
    pub rehydrate_file_notes: bool,

    /// Budget for a single provider attempt, repair turn included.
    #[serde(with = "duration_str")]
    pub per_attempt_timeout: Duration,

    /// Wall-clock ceiling for one request across all fallback attempts.
    #[serde(with = "duration_str")]
    pub request_ceiling: Duration,

    /// Token cap passed to every provider call.
    pub max_tokens: u32,

    /// Sampling temperature for every provider call.
    pub temperature: f32,

    /// Register the offline mock provider alongside the real ones.
    pub allow_mock: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            routing: RoutingPolicy::default(),
            enable_pii_redaction: true,
            rehydrate_file_notes: false,
            per_attempt_timeout: Duration::from_secs(30),
            request_ceiling: Duration::from_secs(120),
            max_tokens: 4000,
            temperature: 0.2,
            allow_mock: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading runtime config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Per-call settings derived from this config. The router overrides
    /// the timeout per attempt as the request ceiling shrinks.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.per_attempt_timeout,
            json_mode: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert!(config.enable_pii_redaction);
        assert!(!config.rehydrate_file_notes);
        assert!(!config.allow_mock);
        assert_eq!(config.per_attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.request_ceiling, Duration::from_secs(120));
        assert_eq!(config.max_tokens, 4000);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_full_yaml_parses() {
        let yaml = r#"
providers:
  claude:
    api_key: test-key
    model: claude-sonnet-4-20250514
  openai:
    api_key: other-key
enable_pii_redaction: false
rehydrate_file_notes: true
per_attempt_timeout: 45s
request_ceiling: 3m
max_tokens: 2000
temperature: 0.5
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert!(!config.enable_pii_redaction);
        assert!(config.rehydrate_file_notes);
        assert_eq!(config.per_attempt_timeout, Duration::from_secs(45));
        assert_eq!(config.request_ceiling, Duration::from_secs(180));
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(
            config.providers["claude"]["model"],
            "claude-sonnet-4-20250514"
        );
    }

    #[test]
    fn test_routing_block_overrides_defaults() {
        let yaml = r#"
routing:
  strategy:
    claim_triage: [openai, claude]
    question_generation: [claude]
    coverage_analysis: [claude]
    file_notes: [openai]
  fallback_order: [openai, claude]
  default_provider: openai
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.routing.default_provider, "openai");
        assert_eq!(
            config.routing.strategy[&claimpilot_core::TaskType::ClaimTriage],
            vec!["openai".to_string(), "claude".to_string()]
        );
    }

    #[test]
    fn test_duration_round_trip_through_yaml() {
        let config = RuntimeConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = RuntimeConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.per_attempt_timeout, config.per_attempt_timeout);
        assert_eq!(parsed.request_ceiling, config.request_ceiling);
    }
}

//! Pipeline status report for operators.
//!
//! Answers "which providers can this deployment actually reach, and how
//! will tasks route across them" without sending a single prompt. The
//! report is built the same way the analyzer wires itself, so what it
//! says is what the router will do.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use claimpilot_core::TaskType;

use crate::config::RuntimeConfig;
use crate::providers::{MockProviderFactory, ProviderRegistry};

/// One registered provider and whether it is usable right now.
#[derive(Debug, Serialize)]
pub struct ProviderProfile {
    /// Routing name ("claude", "openai", ...)
    pub provider: String,

    /// Configured model, present only when the provider instantiated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// True when credentials and config validated at startup
    pub available: bool,

    /// Task characteristics this provider is registered as good at
    pub best_for: Vec<String>,
}

/// Snapshot of the pipeline's provider and routing posture.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub providers: Vec<ProviderProfile>,
    pub routing_strategy: BTreeMap<TaskType, Vec<String>>,
    pub fallback_order: Vec<String>,
    pub default_provider: String,
    pub pii_redaction_enabled: bool,
}

impl StatusReport {
    /// Build the report from config, instantiating providers exactly the
    /// way the analyzer does.
    pub fn collect(config: &RuntimeConfig) -> Self {
        let mut registry = ProviderRegistry::with_defaults();
        if config.allow_mock {
            registry.register(Arc::new(MockProviderFactory));
        }
        let instances = registry.instantiate_available(&config.providers);

        let mut providers = Vec::new();
        for type_name in registry.available_types() {
            let Some(factory) = registry.get_factory(type_name) else {
                continue;
            };
            let instance = instances.get(type_name);
            providers.push(ProviderProfile {
                provider: type_name.to_string(),
                model_name: instance.map(|p| p.model().to_string()),
                available: instance.is_some(),
                best_for: factory
                    .capabilities()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            });
        }

        Self {
            providers,
            routing_strategy: config.routing.strategy.clone(),
            fallback_order: config.routing.fallback_order.clone(),
            default_provider: config.routing.default_provider.clone(),
            pii_redaction_enabled: config.enable_pii_redaction,
        }
    }
}

//! Routing policy: which providers handle which task, in what order.
//!
//! Pure data plus one pure function. The runtime router owns timeouts,
//! retries and invocation; this module only answers "given this task and
//! this preference, which configured providers should be tried, in order".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TaskType;

/// Sentinel preference meaning "let the policy decide".
pub const AUTO_PROVIDER: &str = "auto";

/// Ordered provider preferences per task, with a global fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    /// Task-specific candidate order, consulted first.
    pub strategy: BTreeMap<TaskType, Vec<String>>,

    /// Tried after the task-specific candidates and the default.
    pub fallback_order: Vec<String>,

    /// Tried right after the task-specific candidates.
    pub default_provider: String,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        let mut strategy = BTreeMap::new();
        // Triage, questions and coverage lean on long-context reasoning;
        // file notes are cheap summarization.
        strategy.insert(TaskType::ClaimTriage, vec!["claude".to_string()]);
        strategy.insert(TaskType::QuestionGeneration, vec!["claude".to_string()]);
        strategy.insert(TaskType::CoverageAnalysis, vec!["claude".to_string()]);
        strategy.insert(TaskType::FileNotes, vec!["openai".to_string()]);
        RoutingPolicy {
            strategy,
            fallback_order: vec![
                "claude".to_string(),
                "openai".to_string(),
                "gemini".to_string(),
                "azure".to_string(),
            ],
            default_provider: "claude".to_string(),
        }
    }
}

impl RoutingPolicy {
    /// Builds the ordered candidate list for one request.
    ///
    /// Order: explicit preference (unless `auto`), then the task's declared
    /// candidates, then the default provider, then the global fallback
    /// chain. Duplicates keep their first position; providers not in
    /// `available` are dropped. Fully deterministic.
    pub fn candidates(
        &self,
        task: TaskType,
        preferred: Option<&str>,
        available: &[String],
    ) -> Vec<String> {
        let mut ordered: Vec<&str> = Vec::new();
        if let Some(p) = preferred {
            if p != AUTO_PROVIDER {
                ordered.push(p);
            }
        }
        if let Some(task_candidates) = self.strategy.get(&task) {
            ordered.extend(task_candidates.iter().map(String::as_str));
        }
        ordered.push(&self.default_provider);
        ordered.extend(self.fallback_order.iter().map(String::as_str));

        let mut out: Vec<String> = Vec::new();
        for name in ordered {
            if out.iter().any(|seen| seen == name) {
                continue;
            }
            if available.iter().any(|a| a == name) {
                out.push(name.to_string());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_providers() -> Vec<String> {
        ["claude", "openai", "gemini", "azure"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_default_order_for_triage() {
        let policy = RoutingPolicy::default();
        let candidates = policy.candidates(TaskType::ClaimTriage, None, &all_providers());
        assert_eq!(candidates, vec!["claude", "openai", "gemini", "azure"]);
    }

    #[test]
    fn test_file_notes_prefer_openai() {
        let policy = RoutingPolicy::default();
        let candidates = policy.candidates(TaskType::FileNotes, None, &all_providers());
        assert_eq!(candidates, vec!["openai", "claude", "gemini", "azure"]);
    }

    #[test]
    fn test_explicit_preference_goes_first() {
        let policy = RoutingPolicy::default();
        let candidates =
            policy.candidates(TaskType::ClaimTriage, Some("gemini"), &all_providers());
        assert_eq!(candidates, vec!["gemini", "claude", "openai", "azure"]);
    }

    #[test]
    fn test_auto_preference_defers_to_policy() {
        let policy = RoutingPolicy::default();
        let with_auto = policy.candidates(TaskType::ClaimTriage, Some("auto"), &all_providers());
        let without = policy.candidates(TaskType::ClaimTriage, None, &all_providers());
        assert_eq!(with_auto, without);
    }

    #[test]
    fn test_unconfigured_preference_is_skipped() {
        let policy = RoutingPolicy::default();
        let available = vec!["openai".to_string(), "azure".to_string()];
        let candidates = policy.candidates(TaskType::ClaimTriage, Some("claude"), &available);
        assert_eq!(candidates, vec!["openai", "azure"]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let policy = RoutingPolicy::default();
        // "claude" appears as preference, task candidate, default and
        // fallback; it must show up exactly once.
        let candidates =
            policy.candidates(TaskType::ClaimTriage, Some("claude"), &all_providers());
        assert_eq!(
            candidates.iter().filter(|c| c.as_str() == "claude").count(),
            1
        );
    }

    #[test]
    fn test_no_available_providers_yields_empty() {
        let policy = RoutingPolicy::default();
        let candidates = policy.candidates(TaskType::ClaimTriage, None, &[]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_policy_round_trips_through_serde() {
        let policy = RoutingPolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        let back: RoutingPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}

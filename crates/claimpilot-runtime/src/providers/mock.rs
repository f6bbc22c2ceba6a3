//! Offline mock provider.
//!
//! Returns canned, schema-valid JSON for each task family so the full
//! pipeline (redaction, routing, validation, envelopes) can run without
//! network access or credentials. Only registered when `allow_mock` is
//! set in the runtime config.

use super::{
    factory::ProviderFactory,
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Deterministic canned-response provider, routed as `"mock"`.
#[derive(Debug, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        MockProvider
    }

    /// Picks the canned payload by sniffing the prompt for task markers.
    fn canned_response(messages: &[ChatMessage]) -> JsonValue {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();

        if prompt.contains("file note") || prompt.contains("diary entry") {
            Self::canned_file_note()
        } else if prompt.contains("coverage and liability") {
            Self::canned_coverage()
        } else if prompt.contains("investigation questions") || prompt.contains("interview questions") {
            Self::canned_questions()
        } else {
            Self::canned_checklist()
        }
    }

    fn canned_checklist() -> JsonValue {
        json!({
            "triage": {
                "claim_type": "auto_pd",
                "confidence": 0.75,
                "severity_assessment": "Mock triage: minor vehicle damage, no injuries reported",
                "complexity_rating": "simple",
                "recommended_handler_level": "junior",
                "key_concerns": ["mock response - verify before relying on output"]
            },
            "immediate_tasks": [{
                "task": "Contact insured to confirm loss facts",
                "priority": "high",
                "deadline_guidance": "within 24 hours",
                "category": "contact",
                "notes": null
            }],
            "short_term_tasks": [{
                "task": "Obtain repair estimate",
                "priority": "medium",
                "deadline_guidance": "within 5 business days",
                "category": "document",
                "notes": null
            }],
            "ongoing_tasks": [],
            "documents_to_request": ["police report", "photos of damage"],
            "parties_to_contact": [{
                "party": "insured",
                "reason": "recorded statement",
                "priority": "high"
            }]
        })
    }

    fn canned_questions() -> JsonValue {
        json!({
            "party_type": "claimant",
            "liability_questions": ["Describe what happened immediately before the loss."],
            "damages_questions": ["What damage or injuries resulted?"],
            "coverage_questions": ["Who owns the vehicle involved?"],
            "follow_up_triggers": [{
                "if": "claimant mentions prior damage",
                "then": "ask for the date and repair history of the prior damage"
            }]
        })
    }

    fn canned_coverage() -> JsonValue {
        json!({
            "coverage_status": "pending",
            "coverage_issues": [],
            "liability_issues": [],
            "key_coverage_points": ["Policy appears in force on the date of loss"],
            "key_liability_questions": ["Were there independent witnesses?"],
            "red_flags": [],
            "recommended_reserves_range": null
        })
    }

    fn canned_file_note() -> JsonValue {
        json!({
            "note_date": "2025-01-01",
            "claim_number": "[CLAIM_NUMBER_1]",
            "summary": "Mock file note: FNOL received and initial tasks assigned",
            "detailed_notes": "Generated offline by the mock provider for pipeline testing.",
            "action_plan": ["confirm coverage", "contact insured"],
            "reserve_recommendation": null,
            "follow_up_date": "2025-01-08"
        })
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let payload = Self::canned_response(&messages);
        Ok(CompletionResponse {
            content: payload.to_string(),
            usage: TokenUsage::default(),
            model: "mock-1".to_string(),
            stop_reason: Some("end_turn".to_string()),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }
}

/// Factory for the mock provider. Always available.
pub struct MockProviderFactory;

impl ProviderFactory for MockProviderFactory {
    fn provider_type(&self) -> &'static str {
        "mock"
    }

    fn create(&self, _config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(MockProvider::new()))
    }

    fn validate_config(&self, _config: &JsonValue) -> Result<(), ProviderError> {
        Ok(())
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["offline-testing"]
    }

    fn description(&self) -> &'static str {
        "Offline mock provider with canned schema-valid responses"
    }
}

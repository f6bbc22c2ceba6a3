//! The claim analyzer orchestrates one request end to end.
//!
//! Flow per operation: validate the domain request, build the prompt
//! input, redact it once, route to a provider, and wrap the validated
//! result in a response envelope. Redaction maps live on the stack for
//! the duration of one call and are dropped with it.
//!
//! A request that fails domain validation returns `Err` before any text
//! is assembled. Provider exhaustion is not an `Err`: the caller gets a
//! well-formed envelope with `success: false` and the error string.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use claimpilot_core::{
    ClaimInvestigationRequest, CoverageAnalysis, FileNote, FileNoteRequest,
    InvestigationChecklist, QuestionGenerationRequest, QuestionSet, RedactionMap, Redactor,
    RequestError, TaskType,
};

use crate::config::RuntimeConfig;
use crate::prompts;
use crate::providers::{MockProviderFactory, ProviderRegistry};
use crate::router::TaskRouter;

/// Response envelope for claim analysis.
#[derive(Debug, Serialize)]
pub struct ChecklistEnvelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<InvestigationChecklist>,

    /// "provider/model" of whoever produced the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    pub processing_time_ms: u64,
    pub pii_redacted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response envelope for question generation.
#[derive(Debug, Serialize)]
pub struct QuestionsEnvelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    pub processing_time_ms: u64,
    pub pii_redacted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response envelope for coverage analysis.
#[derive(Debug, Serialize)]
pub struct CoverageEnvelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CoverageAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    pub processing_time_ms: u64,
    pub pii_redacted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response envelope for file note drafting.
#[derive(Debug, Serialize)]
pub struct FileNoteEnvelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_note: Option<FileNote>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    pub processing_time_ms: u64,
    pub pii_redacted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates redaction, routing, and envelope assembly for the four
/// pipeline operations.
pub struct ClaimAnalyzer {
    router: TaskRouter,
    redactor: Redactor,
    enable_pii_redaction: bool,
    rehydrate_file_notes: bool,
}

impl ClaimAnalyzer {
    pub fn new(router: TaskRouter, enable_pii_redaction: bool, rehydrate_file_notes: bool) -> Self {
        Self {
            router,
            redactor: Redactor::new(),
            enable_pii_redaction,
            rehydrate_file_notes,
        }
    }

    /// Build an analyzer from config: register factories, instantiate
    /// whichever providers validate, and wire the router.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut registry = ProviderRegistry::with_defaults();
        if config.allow_mock {
            registry.register(Arc::new(MockProviderFactory));
        }
        let providers = registry.instantiate_available(&config.providers);
        info!(
            providers = ?providers.keys().collect::<Vec<_>>(),
            "claim analyzer initialized"
        );
        let router = TaskRouter::new(
            providers,
            config.routing.clone(),
            config.per_attempt_timeout,
            config.request_ceiling,
            config.completion_config(),
        );
        Self::new(router, config.enable_pii_redaction, config.rehydrate_file_notes)
    }

    pub fn router(&self) -> &TaskRouter {
        &self.router
    }

    pub fn pii_redaction_enabled(&self) -> bool {
        self.enable_pii_redaction
    }

    fn redact(&self, text: &str) -> (String, RedactionMap) {
        if self.enable_pii_redaction {
            let redaction = self.redactor.redact(text);
            (redaction.text, redaction.map)
        } else {
            (text.to_string(), RedactionMap::default())
        }
    }

    /// Triage a new claim and produce an investigation checklist.
    #[instrument(skip_all, fields(jurisdiction = %request.jurisdiction))]
    pub async fn analyze_claim(
        &self,
        request: &ClaimInvestigationRequest,
    ) -> Result<ChecklistEnvelope, RequestError> {
        request.validate()?;
        let started = Instant::now();

        let summary = prompts::fnol_summary(request);
        let (redacted, map) = self.redact(&summary);
        let user = prompts::triage_prompt(&redacted, &request.jurisdiction);

        let outcome = self
            .router
            .route(
                TaskType::ClaimTriage,
                request.preferred_model.as_deref(),
                prompts::system_prompt(TaskType::ClaimTriage),
                &user,
            )
            .await;

        Ok(match outcome {
            Ok(success) => ChecklistEnvelope {
                success: true,
                checklist: success.result.into_checklist(),
                model_used: Some(format!("{}/{}", success.provider, success.model)),
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: None,
            },
            Err(err) => ChecklistEnvelope {
                success: false,
                checklist: None,
                model_used: None,
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: Some(err.to_string()),
            },
        })
    }

    /// Generate investigation questions for one party.
    #[instrument(skip_all, fields(party_type = %request.party_type))]
    pub async fn generate_questions(
        &self,
        request: &QuestionGenerationRequest,
    ) -> Result<QuestionsEnvelope, RequestError> {
        request.validate()?;
        let started = Instant::now();

        // The summary and the caller's issue list both carry free text,
        // so they go through redaction together in one pass.
        let input = prompts::question_input(&request.claim_summary, &request.specific_issues);
        let (redacted, map) = self.redact(&input);
        let user =
            prompts::question_prompt(&redacted, request.claim_type.as_str(), &request.party_type);

        let outcome = self
            .router
            .route(
                TaskType::QuestionGeneration,
                request.preferred_model.as_deref(),
                prompts::system_prompt(TaskType::QuestionGeneration),
                &user,
            )
            .await;

        Ok(match outcome {
            Ok(success) => QuestionsEnvelope {
                success: true,
                questions: success.result.into_questions(),
                model_used: Some(format!("{}/{}", success.provider, success.model)),
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: None,
            },
            Err(err) => QuestionsEnvelope {
                success: false,
                questions: None,
                model_used: None,
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: Some(err.to_string()),
            },
        })
    }

    /// Analyze coverage and liability for a claim.
    #[instrument(skip_all, fields(jurisdiction = %request.jurisdiction))]
    pub async fn analyze_coverage(
        &self,
        request: &ClaimInvestigationRequest,
    ) -> Result<CoverageEnvelope, RequestError> {
        request.validate()?;
        let started = Instant::now();

        let summary = prompts::fnol_summary(request);
        let (redacted, map) = self.redact(&summary);
        let user = prompts::coverage_prompt(&redacted, &request.jurisdiction);

        let outcome = self
            .router
            .route(
                TaskType::CoverageAnalysis,
                request.preferred_model.as_deref(),
                prompts::system_prompt(TaskType::CoverageAnalysis),
                &user,
            )
            .await;

        Ok(match outcome {
            Ok(success) => CoverageEnvelope {
                success: true,
                analysis: success.result.into_coverage(),
                model_used: Some(format!("{}/{}", success.provider, success.model)),
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: None,
            },
            Err(err) => CoverageEnvelope {
                success: false,
                analysis: None,
                model_used: None,
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: Some(err.to_string()),
            },
        })
    }

    /// Draft a claim file note / diary entry.
    #[instrument(skip_all)]
    pub async fn generate_file_note(
        &self,
        request: &FileNoteRequest,
    ) -> Result<FileNoteEnvelope, RequestError> {
        request.validate()?;
        let started = Instant::now();

        let input = prompts::file_note_input(request);
        let (redacted, map) = self.redact(&input);
        let user = prompts::file_note_prompt(&redacted);

        let outcome = self
            .router
            .route(
                TaskType::FileNotes,
                request.preferred_model.as_deref(),
                prompts::system_prompt(TaskType::FileNotes),
                &user,
            )
            .await;

        Ok(match outcome {
            Ok(success) => {
                let mut note = success.result.into_file_note();
                if self.rehydrate_file_notes {
                    if let Some(note) = note.as_mut() {
                        rehydrate_note(note, &map);
                    }
                }
                FileNoteEnvelope {
                    success: true,
                    file_note: note,
                    model_used: Some(format!("{}/{}", success.provider, success.model)),
                    processing_time_ms: elapsed_ms(started),
                    pii_redacted: !map.is_empty(),
                    error: None,
                }
            }
            Err(err) => FileNoteEnvelope {
                success: false,
                file_note: None,
                model_used: None,
                processing_time_ms: elapsed_ms(started),
                pii_redacted: !map.is_empty(),
                error: Some(err.to_string()),
            },
        })
    }
}

/// Restore original PII into the note's text fields. Opt-in: the note
/// stays redacted unless the deployment asked for readable file notes.
fn rehydrate_note(note: &mut FileNote, map: &RedactionMap) {
    note.claim_number = map.restore(&note.claim_number);
    note.summary = map.restore(&note.summary);
    note.detailed_notes = map.restore(&note.detailed_notes);
    for step in &mut note.action_plan {
        *step = map.restore(step);
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, MockProvider,
        ProviderError,
    };
    use async_trait::async_trait;
    use claimpilot_core::RoutingPolicy;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every message list it receives and answers with a valid
    /// question set.
    #[derive(Default)]
    struct CapturingProvider {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl LlmProvider for CapturingProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.seen.lock().unwrap().push(messages);
            Ok(CompletionResponse {
                content: serde_json::json!({
                    "party_type": "claimant",
                    "liability_questions": ["What happened?"],
                    "damages_questions": ["What was damaged?"],
                    "coverage_questions": ["Who owns the vehicle?"],
                    "follow_up_triggers": []
                })
                .to_string(),
                usage: Default::default(),
                model: "capture-1".to_string(),
                stop_reason: None,
            })
        }

        fn name(&self) -> &str {
            "capture"
        }

        fn model(&self) -> &str {
            "capture-1"
        }
    }

    fn capturing_router(provider: Arc<CapturingProvider>) -> TaskRouter {
        let mut providers: BTreeMap<String, Arc<dyn LlmProvider>> = BTreeMap::new();
        providers.insert("capture".to_string(), provider);
        let mut strategy = BTreeMap::new();
        for task in TaskType::ALL {
            strategy.insert(task, vec!["capture".to_string()]);
        }
        let policy = RoutingPolicy {
            strategy,
            fallback_order: vec![],
            default_provider: "capture".to_string(),
        };
        TaskRouter::new(
            providers,
            policy,
            Duration::from_secs(30),
            Duration::from_secs(120),
            CompletionConfig::default(),
        )
    }

    /// Always refuses, for exercising the exhaustion path.
    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            Err(ProviderError::AuthError)
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "failing-1"
        }
    }

    fn failing_router() -> TaskRouter {
        let mut providers: BTreeMap<String, Arc<dyn LlmProvider>> = BTreeMap::new();
        providers.insert("failing".to_string(), Arc::new(FailingProvider));
        let mut strategy = BTreeMap::new();
        for task in TaskType::ALL {
            strategy.insert(task, vec!["failing".to_string()]);
        }
        let policy = RoutingPolicy {
            strategy,
            fallback_order: vec![],
            default_provider: "failing".to_string(),
        };
        TaskRouter::new(
            providers,
            policy,
            Duration::from_secs(30),
            Duration::from_secs(120),
            CompletionConfig::default(),
        )
    }

    fn mock_router() -> TaskRouter {
        let mut providers: BTreeMap<String, Arc<dyn LlmProvider>> = BTreeMap::new();
        providers.insert("mock".to_string(), Arc::new(MockProvider::new()));
        let mut strategy = BTreeMap::new();
        for task in TaskType::ALL {
            strategy.insert(task, vec!["mock".to_string()]);
        }
        let policy = RoutingPolicy {
            strategy,
            fallback_order: vec!["mock".to_string()],
            default_provider: "mock".to_string(),
        };
        TaskRouter::new(
            providers,
            policy,
            Duration::from_secs(30),
            Duration::from_secs(120),
            CompletionConfig::default(),
        )
    }

    fn empty_router() -> TaskRouter {
        TaskRouter::new(
            BTreeMap::new(),
            RoutingPolicy::default(),
            Duration::from_secs(30),
            Duration::from_secs(120),
            CompletionConfig::default(),
        )
    }

    fn investigation_request() -> ClaimInvestigationRequest {
        serde_json::from_value(serde_json::json!({
            "fnol": {
                "claim_number": "CLM-20250301",
                "date_of_loss": "2025-03-01",
                "location": "Main St and 5th Ave",
                "description": "Rear-end collision at a stop light, reported by Jane Doe",
                "reported_by": "Jane Doe",
                "reported_date": "2025-03-03",
                "injuries_reported": true,
                "injury_description": "Neck pain reported at the scene"
            },
            "policy": {
                "policy_number": "POL-123456789",
                "effective_date": "2025-01-01",
                "expiration_date": "2026-01-01"
            },
            "jurisdiction": "CA"
        }))
        .unwrap()
    }

    fn file_note_request() -> FileNoteRequest {
        serde_json::from_value(serde_json::json!({
            "claim_number": "CLM-20250301",
            "actions_completed": ["Took recorded statement from John Smith"],
            "findings": ["Claimant SSN 123-45-6789 verified"],
            "next_steps": ["Request police report"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_claim_returns_checklist_envelope() {
        let analyzer = ClaimAnalyzer::new(mock_router(), true, false);
        let envelope = analyzer
            .analyze_claim(&investigation_request())
            .await
            .unwrap();
        assert!(envelope.success);
        assert!(envelope.checklist.is_some());
        assert_eq!(envelope.model_used.as_deref(), Some("mock/mock-1"));
        assert!(envelope.pii_redacted, "summary contains names and numbers");
        assert!(envelope.error.is_none());
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_routing() {
        let analyzer = ClaimAnalyzer::new(empty_router(), true, false);
        let mut request = investigation_request();
        request.jurisdiction = "California".to_string();
        let result = analyzer.analyze_claim(&request).await;
        assert!(matches!(result, Err(RequestError::BadJurisdiction(_))));
    }

    #[tokio::test]
    async fn test_exhausted_router_yields_failure_envelope() {
        let analyzer = ClaimAnalyzer::new(empty_router(), true, false);
        let envelope = analyzer
            .analyze_claim(&investigation_request())
            .await
            .unwrap();
        assert!(!envelope.success);
        assert!(envelope.checklist.is_none());
        assert!(envelope.model_used.is_none());
        assert!(envelope.error.is_some());
    }

    #[tokio::test]
    async fn test_failure_envelope_names_each_failed_candidate() {
        let analyzer = ClaimAnalyzer::new(failing_router(), true, false);
        let envelope = analyzer
            .analyze_claim(&investigation_request())
            .await
            .unwrap();
        assert!(!envelope.success);
        let error = envelope.error.unwrap();
        assert!(error.contains("failing: auth_error"), "{error}");
    }

    #[tokio::test]
    async fn test_generate_questions_envelope() {
        let analyzer = ClaimAnalyzer::new(mock_router(), true, false);
        let request: QuestionGenerationRequest = serde_json::from_value(serde_json::json!({
            "claim_summary": "Rear-end collision, claimant John Smith reports neck pain",
            "claim_type": "auto_bi",
            "party_type": "claimant"
        }))
        .unwrap();
        let envelope = analyzer.generate_questions(&request).await.unwrap();
        assert!(envelope.success);
        assert!(envelope.questions.is_some());
        assert!(envelope.pii_redacted);
    }

    #[tokio::test]
    async fn test_specific_issues_are_redacted_before_prompting() {
        let provider = Arc::new(CapturingProvider::default());
        let analyzer = ClaimAnalyzer::new(capturing_router(provider.clone()), true, false);
        let request: QuestionGenerationRequest = serde_json::from_value(serde_json::json!({
            "claim_summary": "Rear-end collision at a stop light",
            "claim_type": "auto_bi",
            "party_type": "claimant",
            "specific_issues": [
                "Prior statement: John Smith gave SSN 123-45-6789, callback 555-123-4567"
            ]
        }))
        .unwrap();

        let envelope = analyzer.generate_questions(&request).await.unwrap();
        assert!(envelope.success);
        assert!(envelope.pii_redacted);

        let seen = provider.seen.lock().unwrap();
        let user = &seen[0][1].content;
        assert!(!user.contains("123-45-6789"));
        assert!(!user.contains("555-123-4567"));
        assert!(!user.contains("John Smith"));
        assert!(user.contains("[SSN_1]"));
        assert!(user.contains("[PHONE_1]"));
        assert!(user.contains("[PERSON_1]"));
    }

    #[tokio::test]
    async fn test_analyze_coverage_envelope() {
        let analyzer = ClaimAnalyzer::new(mock_router(), true, false);
        let envelope = analyzer
            .analyze_coverage(&investigation_request())
            .await
            .unwrap();
        assert!(envelope.success);
        assert!(envelope.analysis.is_some());
    }

    #[tokio::test]
    async fn test_redaction_disabled_reports_no_redaction() {
        let analyzer = ClaimAnalyzer::new(mock_router(), false, false);
        let envelope = analyzer
            .analyze_claim(&investigation_request())
            .await
            .unwrap();
        assert!(envelope.success);
        assert!(!envelope.pii_redacted);
    }

    #[tokio::test]
    async fn test_file_note_stays_redacted_by_default() {
        let analyzer = ClaimAnalyzer::new(mock_router(), true, false);
        let envelope = analyzer
            .generate_file_note(&file_note_request())
            .await
            .unwrap();
        assert!(envelope.success);
        let note = envelope.file_note.unwrap();
        assert_eq!(note.claim_number, "[CLAIM_NUMBER_1]");
    }

    #[tokio::test]
    async fn test_file_note_rehydration_restores_claim_number() {
        let analyzer = ClaimAnalyzer::new(mock_router(), true, true);
        let envelope = analyzer
            .generate_file_note(&file_note_request())
            .await
            .unwrap();
        assert!(envelope.success);
        let note = envelope.file_note.unwrap();
        assert_eq!(note.claim_number, "CLM-20250301");
    }

    #[tokio::test]
    async fn test_failure_envelope_serializes_without_null_fields() {
        let analyzer = ClaimAnalyzer::new(empty_router(), true, false);
        let envelope = analyzer
            .analyze_claim(&investigation_request())
            .await
            .unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("checklist").is_none());
        assert!(json.get("model_used").is_none());
        assert!(json["error"].is_string());
    }
}

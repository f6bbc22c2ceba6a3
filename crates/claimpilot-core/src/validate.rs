//! Two-stage decoding of model output into [`StructuredResult`].
//!
//! Stage 1 is structural: strip markdown fences, parse JSON into the wire
//! shape for the task. Missing or ill-typed required fields fail here.
//! Stage 2 is semantic: every enum-valued field must be in its declared
//! value set, `confidence` must be in `[0, 1]`, and list fields default to
//! empty when absent or null. All semantic failures for one payload are
//! collected so a repair prompt can name every problem at once.

use serde::Deserialize;
use thiserror::Error;

use crate::results::{
    ContactDirective, CoverageAnalysis, CoverageIssue, FileNote, FollowUpTrigger,
    InvestigationChecklist, QuestionSet, StructuredResult, TaskItem, TriageResult,
};
use crate::types::{
    ClaimType, Complexity, CoverageStatus, HandlerLevel, Priority, TaskType,
};

/// Why a model payload was rejected.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Not parseable as the expected JSON shape.
    #[error("structural: {0}")]
    Structural(String),

    /// Parseable, but field values violate the schema.
    #[error("semantic: {}", .0.join("; "))]
    Semantic(Vec<String>),
}

impl ValidationError {
    /// Flat list of problems, suitable for a repair instruction.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::Structural(msg) => vec![msg.clone()],
            Self::Semantic(reasons) => reasons.clone(),
        }
    }
}

/// Decodes raw model output into the structured result for `task`.
pub fn decode(task: TaskType, raw: &str) -> Result<StructuredResult, ValidationError> {
    let body = strip_fences(raw);
    match task {
        TaskType::ClaimTriage => decode_checklist(body).map(StructuredResult::Checklist),
        TaskType::QuestionGeneration => decode_questions(body).map(StructuredResult::Questions),
        TaskType::CoverageAnalysis => decode_coverage(body).map(StructuredResult::Coverage),
        TaskType::FileNotes => decode_file_note(body).map(StructuredResult::FileNote),
    }
}

/// Strips a markdown code fence (```json ... ``` or ``` ... ```) and any
/// prose around it. Without a fence, trims to the outermost JSON object.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(open) = trimmed.find("```") {
        let after = &trimmed[open + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(close) = after.find("```") {
            return after[..close].trim();
        }
        return after.trim();
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].trim(),
        _ => trimmed,
    }
}

fn parse_wire<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ValidationError> {
    serde_json::from_str(body).map_err(|e| ValidationError::Structural(e.to_string()))
}

/// Accumulates semantic problems across one payload.
#[derive(Default)]
struct Problems(Vec<String>);

impl Problems {
    fn push(&mut self, reason: String) {
        self.0.push(reason);
    }

    fn enum_value<T>(
        &mut self,
        field: &str,
        value: &str,
        parse: impl Fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Option<T> {
        match parse(value) {
            Some(v) => Some(v),
            None => {
                self.push(format!(
                    "{field} must be one of [{}], got \"{value}\"",
                    allowed.join(", ")
                ));
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match (self.0.is_empty(), value) {
            (true, Some(v)) => Ok(v),
            (_, _) => Err(ValidationError::Semantic(self.0)),
        }
    }
}

// Wire shapes keep enum slots as strings and lists optional so structural
// and semantic failures stay distinguishable.

#[derive(Deserialize)]
struct WireTriage {
    claim_type: String,
    confidence: f64,
    severity_assessment: String,
    complexity_rating: String,
    recommended_handler_level: String,
    key_concerns: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct WireTaskItem {
    task: String,
    priority: String,
    deadline_guidance: String,
    category: String,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct WireContact {
    party: String,
    reason: String,
    priority: String,
}

#[derive(Deserialize)]
struct WireChecklist {
    triage: WireTriage,
    immediate_tasks: Option<Vec<WireTaskItem>>,
    short_term_tasks: Option<Vec<WireTaskItem>>,
    ongoing_tasks: Option<Vec<WireTaskItem>>,
    documents_to_request: Option<Vec<String>>,
    parties_to_contact: Option<Vec<WireContact>>,
}

#[derive(Deserialize)]
struct WireTrigger {
    #[serde(rename = "if")]
    condition: String,
    #[serde(rename = "then")]
    follow_up: String,
}

#[derive(Deserialize)]
struct WireQuestions {
    party_type: String,
    liability_questions: Option<Vec<String>>,
    damages_questions: Option<Vec<String>>,
    coverage_questions: Option<Vec<String>>,
    follow_up_triggers: Option<Vec<WireTrigger>>,
}

#[derive(Deserialize)]
struct WireIssue {
    issue_type: String,
    description: String,
    severity: String,
    action_required: String,
    questions_to_resolve: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct WireCoverage {
    coverage_status: String,
    coverage_issues: Option<Vec<WireIssue>>,
    liability_issues: Option<Vec<WireIssue>>,
    key_coverage_points: Option<Vec<String>>,
    key_liability_questions: Option<Vec<String>>,
    red_flags: Option<Vec<String>>,
    recommended_reserves_range: Option<String>,
}

#[derive(Deserialize)]
struct WireFileNote {
    note_date: String,
    claim_number: String,
    summary: String,
    detailed_notes: String,
    action_plan: Option<Vec<String>>,
    reserve_recommendation: Option<String>,
    follow_up_date: String,
}

fn check_triage(wire: WireTriage, problems: &mut Problems) -> Option<TriageResult> {
    let claim_type = problems.enum_value(
        "triage.claim_type",
        &wire.claim_type,
        ClaimType::parse,
        ClaimType::VALUES,
    );
    let complexity = problems.enum_value(
        "triage.complexity_rating",
        &wire.complexity_rating,
        Complexity::parse,
        Complexity::VALUES,
    );
    let handler = problems.enum_value(
        "triage.recommended_handler_level",
        &wire.recommended_handler_level,
        HandlerLevel::parse,
        HandlerLevel::VALUES,
    );
    if !(0.0..=1.0).contains(&wire.confidence) {
        problems.push(format!(
            "triage.confidence must be between 0 and 1, got {}",
            wire.confidence
        ));
    }
    Some(TriageResult {
        claim_type: claim_type?,
        confidence: wire.confidence,
        severity_assessment: wire.severity_assessment,
        complexity_rating: complexity?,
        recommended_handler_level: handler?,
        key_concerns: wire.key_concerns.unwrap_or_default(),
    })
}

fn check_task_items(
    field: &str,
    wire: Vec<WireTaskItem>,
    problems: &mut Problems,
) -> Vec<TaskItem> {
    wire.into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let priority = problems.enum_value(
                &format!("{field}[{i}].priority"),
                &item.priority,
                Priority::parse,
                Priority::VALUES,
            )?;
            Some(TaskItem {
                task: item.task,
                priority,
                deadline_guidance: item.deadline_guidance,
                category: item.category,
                notes: item.notes,
            })
        })
        .collect()
}

fn decode_checklist(body: &str) -> Result<InvestigationChecklist, ValidationError> {
    let wire: WireChecklist = parse_wire(body)?;
    let mut problems = Problems::default();

    let triage = check_triage(wire.triage, &mut problems);
    let immediate = check_task_items(
        "immediate_tasks",
        wire.immediate_tasks.unwrap_or_default(),
        &mut problems,
    );
    let short_term = check_task_items(
        "short_term_tasks",
        wire.short_term_tasks.unwrap_or_default(),
        &mut problems,
    );
    let ongoing = check_task_items(
        "ongoing_tasks",
        wire.ongoing_tasks.unwrap_or_default(),
        &mut problems,
    );
    let contacts: Vec<ContactDirective> = wire
        .parties_to_contact
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, c)| {
            let priority = problems.enum_value(
                &format!("parties_to_contact[{i}].priority"),
                &c.priority,
                Priority::parse,
                Priority::VALUES,
            )?;
            Some(ContactDirective {
                party: c.party,
                reason: c.reason,
                priority,
            })
        })
        .collect();

    let checklist = triage.map(|triage| InvestigationChecklist {
        triage,
        immediate_tasks: immediate,
        short_term_tasks: short_term,
        ongoing_tasks: ongoing,
        documents_to_request: wire.documents_to_request.unwrap_or_default(),
        parties_to_contact: contacts,
    });
    problems.finish(checklist)
}

fn decode_questions(body: &str) -> Result<QuestionSet, ValidationError> {
    let wire: WireQuestions = parse_wire(body)?;
    let mut problems = Problems::default();
    if wire.party_type.trim().is_empty() {
        problems.push("party_type must not be empty".to_string());
    }
    let questions = QuestionSet {
        party_type: wire.party_type,
        liability_questions: wire.liability_questions.unwrap_or_default(),
        damages_questions: wire.damages_questions.unwrap_or_default(),
        coverage_questions: wire.coverage_questions.unwrap_or_default(),
        follow_up_triggers: wire
            .follow_up_triggers
            .unwrap_or_default()
            .into_iter()
            .map(|t| FollowUpTrigger {
                condition: t.condition,
                follow_up: t.follow_up,
            })
            .collect(),
    };
    problems.finish(Some(questions))
}

fn check_issues(field: &str, wire: Vec<WireIssue>, problems: &mut Problems) -> Vec<CoverageIssue> {
    wire.into_iter()
        .enumerate()
        .filter_map(|(i, issue)| {
            let severity = problems.enum_value(
                &format!("{field}[{i}].severity"),
                &issue.severity,
                Priority::parse,
                Priority::VALUES,
            )?;
            Some(CoverageIssue {
                issue_type: issue.issue_type,
                description: issue.description,
                severity,
                action_required: issue.action_required,
                questions_to_resolve: issue.questions_to_resolve.unwrap_or_default(),
            })
        })
        .collect()
}

fn decode_coverage(body: &str) -> Result<CoverageAnalysis, ValidationError> {
    let wire: WireCoverage = parse_wire(body)?;
    let mut problems = Problems::default();

    let status = problems.enum_value(
        "coverage_status",
        &wire.coverage_status,
        CoverageStatus::parse,
        CoverageStatus::VALUES,
    );
    let coverage_issues = check_issues(
        "coverage_issues",
        wire.coverage_issues.unwrap_or_default(),
        &mut problems,
    );
    let liability_issues = check_issues(
        "liability_issues",
        wire.liability_issues.unwrap_or_default(),
        &mut problems,
    );

    let analysis = status.map(|coverage_status| CoverageAnalysis {
        coverage_status,
        coverage_issues,
        liability_issues,
        key_coverage_points: wire.key_coverage_points.unwrap_or_default(),
        key_liability_questions: wire.key_liability_questions.unwrap_or_default(),
        red_flags: wire.red_flags.unwrap_or_default(),
        recommended_reserves_range: wire.recommended_reserves_range,
    });
    problems.finish(analysis)
}

fn decode_file_note(body: &str) -> Result<FileNote, ValidationError> {
    let wire: WireFileNote = parse_wire(body)?;
    let mut problems = Problems::default();
    if wire.summary.trim().is_empty() {
        problems.push("summary must not be empty".to_string());
    }
    let note = FileNote {
        note_date: wire.note_date,
        claim_number: wire.claim_number,
        summary: wire.summary,
        detailed_notes: wire.detailed_notes,
        action_plan: wire.action_plan.unwrap_or_default(),
        reserve_recommendation: wire.reserve_recommendation,
        follow_up_date: wire.follow_up_date,
    };
    problems.finish(Some(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checklist_payload() -> serde_json::Value {
        json!({
            "triage": {
                "claim_type": "auto_bi",
                "confidence": 0.85,
                "severity_assessment": "moderate rear-end collision with soft tissue injury",
                "complexity_rating": "moderate",
                "recommended_handler_level": "standard",
                "key_concerns": ["possible prior injury"]
            },
            "immediate_tasks": [{
                "task": "Contact insured for recorded statement",
                "priority": "high",
                "deadline_guidance": "within 24 hours",
                "category": "contact",
                "notes": null
            }],
            "short_term_tasks": [],
            "ongoing_tasks": [],
            "documents_to_request": ["police report"],
            "parties_to_contact": [{
                "party": "claimant",
                "reason": "recorded statement",
                "priority": "high"
            }]
        })
    }

    #[test]
    fn test_decode_valid_checklist() {
        let raw = checklist_payload().to_string();
        let result = decode(TaskType::ClaimTriage, &raw).unwrap();
        let checklist = result.into_checklist().unwrap();
        assert_eq!(checklist.triage.claim_type, ClaimType::AutoBi);
        assert_eq!(checklist.immediate_tasks.len(), 1);
        assert_eq!(checklist.immediate_tasks[0].priority, Priority::High);
    }

    #[test]
    fn test_fenced_payload_decodes() {
        let raw = format!(
            "Here is the checklist:\n```json\n{}\n```\nLet me know.",
            checklist_payload()
        );
        assert!(decode(TaskType::ClaimTriage, &raw).is_ok());
    }

    #[test]
    fn test_bare_fence_decodes() {
        let raw = format!("```\n{}\n```", checklist_payload());
        assert!(decode(TaskType::ClaimTriage, &raw).is_ok());
    }

    #[test]
    fn test_missing_required_field_is_structural() {
        let mut payload = checklist_payload();
        payload["triage"]
            .as_object_mut()
            .unwrap()
            .remove("claim_type");
        let err = decode(TaskType::ClaimTriage, &payload.to_string()).unwrap_err();
        assert!(matches!(err, ValidationError::Structural(_)));
    }

    #[test]
    fn test_not_json_is_structural() {
        let err = decode(TaskType::ClaimTriage, "I cannot produce JSON today").unwrap_err();
        assert!(matches!(err, ValidationError::Structural(_)));
    }

    #[test]
    fn test_unknown_enum_value_is_semantic() {
        let mut payload = checklist_payload();
        payload["triage"]["claim_type"] = json!("auto_collision");
        let err = decode(TaskType::ClaimTriage, &payload.to_string()).unwrap_err();
        match err {
            ValidationError::Semantic(reasons) => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("auto_collision"));
                assert!(reasons[0].contains("auto_bi"));
            }
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn test_confidence_out_of_range_is_semantic() {
        let mut payload = checklist_payload();
        payload["triage"]["confidence"] = json!(1.7);
        let err = decode(TaskType::ClaimTriage, &payload.to_string()).unwrap_err();
        assert!(matches!(err, ValidationError::Semantic(_)));
    }

    #[test]
    fn test_all_semantic_problems_reported_together() {
        let mut payload = checklist_payload();
        payload["triage"]["claim_type"] = json!("boat");
        payload["triage"]["confidence"] = json!(-0.2);
        payload["immediate_tasks"][0]["priority"] = json!("urgent");
        let err = decode(TaskType::ClaimTriage, &payload.to_string()).unwrap_err();
        assert_eq!(err.reasons().len(), 3);
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let mut payload = checklist_payload();
        payload["documents_to_request"] = json!(null);
        payload["ongoing_tasks"] = json!(null);
        let checklist = decode(TaskType::ClaimTriage, &payload.to_string())
            .unwrap()
            .into_checklist()
            .unwrap();
        assert!(checklist.documents_to_request.is_empty());
        assert!(checklist.ongoing_tasks.is_empty());
    }

    #[test]
    fn test_decode_question_set() {
        let raw = json!({
            "party_type": "claimant",
            "liability_questions": ["Describe the moments before impact."],
            "damages_questions": ["What treatment have you received?"],
            "coverage_questions": [],
            "follow_up_triggers": [
                {"if": "prior injury mentioned", "then": "request prior treatment records"}
            ]
        })
        .to_string();
        let questions = decode(TaskType::QuestionGeneration, &raw)
            .unwrap()
            .into_questions()
            .unwrap();
        assert_eq!(questions.follow_up_triggers.len(), 1);
        assert_eq!(
            questions.follow_up_triggers[0].condition,
            "prior injury mentioned"
        );
    }

    #[test]
    fn test_decode_coverage_analysis() {
        let raw = json!({
            "coverage_status": "issue_identified",
            "coverage_issues": [{
                "issue_type": "coverage",
                "description": "loss date near policy inception",
                "severity": "high",
                "action_required": "verify bound date",
                "questions_to_resolve": ["When was the policy bound?"]
            }],
            "liability_issues": [],
            "key_coverage_points": ["BI limit 100/300"],
            "key_liability_questions": ["Was the insured cited?"],
            "red_flags": [],
            "recommended_reserves_range": "$15,000 - $30,000"
        })
        .to_string();
        let analysis = decode(TaskType::CoverageAnalysis, &raw)
            .unwrap()
            .into_coverage()
            .unwrap();
        assert_eq!(analysis.coverage_status, CoverageStatus::IssueIdentified);
        assert_eq!(analysis.coverage_issues.len(), 1);
    }

    #[test]
    fn test_decode_file_note() {
        let raw = json!({
            "note_date": "2025-03-03",
            "claim_number": "[CLAIM_NUMBER_1]",
            "summary": "FNOL received, coverage pending",
            "detailed_notes": "Insured reports rear-end collision.",
            "action_plan": ["order police report"],
            "reserve_recommendation": null,
            "follow_up_date": "2025-03-10"
        })
        .to_string();
        let note = decode(TaskType::FileNotes, &raw)
            .unwrap()
            .into_file_note()
            .unwrap();
        assert_eq!(note.follow_up_date, "2025-03-10");
        assert!(note.reserve_recommendation.is_none());
    }

    #[test]
    fn test_empty_summary_is_semantic() {
        let raw = json!({
            "note_date": "2025-03-03",
            "claim_number": "X",
            "summary": "  ",
            "detailed_notes": "d",
            "action_plan": [],
            "follow_up_date": "2025-03-10"
        })
        .to_string();
        let err = decode(TaskType::FileNotes, &raw).unwrap_err();
        assert!(matches!(err, ValidationError::Semantic(_)));
    }
}

//! Structured results produced by the validator, one shape per task.
//!
//! `StructuredResult` is a closed sum so the validator's field and enum
//! checks stay exhaustive: a new task family means a new variant here, a
//! new wire shape in `validate`, and nothing else.

use serde::{Deserialize, Serialize};

use crate::types::{ClaimType, Complexity, CoverageStatus, HandlerLevel, Priority};

/// Claim triage and classification, nested inside the checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub claim_type: ClaimType,

    /// Classification confidence in `[0, 1]`
    pub confidence: f64,

    pub severity_assessment: String,
    pub complexity_rating: Complexity,
    pub recommended_handler_level: HandlerLevel,

    #[serde(default)]
    pub key_concerns: Vec<String>,
}

/// One task in the investigation checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub task: String,
    pub priority: Priority,
    pub deadline_guidance: String,

    /// Task category (contact, document, review, legal, medical)
    pub category: String,

    #[serde(default)]
    pub notes: Option<String>,
}

/// A party to contact and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDirective {
    pub party: String,
    pub reason: String,
    pub priority: Priority,
}

/// Complete investigation checklist for a new claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationChecklist {
    pub triage: TriageResult,

    /// Tasks for the first 24-48 hours
    pub immediate_tasks: Vec<TaskItem>,
    /// Tasks for the first week
    pub short_term_tasks: Vec<TaskItem>,
    /// Ongoing investigation tasks
    pub ongoing_tasks: Vec<TaskItem>,

    pub documents_to_request: Vec<String>,
    pub parties_to_contact: Vec<ContactDirective>,
}

/// An if-then follow-up question trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpTrigger {
    #[serde(rename = "if")]
    pub condition: String,
    #[serde(rename = "then")]
    pub follow_up: String,
}

/// Investigation questions for one party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub party_type: String,
    pub liability_questions: Vec<String>,
    pub damages_questions: Vec<String>,
    pub coverage_questions: Vec<String>,

    #[serde(default)]
    pub follow_up_triggers: Vec<FollowUpTrigger>,
}

/// An identified coverage or liability issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageIssue {
    /// Issue kind (coverage, liability, damages)
    pub issue_type: String,
    pub description: String,
    pub severity: Priority,
    pub action_required: String,

    #[serde(default)]
    pub questions_to_resolve: Vec<String>,
}

/// Coverage and liability analysis for a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    pub coverage_status: CoverageStatus,

    #[serde(default)]
    pub coverage_issues: Vec<CoverageIssue>,
    #[serde(default)]
    pub liability_issues: Vec<CoverageIssue>,

    pub key_coverage_points: Vec<String>,
    pub key_liability_questions: Vec<String>,

    #[serde(default)]
    pub red_flags: Vec<String>,

    #[serde(default)]
    pub recommended_reserves_range: Option<String>,
}

/// A drafted claim file note / diary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNote {
    pub note_date: String,
    pub claim_number: String,
    pub summary: String,
    pub detailed_notes: String,
    pub action_plan: Vec<String>,

    #[serde(default)]
    pub reserve_recommendation: Option<String>,

    pub follow_up_date: String,
}

/// The validated result of one task, one variant per task family.
///
/// `TriageResult` is the fifth typed shape; it travels inside the
/// checklist the same way the intake workflow reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredResult {
    Checklist(InvestigationChecklist),
    Questions(QuestionSet),
    Coverage(CoverageAnalysis),
    FileNote(FileNote),
}

impl StructuredResult {
    pub fn into_checklist(self) -> Option<InvestigationChecklist> {
        match self {
            Self::Checklist(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_questions(self) -> Option<QuestionSet> {
        match self {
            Self::Questions(q) => Some(q),
            _ => None,
        }
    }

    pub fn into_coverage(self) -> Option<CoverageAnalysis> {
        match self {
            Self::Coverage(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_file_note(self) -> Option<FileNote> {
        match self {
            Self::FileNote(n) => Some(n),
            _ => None,
        }
    }
}

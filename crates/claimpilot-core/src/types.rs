//! Enumerated value sets shared across the pipeline.
//!
//! Every enum here is a closed set: the validator rejects any model output
//! whose enum-valued fields fall outside these sets, so additions must go
//! through this module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported claim types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Auto bodily injury
    AutoBi,
    /// Auto property damage
    AutoPd,
    /// General liability
    Gl,
    /// Workers compensation
    Wc,
    /// Property claims
    Property,
    /// Professional liability
    Professional,
}

impl ClaimType {
    /// Wire names accepted from model output.
    pub const VALUES: &'static [&'static str] =
        &["auto_bi", "auto_pd", "gl", "wc", "property", "professional"];

    /// Parse a wire name. Returns `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto_bi" => Some(Self::AutoBi),
            "auto_pd" => Some(Self::AutoPd),
            "gl" => Some(Self::Gl),
            "wc" => Some(Self::Wc),
            "property" => Some(Self::Property),
            "professional" => Some(Self::Professional),
            _ => None,
        }
    }

    /// The wire name for this claim type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoBi => "auto_bi",
            Self::AutoPd => "auto_pd",
            Self::Gl => "gl",
            Self::Wc => "wc",
            Self::Property => "property",
            Self::Professional => "professional",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const VALUES: &'static [&'static str] = &["high", "medium", "low"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Coverage evaluation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Confirmed,
    Pending,
    IssueIdentified,
    Denied,
}

impl CoverageStatus {
    pub const VALUES: &'static [&'static str] =
        &["confirmed", "pending", "issue_identified", "denied"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "pending" => Some(Self::Pending),
            "issue_identified" => Some(Self::IssueIdentified),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

/// Complexity rating assigned during triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub const VALUES: &'static [&'static str] = &["simple", "moderate", "complex"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(Self::Simple),
            "moderate" => Some(Self::Moderate),
            "complex" => Some(Self::Complex),
            _ => None,
        }
    }
}

/// Recommended handler experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerLevel {
    Junior,
    Standard,
    Senior,
    Specialist,
}

impl HandlerLevel {
    pub const VALUES: &'static [&'static str] = &["junior", "standard", "senior", "specialist"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "junior" => Some(Self::Junior),
            "standard" => Some(Self::Standard),
            "senior" => Some(Self::Senior),
            "specialist" => Some(Self::Specialist),
            _ => None,
        }
    }
}

/// The four task families the pipeline routes.
///
/// Each task has its own prompt template, result schema, and routing
/// policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Claim triage and investigation checklist
    ClaimTriage,
    /// Investigation question generation
    QuestionGeneration,
    /// Coverage and liability analysis
    CoverageAnalysis,
    /// File note / diary entry drafting
    FileNotes,
}

impl TaskType {
    /// All task families in routing-table order.
    pub const ALL: [TaskType; 4] = [
        TaskType::ClaimTriage,
        TaskType::QuestionGeneration,
        TaskType::CoverageAnalysis,
        TaskType::FileNotes,
    ];

    /// Stable wire/config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimTriage => "claim_triage",
            Self::QuestionGeneration => "question_generation",
            Self::CoverageAnalysis => "coverage_analysis",
            Self::FileNotes => "file_notes",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_type_round_trip() {
        for name in ClaimType::VALUES {
            let parsed = ClaimType::parse(name).unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
        assert!(ClaimType::parse("auto_collision").is_none());
    }

    #[test]
    fn test_serde_names_match_parse_names() {
        let json = serde_json::to_string(&CoverageStatus::IssueIdentified).unwrap();
        assert_eq!(json, "\"issue_identified\"");
        let back: CoverageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CoverageStatus::IssueIdentified);
    }

    #[test]
    fn test_priority_closed_set() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert!(Priority::parse("urgent").is_none());
    }

    #[test]
    fn test_task_type_names() {
        assert_eq!(TaskType::ClaimTriage.as_str(), "claim_triage");
        assert_eq!(TaskType::ALL.len(), 4);
    }
}

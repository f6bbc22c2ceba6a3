//! Inbound domain request types and their invariants.
//!
//! Requests are validated before anything else happens: a request that
//! fails validation never reaches redaction or a provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ClaimType;

/// Errors from domain request validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid request: date_of_loss {date_of_loss} is after reported_date {reported_date}")]
    LossAfterReport {
        date_of_loss: NaiveDate,
        reported_date: NaiveDate,
    },

    #[error("invalid request: policy effective_date {effective} is not before expiration_date {expiration}")]
    PolicyWindowInverted {
        effective: NaiveDate,
        expiration: NaiveDate,
    },

    #[error("invalid request: jurisdiction '{0}' is not a 2-letter state code")]
    BadJurisdiction(String),

    #[error("invalid request: {field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Policy information attached to an investigation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyInfo {
    /// Policy number (redacted before leaving the system)
    pub policy_number: String,

    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,

    /// Named coverage limits, e.g. `{"bi_per_person": 100000}`
    #[serde(default)]
    pub coverage_limits: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub deductible: Option<f64>,

    /// Named insureds (redacted before leaving the system)
    #[serde(default)]
    pub named_insureds: Vec<String>,

    #[serde(default)]
    pub additional_insureds: Vec<String>,

    #[serde(default)]
    pub endorsements: Vec<String>,
}

/// First Notice of Loss input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnolInput {
    #[serde(default)]
    pub claim_number: Option<String>,

    pub date_of_loss: NaiveDate,

    #[serde(default)]
    pub time_of_loss: Option<String>,

    pub location: String,
    pub description: String,
    pub reported_by: String,
    pub reported_date: NaiveDate,

    #[serde(default)]
    pub injuries_reported: bool,
    #[serde(default)]
    pub injury_description: Option<String>,

    #[serde(default)]
    pub property_damage_reported: bool,
    #[serde(default)]
    pub property_damage_description: Option<String>,

    /// Witness names (redacted before leaving the system)
    #[serde(default)]
    pub witnesses: Vec<String>,

    #[serde(default)]
    pub police_report_number: Option<String>,
}

/// Main request for claim analysis and coverage analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimInvestigationRequest {
    pub fnol: FnolInput,
    pub policy: PolicyInfo,

    /// State jurisdiction (2-letter code)
    pub jurisdiction: String,

    /// Claim type if known; otherwise classified during triage
    #[serde(default)]
    pub claim_type: Option<ClaimType>,

    #[serde(default)]
    pub additional_context: Option<String>,

    /// Preferred provider id; absent or "auto" lets the router decide
    #[serde(default)]
    pub preferred_model: Option<String>,
}

/// Request for generating investigation questions for one party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGenerationRequest {
    pub claim_summary: String,
    pub claim_type: ClaimType,

    /// Party to question: claimant, witness, insured, employer
    pub party_type: String,

    #[serde(default)]
    pub specific_issues: Vec<String>,

    #[serde(default)]
    pub preferred_model: Option<String>,
}

/// Request for drafting a claim file note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNoteRequest {
    pub claim_number: String,
    pub actions_completed: Vec<String>,

    #[serde(default)]
    pub contact_summaries: Vec<ContactSummary>,

    #[serde(default)]
    pub findings: Vec<String>,

    #[serde(default)]
    pub next_steps: Vec<String>,

    #[serde(default)]
    pub preferred_model: Option<String>,
}

/// One contact made during investigation, summarized for the file note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSummary {
    pub party: String,
    pub summary: String,
}

fn validate_jurisdiction(code: &str) -> Result<(), RequestError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(RequestError::BadJurisdiction(code.to_string()))
    }
}

impl ClaimInvestigationRequest {
    /// Check the domain invariants. Invalid requests never reach a provider.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.fnol.date_of_loss > self.fnol.reported_date {
            return Err(RequestError::LossAfterReport {
                date_of_loss: self.fnol.date_of_loss,
                reported_date: self.fnol.reported_date,
            });
        }
        if self.policy.effective_date >= self.policy.expiration_date {
            return Err(RequestError::PolicyWindowInverted {
                effective: self.policy.effective_date,
                expiration: self.policy.expiration_date,
            });
        }
        validate_jurisdiction(&self.jurisdiction)?;
        if self.fnol.description.trim().is_empty() {
            return Err(RequestError::EmptyField {
                field: "fnol.description",
            });
        }
        Ok(())
    }
}

impl QuestionGenerationRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.claim_summary.trim().is_empty() {
            return Err(RequestError::EmptyField {
                field: "claim_summary",
            });
        }
        if self.party_type.trim().is_empty() {
            return Err(RequestError::EmptyField {
                field: "party_type",
            });
        }
        Ok(())
    }
}

impl FileNoteRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.claim_number.trim().is_empty() {
            return Err(RequestError::EmptyField {
                field: "claim_number",
            });
        }
        if self.actions_completed.is_empty() {
            return Err(RequestError::EmptyField {
                field: "actions_completed",
            });
        }
        Ok(())
    }
}

//! # claimpilot-core
//!
//! Deterministic core of the claim-intake pipeline.
//!
//! This crate answers three questions without ever touching the network:
//! - What does a claim request look like, and is it well-formed?
//! - Which spans of a text are PII, and how are they redacted reversibly?
//! - Is a model response a valid structured result for its task?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same input always produces the same redaction and
//!    the same validation verdict
//! 2. **No LLM calls**: provider invocation lives in `claimpilot-runtime`
//! 3. **Request-scoped**: redaction maps are plain values owned by one
//!    request's lifetime, never shared or persisted
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimpilot_core::redaction::Redactor;
//!
//! let redactor = Redactor::new();
//! let redaction = redactor.redact("John Smith (SSN: 123-45-6789)");
//! assert_eq!(redaction.text, "[PERSON_1] (SSN: [SSN_1])");
//! ```

pub mod policy;
pub mod redaction;
pub mod request;
pub mod results;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use policy::{RoutingPolicy, AUTO_PROVIDER};
pub use redaction::{PiiCategory, Redaction, RedactionMap, Redactor};
pub use request::{
    ClaimInvestigationRequest, FileNoteRequest, FnolInput, PolicyInfo, QuestionGenerationRequest,
    RequestError,
};
pub use results::{
    ContactDirective, CoverageAnalysis, CoverageIssue, FileNote, FollowUpTrigger,
    InvestigationChecklist, QuestionSet, StructuredResult, TaskItem, TriageResult,
};
pub use types::{ClaimType, Complexity, CoverageStatus, HandlerLevel, Priority, TaskType};
pub use validate::{decode, ValidationError};

//! # claimpilot-runtime
//!
//! Provider invocation, routing, and orchestration for the claim-intake
//! pipeline.
//!
//! Everything deterministic lives in `claimpilot-core`; this crate owns
//! the parts that talk to the network:
//! - LLM provider clients behind one `LlmProvider` trait
//! - a deterministic router that walks providers in policy order with
//!   timeouts and one repair turn per attempt
//! - the `ClaimAnalyzer` orchestrator tying redaction, prompts, routing,
//!   and response envelopes together
//!
//! ## Important
//!
//! PII is redacted before any text reaches a provider, and redaction
//! maps never leave the request that created them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimpilot_runtime::{ClaimAnalyzer, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file("claimpilot.yaml".as_ref())?;
//! let analyzer = ClaimAnalyzer::from_config(&config);
//!
//! let envelope = analyzer.analyze_claim(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&envelope)?);
//! ```

pub mod analyzer;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod status;

pub use analyzer::{
    ChecklistEnvelope, ClaimAnalyzer, CoverageEnvelope, FileNoteEnvelope, QuestionsEnvelope,
};
pub use config::{ConfigError, RuntimeConfig};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry,
};
pub use router::{AttemptOutcome, InvocationRecord, RouteSuccess, RouterError, TaskRouter};
pub use status::{ProviderProfile, StatusReport};

//! Deterministic task router with timeout-bounded fallback.
//!
//! One call = one ordered walk over the policy's candidate providers.
//! Each candidate gets a single attempt (invoke, validate, at most one
//! repair turn) under `tokio::time::timeout`; the first validated success
//! wins and any failure advances to the next candidate. A per-request
//! wall-clock ceiling bounds the whole walk. Failed candidates are never
//! retried within a request.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use claimpilot_core::{validate, RoutingPolicy, StructuredResult, TaskType};

use crate::prompts;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// How one provider attempt ended.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success,
    Timeout,
    RateLimited,
    AuthError,
    TransportError(String),
    InvalidOutput(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => write!(f, "success"),
            AttemptOutcome::Timeout => write!(f, "timeout"),
            AttemptOutcome::RateLimited => write!(f, "rate_limited"),
            AttemptOutcome::AuthError => write!(f, "auth_error"),
            AttemptOutcome::TransportError(msg) => write!(f, "transport_error: {msg}"),
            AttemptOutcome::InvalidOutput(msg) => write!(f, "invalid_output: {msg}"),
        }
    }
}

/// Audit record of one provider attempt within a request.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    pub provider: String,
    pub task: TaskType,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    pub repair_attempted: bool,
    /// Byte length of the last raw response, `None` when the provider
    /// never answered (transport failure or timeout).
    pub raw_len: Option<usize>,
}

/// Everything one candidate attempt produced, for the record.
struct Attempt {
    result: Option<StructuredResult>,
    outcome: AttemptOutcome,
    repair_attempted: bool,
    raw_len: Option<usize>,
}

/// A validated result together with who produced it.
#[derive(Debug)]
pub struct RouteSuccess {
    pub result: StructuredResult,
    pub provider: String,
    pub model: String,
    pub attempts: Vec<InvocationRecord>,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("all providers exhausted for {task}: {}", describe_attempts(.attempts))]
    AllProvidersExhausted {
        task: TaskType,
        attempts: Vec<InvocationRecord>,
    },
}

/// Ordered "provider: outcome" pairs for the exhaustion message.
fn describe_attempts(attempts: &[InvocationRecord]) -> String {
    if attempts.is_empty() {
        return "no candidates were available".to_string();
    }
    attempts
        .iter()
        .map(|record| format!("{}: {}", record.provider, record.outcome))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Routes one task to the first provider that returns a valid result.
pub struct TaskRouter {
    providers: BTreeMap<String, Arc<dyn LlmProvider>>,
    policy: RoutingPolicy,
    per_attempt_timeout: Duration,
    request_ceiling: Duration,
    completion: CompletionConfig,
}

impl TaskRouter {
    pub fn new(
        providers: BTreeMap<String, Arc<dyn LlmProvider>>,
        policy: RoutingPolicy,
        per_attempt_timeout: Duration,
        request_ceiling: Duration,
        completion: CompletionConfig,
    ) -> Self {
        Self {
            providers,
            policy,
            per_attempt_timeout,
            request_ceiling,
            completion,
        }
    }

    /// Names of the providers this router can actually invoke.
    pub fn available_providers(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Runs the fallback walk for one task.
    ///
    /// `preferred` is an explicit caller preference; `None` or `"auto"`
    /// defers to the routing policy. Dropping the returned future cancels
    /// any in-flight provider call.
    pub async fn route(
        &self,
        task: TaskType,
        preferred: Option<&str>,
        system: &str,
        user: &str,
    ) -> Result<RouteSuccess, RouterError> {
        let started = Instant::now();
        let available = self.available_providers();
        let candidates = self.policy.candidates(task, preferred, &available);
        debug!(%task, ?candidates, "routing task");

        let mut attempts: Vec<InvocationRecord> = Vec::new();
        for name in candidates {
            let elapsed = started.elapsed();
            let Some(remaining) = self.request_ceiling.checked_sub(elapsed) else {
                warn!(%task, ?elapsed, "request ceiling reached, abandoning remaining candidates");
                break;
            };
            if remaining.is_zero() {
                warn!(%task, ?elapsed, "request ceiling reached, abandoning remaining candidates");
                break;
            }
            let Some(provider) = self.providers.get(&name) else {
                continue;
            };

            let budget = remaining.min(self.per_attempt_timeout);
            let started_at = Utc::now();
            let call = self.attempt(provider.as_ref(), task, system, user, budget);
            let mut attempt = match timeout(budget, call).await {
                Ok(attempt) => attempt,
                // Late results of a timed-out attempt are dropped with the future.
                Err(_) => Attempt {
                    result: None,
                    outcome: AttemptOutcome::Timeout,
                    repair_attempted: false,
                    raw_len: None,
                },
            };
            attempts.push(InvocationRecord {
                provider: name.clone(),
                task,
                started_at,
                ended_at: Utc::now(),
                outcome: attempt.outcome.clone(),
                repair_attempted: attempt.repair_attempted,
                raw_len: attempt.raw_len,
            });

            match attempt.result.take() {
                Some(result) => {
                    info!(%task, provider = %name, "task completed");
                    return Ok(RouteSuccess {
                        result,
                        provider: name,
                        model: provider.model().to_string(),
                        attempts,
                    });
                }
                None => {
                    warn!(
                        %task,
                        provider = %name,
                        outcome = %attempt.outcome,
                        "provider attempt failed, falling back"
                    );
                }
            }
        }

        Err(RouterError::AllProvidersExhausted { task, attempts })
    }

    /// One provider attempt: invoke, validate, and repair at most once.
    ///
    /// The repair turn re-invokes the same provider with the invalid
    /// output echoed back and the schema restated; it shares the
    /// attempt's deadline. Whatever happens, the returned `Attempt`
    /// carries the repair flag and the length of the last raw response
    /// for the invocation record.
    async fn attempt(
        &self,
        provider: &dyn LlmProvider,
        task: TaskType,
        system: &str,
        user: &str,
        budget: Duration,
    ) -> Attempt {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let config = CompletionConfig {
            timeout: budget,
            ..self.completion.clone()
        };

        let mut repair_attempted = false;
        let mut raw_len = None;
        loop {
            let response = match provider.complete(messages.clone(), &config).await {
                Ok(response) => response,
                Err(err) => {
                    return Attempt {
                        result: None,
                        outcome: map_provider_error(err),
                        repair_attempted,
                        raw_len,
                    };
                }
            };
            raw_len = Some(response.content.len());

            match validate::decode(task, &response.content) {
                Ok(result) => {
                    return Attempt {
                        result: Some(result),
                        outcome: AttemptOutcome::Success,
                        repair_attempted,
                        raw_len,
                    };
                }
                Err(validation) if !repair_attempted => {
                    repair_attempted = true;
                    debug!(
                        %task,
                        provider = provider.name(),
                        error = %validation,
                        "invalid output, requesting one repair"
                    );
                    let instruction = prompts::repair_instruction(task, &validation.reasons());
                    messages.push(ChatMessage::assistant(response.content));
                    messages.push(ChatMessage::user(instruction));
                }
                Err(validation) => {
                    return Attempt {
                        result: None,
                        outcome: AttemptOutcome::InvalidOutput(validation.to_string()),
                        repair_attempted,
                        raw_len,
                    };
                }
            }
        }
    }
}

fn map_provider_error(err: ProviderError) -> AttemptOutcome {
    match err {
        ProviderError::Timeout(_) => AttemptOutcome::Timeout,
        ProviderError::RateLimited { .. } => AttemptOutcome::RateLimited,
        ProviderError::AuthError => AttemptOutcome::AuthError,
        ProviderError::HttpError(msg) => AttemptOutcome::TransportError(msg),
        ProviderError::ApiError { status, message } => {
            AttemptOutcome::TransportError(format!("{status}: {message}"))
        }
        ProviderError::ParseError(msg) => AttemptOutcome::TransportError(msg),
        ProviderError::NotConfigured(msg) => AttemptOutcome::TransportError(msg),
    }
}

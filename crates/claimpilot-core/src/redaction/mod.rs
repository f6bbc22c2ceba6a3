//! Reversible PII redaction.
//!
//! [`Redactor::redact`] replaces detected PII spans with positional
//! placeholders of the form `[CATEGORY_n]` and returns a [`RedactionMap`]
//! that can restore the original values. The pass is deterministic: the
//! same input always yields the same output and map, and placeholders are
//! numbered left to right within each category. Repeated occurrences of
//! the same value in the same category reuse one placeholder.
//!
//! Redaction is idempotent because no placeholder matches any detection
//! pattern, so running a second pass over already-redacted text is a no-op.

mod patterns;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Categories of personally identifiable information the redactor detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Person,
    Ssn,
    Phone,
    Email,
    Ip,
    CreditCard,
    ClaimNumber,
    PolicyNumber,
    MedicalRecordNumber,
    Address,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 10] = [
        PiiCategory::Person,
        PiiCategory::Ssn,
        PiiCategory::Phone,
        PiiCategory::Email,
        PiiCategory::Ip,
        PiiCategory::CreditCard,
        PiiCategory::ClaimNumber,
        PiiCategory::PolicyNumber,
        PiiCategory::MedicalRecordNumber,
        PiiCategory::Address,
    ];

    /// Uppercase token used inside placeholders.
    pub fn token(&self) -> &'static str {
        match self {
            PiiCategory::Person => "PERSON",
            PiiCategory::Ssn => "SSN",
            PiiCategory::Phone => "PHONE",
            PiiCategory::Email => "EMAIL",
            PiiCategory::Ip => "IP",
            PiiCategory::CreditCard => "CREDIT_CARD",
            PiiCategory::ClaimNumber => "CLAIM_NUMBER",
            PiiCategory::PolicyNumber => "POLICY_NUMBER",
            PiiCategory::MedicalRecordNumber => "MEDICAL_RECORD_NUMBER",
            PiiCategory::Address => "ADDRESS",
        }
    }
}

/// One redacted value and the placeholder that stands in for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionEntry {
    pub category: PiiCategory,
    pub sequence: u32,
    pub original: String,
}

impl RedactionEntry {
    pub fn placeholder(&self) -> String {
        format!("[{}_{}]", self.category.token(), self.sequence)
    }
}

/// Placeholder-to-original mapping produced by a redaction pass.
///
/// The map never leaves the process boundary it was created in; callers
/// hold it for the lifetime of the request and drop it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionMap {
    entries: Vec<RedactionEntry>,
}

impl RedactionMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[RedactionEntry] {
        &self.entries
    }

    /// Looks up the original value behind a placeholder.
    pub fn original_for(&self, placeholder: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.placeholder() == placeholder)
            .map(|e| e.original.as_str())
    }

    /// Replaces every placeholder in `text` with its original value.
    pub fn restore(&self, text: &str) -> String {
        let mut restored = text.to_string();
        for entry in &self.entries {
            restored = restored.replace(&entry.placeholder(), &entry.original);
        }
        restored
    }

    /// Number of distinct values redacted per category, for logging.
    pub fn counts_by_category(&self) -> HashMap<PiiCategory, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Redacted text together with its reversal map.
#[derive(Debug, Clone)]
pub struct Redaction {
    pub text: String,
    pub map: RedactionMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: usize,
    category: PiiCategory,
}

/// Deterministic, regex-driven PII redactor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor;

impl Redactor {
    pub fn new() -> Self {
        Redactor
    }

    /// Runs one redaction pass over `text`.
    pub fn redact(&self, text: &str) -> Redaction {
        let mut candidates = self.collect_candidates(text);

        // Leftmost span wins; on a tie the longer span wins. Category order
        // breaks exact ties so the pass is fully deterministic.
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.category.cmp(&b.category))
        });

        let mut kept: Vec<Candidate> = Vec::new();
        let mut cursor = 0;
        for candidate in candidates {
            if candidate.start >= cursor {
                cursor = candidate.end;
                kept.push(candidate);
            }
        }

        let mut entries: Vec<RedactionEntry> = Vec::new();
        let mut seen: HashMap<(PiiCategory, String), usize> = HashMap::new();
        let mut counters: HashMap<PiiCategory, u32> = HashMap::new();
        let mut redacted = String::with_capacity(text.len());
        let mut last = 0;

        for span in kept {
            redacted.push_str(&text[last..span.start]);
            let value = &text[span.start..span.end];
            let key = (span.category, value.to_string());
            let index = match seen.get(&key) {
                Some(&i) => i,
                None => {
                    let counter = counters.entry(span.category).or_insert(0);
                    *counter += 1;
                    // A placeholder that already occurs literally in the
                    // input would make restore() rewrite it too. Skip past
                    // any such sequence numbers.
                    while text.contains(&format!("[{}_{}]", span.category.token(), counter)) {
                        *counter += 1;
                    }
                    entries.push(RedactionEntry {
                        category: span.category,
                        sequence: *counter,
                        original: value.to_string(),
                    });
                    let i = entries.len() - 1;
                    seen.insert(key, i);
                    i
                }
            };
            redacted.push_str(&entries[index].placeholder());
            last = span.end;
        }
        redacted.push_str(&text[last..]);

        let map = RedactionMap { entries };
        if !map.is_empty() {
            debug!(
                redacted_values = map.len(),
                categories = ?map.counts_by_category(),
                "redacted PII from text"
            );
        }
        Redaction { text: redacted, map }
    }

    fn collect_candidates(&self, text: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        let structural: [(PiiCategory, &regex::Regex); 9] = [
            (PiiCategory::Ssn, &patterns::SSN),
            (PiiCategory::Phone, &patterns::PHONE),
            (PiiCategory::Email, &patterns::EMAIL),
            (PiiCategory::Ip, &patterns::IP),
            (PiiCategory::CreditCard, &patterns::CREDIT_CARD),
            (PiiCategory::ClaimNumber, &patterns::CLAIM_NUMBER),
            (PiiCategory::PolicyNumber, &patterns::POLICY_NUMBER),
            (
                PiiCategory::MedicalRecordNumber,
                &patterns::MEDICAL_RECORD_NUMBER,
            ),
            (PiiCategory::Address, &patterns::ADDRESS),
        ];
        for (category, regex) in structural {
            for m in regex.find_iter(text) {
                candidates.push(Candidate {
                    start: m.start(),
                    end: m.end(),
                    category,
                });
            }
        }

        for m in patterns::TITLED_NAME.find_iter(text) {
            candidates.push(Candidate {
                start: m.start(),
                end: m.end(),
                category: PiiCategory::Person,
            });
        }
        for caps in patterns::CAPITALIZED_PAIR.captures_iter(text) {
            let full = caps.get(0).unwrap();
            let first = caps.get(1).unwrap();
            if patterns::pair_is_name(full.as_str(), first.as_str()) {
                candidates.push(Candidate {
                    start: full.start(),
                    end: full.end(),
                    category: PiiCategory::Person,
                });
            }
        }

        candidates
    }
}

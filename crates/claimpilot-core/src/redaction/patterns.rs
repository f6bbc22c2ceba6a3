//! Detection patterns for PII categories.
//!
//! Structural categories are plain regexes. PERSON is heuristic: a
//! title-plus-name pattern and a capitalized-pair pattern filtered through
//! stoplists, since names have no structure to anchor on.
//!
//! Placeholders (`[CATEGORY_n]`) deliberately match none of these
//! patterns, which is what makes redaction idempotent.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Social Security Number (XXX-XX-XXXX with optional separators)
    pub static ref SSN: Regex = Regex::new(
        r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b"
    ).unwrap();

    /// US phone number with optional country code and punctuation
    pub static ref PHONE: Regex = Regex::new(
        r"\b(?:\+1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b"
    ).unwrap();

    /// Email address (RFC 5322 simplified)
    pub static ref EMAIL: Regex = Regex::new(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"
    ).unwrap();

    /// IPv4 address
    pub static ref IP: Regex = Regex::new(
        r"\b(?:\d{1,3}\.){3}\d{1,3}\b"
    ).unwrap();

    /// Credit card number (four groups of four, optional separators)
    pub static ref CREDIT_CARD: Regex = Regex::new(
        r"\b(?:\d{4}[-\s]?){3}\d{4}\b"
    ).unwrap();

    /// Claim number formats (CLM-..., CLAIM#..., CL...)
    pub static ref CLAIM_NUMBER: Regex = Regex::new(
        r"\b(?i:CLM|CLAIM|CL)[-#]?\d{6,12}\b"
    ).unwrap();

    /// Policy number formats (POL-..., POLICY#..., PL...)
    pub static ref POLICY_NUMBER: Regex = Regex::new(
        r"\b(?i:POLICY|POL|PL)[-#]?\d{6,12}\b"
    ).unwrap();

    /// Medical record number (MRN-..., MR#...)
    pub static ref MEDICAL_RECORD_NUMBER: Regex = Regex::new(
        r"\b(?i:MRN|MR)[-#]?\d{6,10}\b"
    ).unwrap();

    /// Street address (number + street name + suffix)
    pub static ref ADDRESS: Regex = Regex::new(
        r"\b\d{1,5}\s+[\w\s]{1,30}(?i:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Court|Ct|Circle|Cir)\.?\b"
    ).unwrap();

    /// Title + name: "Mr. John Smith", "Dr. Jane Doe"
    pub static ref TITLED_NAME: Regex = Regex::new(
        r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b"
    ).unwrap();

    /// Two adjacent capitalized words that might be a name
    pub static ref CAPITALIZED_PAIR: Regex = Regex::new(
        r"\b([A-Z][a-z]+)\s+([A-Z][a-z]+)\b"
    ).unwrap();
}

/// Capitalized pairs that are vocabulary, not names.
pub const PAIR_STOPLIST: &[&str] = &[
    "First Notice",
    "Notice Loss",
    "Property Damage",
    "Bodily Injury",
    "General Liability",
    "Workers Compensation",
    "Professional Liability",
    "United States",
    "New York",
    "Los Angeles",
    "San Francisco",
    "San Diego",
    "Police Report",
    "Medical Records",
    "Insurance Company",
];

/// Leading words that mark a capitalized pair as sentence structure
/// rather than a name ("The claimant", "After Monday", ...).
pub const LEADING_WORD_STOPLIST: &[&str] = &[
    "The", "This", "That", "These", "Those", "A", "An", "It", "He", "She", "They", "We", "You",
    "If", "When", "While", "After", "Before", "During", "Our", "Their", "His", "Her", "On", "At",
    "In", "Insurance", "Policy", "Claim", "Claimant", "Coverage", "Incident", "Vehicle",
    "Witness", "Injury", "Date", "Time", "Location", "Reported", "Please", "Contact",
];

/// Whether a capitalized pair should be treated as a person name.
pub fn pair_is_name(full: &str, first_word: &str) -> bool {
    !PAIR_STOPLIST.contains(&full) && !LEADING_WORD_STOPLIST.contains(&first_word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssn_matches() {
        assert!(SSN.is_match("123-45-6789"));
        assert!(SSN.is_match("123 45 6789"));
        assert!(SSN.is_match("123456789"));
        assert!(!SSN.is_match("12-345-6789"));
    }

    #[test]
    fn test_phone_matches() {
        assert!(PHONE.is_match("555-123-4567"));
        assert!(PHONE.is_match("+1 555 123 4567"));
        assert!(PHONE.is_match("555.123.4567"));
        assert!(!PHONE.is_match("12345"));
    }

    #[test]
    fn test_email_matches() {
        assert!(EMAIL.is_match("john.doe@example.com"));
        assert!(EMAIL.is_match("user+tag@domain.co.uk"));
        assert!(!EMAIL.is_match("not an email"));
    }

    #[test]
    fn test_claim_and_policy_numbers() {
        assert!(CLAIM_NUMBER.is_match("CLM-123456789"));
        assert!(CLAIM_NUMBER.is_match("claim#123456"));
        assert!(POLICY_NUMBER.is_match("POL-987654321"));
        assert!(MEDICAL_RECORD_NUMBER.is_match("MRN-1234567"));
        assert!(!CLAIM_NUMBER.is_match("CLM-123"));
    }

    #[test]
    fn test_address_matches() {
        assert!(ADDRESS.is_match("123 Main Street"));
        assert!(ADDRESS.is_match("4455 Sunset Blvd"));
        assert!(!ADDRESS.is_match("Main Street"));
    }

    #[test]
    fn test_name_heuristics() {
        assert!(TITLED_NAME.is_match("Mr. John Smith"));
        assert!(CAPITALIZED_PAIR.is_match("John Smith"));
        assert!(pair_is_name("John Smith", "John"));
        assert!(!pair_is_name("Property Damage", "Property"));
        assert!(!pair_is_name("The Claimant", "The"));
    }

    #[test]
    fn test_placeholders_do_not_match() {
        for placeholder in [
            "[PERSON_1]",
            "[SSN_1]",
            "[PHONE_2]",
            "[EMAIL_1]",
            "[IP_1]",
            "[CREDIT_CARD_1]",
            "[CLAIM_NUMBER_1]",
            "[POLICY_NUMBER_3]",
            "[MEDICAL_RECORD_NUMBER_1]",
            "[ADDRESS_1]",
        ] {
            assert!(!SSN.is_match(placeholder), "{placeholder}");
            assert!(!PHONE.is_match(placeholder), "{placeholder}");
            assert!(!EMAIL.is_match(placeholder), "{placeholder}");
            assert!(!IP.is_match(placeholder), "{placeholder}");
            assert!(!CREDIT_CARD.is_match(placeholder), "{placeholder}");
            assert!(!CLAIM_NUMBER.is_match(placeholder), "{placeholder}");
            assert!(!POLICY_NUMBER.is_match(placeholder), "{placeholder}");
            assert!(!MEDICAL_RECORD_NUMBER.is_match(placeholder), "{placeholder}");
            assert!(!ADDRESS.is_match(placeholder), "{placeholder}");
            assert!(!TITLED_NAME.is_match(placeholder), "{placeholder}");
            assert!(!CAPITALIZED_PAIR.is_match(placeholder), "{placeholder}");
        }
    }
}

//! Identifier normalization.
//!
//! Turns raw user input into the canonical string that gets hashed, and
//! classifies it into a [`RecordType`]. Input that fits no scheme comes back
//! as `RecordType::Invalid` rather than an error; the invalid type is rejected
//! later, when an address or instruction would be built from it.

use crate::constants::{MAX_HANDLE_LENGTH, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};
use crate::errors::Result;
use crate::hasher::{hash_identifier, IdentifierDigest};
use crate::state::RecordType;

/// A classified, normalized identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub record_type: RecordType,
    pub canonical: String,
}

impl Identifier {
    pub fn is_valid(&self) -> bool {
        self.record_type != RecordType::Invalid
    }

    /// Digest of the canonical form. Fails for unclassified input.
    pub fn digest(&self) -> Result<IdentifierDigest> {
        self.record_type.ensure_valid()?;
        hash_identifier(&self.canonical)
    }
}

/// Classify and normalize raw input.
pub fn normalize(raw: &str) -> Identifier {
    let trimmed = raw.trim();

    if let Some(canonical) = normalize_phone(trimmed) {
        return Identifier {
            record_type: RecordType::Phone,
            canonical,
        };
    }
    if let Some(canonical) = normalize_handle(trimmed) {
        return Identifier {
            record_type: RecordType::Handle,
            canonical,
        };
    }
    if let Some(canonical) = normalize_email(trimmed) {
        return Identifier {
            record_type: RecordType::Email,
            canonical,
        };
    }

    Identifier {
        record_type: RecordType::Invalid,
        canonical: trimmed.to_string(),
    }
}

/// E.164: `+` then 7-15 digits, no leading zero. Common separators are dropped.
fn normalize_phone(input: &str) -> Option<String> {
    let rest = input.strip_prefix('+')?;
    let digits: String = rest
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if digits.len() < MIN_PHONE_DIGITS || digits.len() > MAX_PHONE_DIGITS {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
        return None;
    }
    Some(format!("+{}", digits))
}

fn normalize_email(input: &str) -> Option<String> {
    if input.chars().any(char::is_whitespace) {
        return None;
    }
    let lowered = input.to_lowercase();
    let (local, domain) = lowered.split_once('@')?;

    if local.is_empty() || domain.contains('@') {
        return None;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    Some(lowered)
}

fn normalize_handle(input: &str) -> Option<String> {
    let name = input.strip_prefix('@')?.to_lowercase();
    if name.is_empty() || name.len() > MAX_HANDLE_LENGTH {
        return None;
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return None;
    }
    Some(format!("@{}", name))
}

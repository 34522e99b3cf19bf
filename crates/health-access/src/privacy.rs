//! One-way pseudonymization of personal identifiers
//!
//! These are digests, not encryption: nothing here can be reversed.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Marker placed in front of every pseudonym
pub const PSEUDONYM_PREFIX: &str = "***";

/// Number of hex characters of the digest kept in a pseudonym
pub const PSEUDONYM_HEX_LEN: usize = 16;

/// Fields treated as directly identifying by default
pub const DEFAULT_SENSITIVE_FIELDS: [&str; 3] = ["personal_id", "username", "license_number"];

/// Lowercase hex SHA-256 of `value`
pub fn digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stable, irreversible stand-in for an identifier
pub fn pseudonymize(value: &str) -> String {
    let digest = digest(value);
    format!("{}{}", PSEUDONYM_PREFIX, &digest[..PSEUDONYM_HEX_LEN])
}

/// Replaces sensitive fields of a record with pseudonyms
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pseudonymizer {
    fields: BTreeSet<String>,
}

impl Default for Pseudonymizer {
    fn default() -> Self {
        Self::with_fields(DEFAULT_SENSITIVE_FIELDS)
    }
}

impl Pseudonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_sensitive(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Copy of `record` with every sensitive field pseudonymized
    ///
    /// Non-string values are hashed by their JSON text.
    pub fn pseudonymize_record(&self, record: &Map<String, Value>) -> Map<String, Value> {
        record
            .iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive(key) {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    Value::String(pseudonymize(&text))
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect()
    }
}

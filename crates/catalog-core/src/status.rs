//! # Status Phrase Table
//!
//! Canonical `status code → public phrase` mapping used when an error's
//! message is private. Defaults to the IANA reason phrases shipped with
//! the `http` crate; individual codes can be overridden at construction.

use std::collections::HashMap;

use http::StatusCode;

/// Phrase used for codes with no canonical reason.
const UNKNOWN_STATUS_PHRASE: &str = "Unknown Status";

/// Read-only `status → phrase` table.
#[derive(Debug, Clone, Default)]
pub struct StatusPhrases {
    overrides: HashMap<u16, String>,
}

impl StatusPhrases {
    /// Table with the canonical phrases only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the phrase for one status code.
    pub fn with_phrase(mut self, status: u16, phrase: impl Into<String>) -> Self {
        self.overrides.insert(status, phrase.into());
        self
    }

    /// Public phrase for `status`.
    pub fn phrase(&self, status: u16) -> &str {
        if let Some(phrase) = self.overrides.get(&status) {
            return phrase;
        }
        StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or(UNKNOWN_STATUS_PHRASE)
    }
}

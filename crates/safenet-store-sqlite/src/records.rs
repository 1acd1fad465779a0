// crates/safenet-store-sqlite/src/records.rs
// ============================================================================
// Module: Record Types
// Description: Row shapes accepted by the record store.
// Purpose: Carry normalized submissions from callers into insert operations.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Plain row values for the two record kinds. Identity and `created_at` are
//! assigned by the store at insert time, so neither appears here.

use std::fmt;

/// Name stored when a submission does not carry one.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Store-assigned row identity.
///
/// # Invariants
/// - Unique within its table and strictly increasing across inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw `SQLite` rowid.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw `SQLite` rowid.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quiz result ready to append to `quiz_results`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuizResult {
    /// Free-text label of the quiz taker.
    pub name: String,
    /// Points scored.
    pub score: i64,
    /// Points available.
    pub max_score: i64,
    /// Opaque caller serialization of the quiz answers.
    pub details: String,
}

impl Default for NewQuizResult {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            score: 0,
            max_score: 0,
            details: String::new(),
        }
    }
}

/// Contact message ready to append to `contacts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    /// Free-text sender name.
    pub name: String,
    /// Sender email, stored without format checks.
    pub email: String,
    /// Message body.
    pub message: String,
}

impl Default for NewContactMessage {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            email: String::new(),
            message: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_NAME;
    use super::NewContactMessage;
    use super::NewQuizResult;
    use super::RecordId;

    #[test]
    fn defaults_match_anonymous_empty_submission() {
        let quiz = NewQuizResult::default();
        assert_eq!(quiz.name, DEFAULT_NAME);
        assert_eq!((quiz.score, quiz.max_score), (0, 0));
        assert!(quiz.details.is_empty());

        let contact = NewContactMessage::default();
        assert_eq!(contact.name, DEFAULT_NAME);
        assert!(contact.email.is_empty());
        assert!(contact.message.is_empty());
    }

    #[test]
    fn record_ids_order_by_rowid() {
        assert!(RecordId::from_raw(1) < RecordId::from_raw(2));
        assert_eq!(RecordId::from_raw(7).to_string(), "7");
    }
}

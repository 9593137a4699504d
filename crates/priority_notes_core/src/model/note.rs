//! Note record and identifier states.
//!
//! # Invariants
//! - Equality and hashing use `id` only.
//! - `text` is non-empty after trimming; callers enforce this through
//!   `normalize_note_text` before construction.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

const PROVISIONAL_PREFIX: &str = "local-";

/// Opaque note identifier, unique within a scope.
///
/// A note starts with a provisional id generated locally and may later carry
/// the canonical id assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a process-unique provisional id: `local-<millis>-<uuid>`.
    pub fn provisional(now_ms: i64) -> Self {
        Self(format!(
            "{PROVISIONAL_PREFIX}{now_ms}-{}",
            Uuid::new_v4().simple()
        ))
    }

    /// Returns whether this id was generated locally and never confirmed.
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One priority note.
///
/// Serialized as `{id, text, createdAt, done}` to match the durable storage
/// layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub done: bool,
}

impl Note {
    /// Creates an open (not done) note.
    pub fn new(id: NoteId, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            text: text.into(),
            created_at,
            done: false,
        }
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Trims raw composer input; `None` means the input must be rejected.
pub fn normalize_note_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_note_text, Note, NoteId};

    #[test]
    fn provisional_ids_are_unique_and_flagged() {
        let first = NoteId::provisional(1_000);
        let second = NoteId::provisional(1_000);
        assert_ne!(first, second);
        assert!(first.is_provisional());
        assert!(!NoteId::from("srv-1").is_provisional());
    }

    #[test]
    fn equality_uses_id_only() {
        let a = Note::new(NoteId::from("n1"), "first", 1);
        let mut b = Note::new(NoteId::from("n1"), "other text", 2);
        b.done = true;
        assert_eq!(a, b);
        assert_ne!(a, Note::new(NoteId::from("n2"), "first", 1));
    }

    #[test]
    fn normalize_rejects_blank_and_trims() {
        assert_eq!(normalize_note_text("   \t\n"), None);
        assert_eq!(normalize_note_text("  Buy milk ").as_deref(), Some("Buy milk"));
    }

    #[test]
    fn json_shape_uses_camel_case_and_defaults_done() {
        let note = Note::new(NoteId::from("n1"), "x", 42);
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["createdAt"], 42);
        assert_eq!(value["done"], false);

        let parsed: Note =
            serde_json::from_str(r#"{"id":"n2","text":"y","createdAt":7}"#).unwrap();
        assert!(!parsed.done);
        assert_eq!(parsed.created_at, 7);
    }
}

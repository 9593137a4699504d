//! Scope-partitioned note collection.
//!
//! # Responsibility
//! - Hold one ordered (newest-first) note sequence per scope.
//! - Decode persisted blobs leniently so old or damaged data never blocks
//!   startup.
//!
//! # Invariants
//! - All five scope keys are present at all times.
//! - Unknown keys in persisted data are dropped; malformed scopes decode to
//!   empty sequences.

use crate::model::note::Note;
use crate::model::scope::Scope;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from every scope to its newest-first note sequence.
///
/// Not `PartialEq`: `Note` equality is by id only, so comparing two
/// collections would ignore text and completion. Compare serialized
/// documents instead.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ScopedCollection {
    scopes: BTreeMap<Scope, Vec<Note>>,
}

impl Default for ScopedCollection {
    fn default() -> Self {
        Self {
            scopes: Scope::ALL
                .into_iter()
                .map(|scope| (scope, Vec::new()))
                .collect(),
        }
    }
}

impl ScopedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence for `scope`; never absent.
    pub fn notes(&self, scope: Scope) -> &[Note] {
        self.scopes.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn notes_mut(&mut self, scope: Scope) -> &mut Vec<Note> {
        self.scopes.entry(scope).or_default()
    }

    /// Total notes across all scopes.
    pub fn len(&self) -> usize {
        self.scopes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates scopes in display order with their sequences.
    pub fn iter(&self) -> impl Iterator<Item = (Scope, &[Note])> + '_ {
        Scope::ALL
            .into_iter()
            .map(move |scope| (scope, self.notes(scope)))
    }

    /// Builds a collection from an arbitrary JSON value.
    ///
    /// A non-object root yields the default collection.
    pub fn from_value_lenient(value: Value) -> Self {
        let mut collection = Self::default();
        let Value::Object(mut object) = value else {
            warn!("event=collection_decode module=model status=fallback reason=root_not_object");
            return collection;
        };

        for scope in Scope::ALL {
            let Some(raw) = object.remove(scope.as_str()) else {
                continue;
            };
            match serde_json::from_value::<Vec<Note>>(raw) {
                Ok(notes) => *collection.notes_mut(scope) = notes,
                Err(err) => warn!(
                    "event=collection_decode module=model status=fallback scope={} error={}",
                    scope, err
                ),
            }
        }

        collection
    }

    /// Parses a persisted JSON blob; malformed JSON yields the default.
    pub fn from_json_lenient(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value_lenient(value),
            Err(err) => {
                warn!(
                    "event=collection_decode module=model status=fallback reason=invalid_json error={}",
                    err
                );
                Self::default()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ScopedCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value_lenient(value))
    }
}

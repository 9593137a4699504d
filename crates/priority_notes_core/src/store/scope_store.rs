//! Scope store: the single writer of the scoped collection.
//!
//! # Invariants
//! - `notes_for` never returns an absent sequence.
//! - A mutation that changes state is flushed before the call returns.
//! - Operations on unknown identifiers are no-ops: no flush, no event.
//! - A failed flush never rolls back the in-memory change.

use crate::model::collection::ScopedCollection;
use crate::model::note::{Note, NoteId};
use crate::model::scope::Scope;
use crate::storage::{NoteStorage, StorageError};
use log::{debug, error, info};

/// What a flushed change did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted(NoteId),
    IdentifierReplaced { old: NoteId, new: NoteId },
    Removed(NoteId),
    Toggled { id: NoteId, done: bool },
    Cleared,
}

/// Event delivered to subscribers after a change is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub scope: Scope,
    pub kind: ChangeKind,
    /// Whether the flush that followed the change succeeded.
    pub persisted: bool,
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreChange, &ScopedCollection)>;

/// Holds the current collection and persists it through `S`.
pub struct ScopeStore<S: NoteStorage> {
    storage: S,
    collection: ScopedCollection,
    selected: Scope,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    flush_failures: usize,
    last_flush_error: Option<String>,
}

impl<S: NoteStorage> ScopeStore<S> {
    /// Builds the store from one `load` of `storage`.
    pub fn load(storage: S) -> Self {
        let collection = storage.load();
        info!(
            "event=store_load module=store status=ok notes={}",
            collection.len()
        );
        Self {
            storage,
            collection,
            selected: Scope::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            flush_failures: 0,
            last_flush_error: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn collection(&self) -> &ScopedCollection {
        &self.collection
    }

    /// Current sequence for `scope`, newest first.
    pub fn notes_for(&self, scope: Scope) -> &[Note] {
        self.collection.notes(scope)
    }

    pub fn contains(&self, scope: Scope, id: &NoteId) -> bool {
        self.position(scope, id).is_some()
    }

    /// Newest creation timestamp in `scope`, if any.
    pub fn latest_created_at(&self, scope: Scope) -> Option<i64> {
        self.notes_for(scope).iter().map(|note| note.created_at).max()
    }

    pub fn selected_scope(&self) -> Scope {
        self.selected
    }

    /// Changes the view selection. Not persisted.
    pub fn select_scope(&mut self, scope: Scope) {
        self.selected = scope;
    }

    /// Prepends `note` to `scope`.
    pub fn insert(&mut self, scope: Scope, note: Note) {
        let id = note.id.clone();
        self.collection.notes_mut(scope).insert(0, note);
        self.commit(scope, ChangeKind::Inserted(id));
    }

    /// Rewrites `old_id` to `new_id` in place. Returns whether a note matched.
    pub fn replace_identifier(&mut self, scope: Scope, old_id: &NoteId, new_id: NoteId) -> bool {
        let Some(index) = self.position(scope, old_id) else {
            debug!(
                "event=store_replace_id module=store status=skipped scope={} reason=not_found",
                scope
            );
            return false;
        };
        self.collection.notes_mut(scope)[index].id = new_id.clone();
        self.commit(
            scope,
            ChangeKind::IdentifierReplaced {
                old: old_id.clone(),
                new: new_id,
            },
        );
        true
    }

    /// Deletes the note with `id`. Returns whether a note matched.
    pub fn remove(&mut self, scope: Scope, id: &NoteId) -> bool {
        let Some(index) = self.position(scope, id) else {
            return false;
        };
        self.collection.notes_mut(scope).remove(index);
        self.commit(scope, ChangeKind::Removed(id.clone()));
        true
    }

    /// Flips the completion flag. Returns the new flag, or `None` if absent.
    pub fn toggle_done(&mut self, scope: Scope, id: &NoteId) -> Option<bool> {
        let index = self.position(scope, id)?;
        let note = &mut self.collection.notes_mut(scope)[index];
        note.done = !note.done;
        let done = note.done;
        self.commit(
            scope,
            ChangeKind::Toggled {
                id: id.clone(),
                done,
            },
        );
        Some(done)
    }

    /// Empties `scope`; other scopes are untouched.
    pub fn clear(&mut self, scope: Scope) {
        self.collection.notes_mut(scope).clear();
        self.commit(scope, ChangeKind::Cleared);
    }

    /// Registers a listener called after every flushed change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreChange, &ScopedCollection) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Count of flushes that failed since load.
    pub fn flush_failures(&self) -> usize {
        self.flush_failures
    }

    pub fn last_flush_error(&self) -> Option<&str> {
        self.last_flush_error.as_deref()
    }

    fn position(&self, scope: Scope, id: &NoteId) -> Option<usize> {
        self.notes_for(scope).iter().position(|note| &note.id == id)
    }

    fn commit(&mut self, scope: Scope, kind: ChangeKind) {
        let persisted = match self.flush() {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=store_flush module=store status=error scope={} error={}",
                    scope, err
                );
                self.flush_failures += 1;
                self.last_flush_error = Some(err.to_string());
                false
            }
        };

        let change = StoreChange {
            scope,
            kind,
            persisted,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change, &self.collection);
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.storage.save(&self.collection)
    }
}

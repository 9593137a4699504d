//! Process-local `NoteStorage` used for in-memory-only mode.
//!
//! Handles are cheap clones sharing one blob, so a caller can keep a handle
//! for inspection after moving another into a store.

use super::{NoteStorage, StorageError, StorageResult};
use crate::model::collection::ScopedCollection;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct MemoryState {
    blob: RefCell<Option<String>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    reject_writes: Cell<bool>,
}

/// Serialized-blob store that lives only as long as the process.
#[derive(Clone, Default)]
pub struct MemoryNoteStorage {
    state: Rc<MemoryState>,
}

impl MemoryNoteStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw persisted blob.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.state.blob.replace(Some(raw.into()));
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.state.blob.borrow().clone()
    }

    /// Number of `load` calls served.
    pub fn reads(&self) -> usize {
        self.state.reads.get()
    }

    /// Number of successful `save` calls.
    pub fn writes(&self) -> usize {
        self.state.writes.get()
    }

    /// Makes subsequent writes fail with `StorageError::Unavailable`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.state.reject_writes.set(reject);
    }
}

impl NoteStorage for MemoryNoteStorage {
    fn load(&self) -> ScopedCollection {
        self.state.reads.set(self.state.reads.get() + 1);
        match self.state.blob.borrow().as_deref() {
            Some(raw) => ScopedCollection::from_json_lenient(raw),
            None => ScopedCollection::default(),
        }
    }

    fn save(&self, collection: &ScopedCollection) -> StorageResult<()> {
        if self.state.reject_writes.get() {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let raw = serde_json::to_string(collection)?;
        self.state.blob.replace(Some(raw));
        self.state.writes.set(self.state.writes.get() + 1);
        Ok(())
    }
}

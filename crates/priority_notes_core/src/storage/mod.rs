//! Persistence adapter for the scoped note collection.
//!
//! # Responsibility
//! - Load the full collection from durable storage at startup.
//! - Replace the full persisted collection after every mutation.
//!
//! # Invariants
//! - `load` performs exactly one read and never fails observably; any
//!   storage or decode problem yields the default collection.
//! - `save` performs exactly one whole-collection write under
//!   `STORAGE_KEY`.

use crate::db::DbError;
use crate::model::collection::ScopedCollection;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite_kv;

pub use memory::MemoryNoteStorage;
pub use sqlite_kv::SqliteNoteStorage;

/// Fixed namespace key the collection blob is stored under.
pub const STORAGE_KEY: &str = "priority-notes";

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure to write the collection to durable storage.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Encode(serde_json::Error),
    /// Backend refused the write (quota, read-only medium, ...).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "storage write failed: {err}"),
            Self::Encode(err) => write!(f, "failed to encode note collection: {err}"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Durable load/save contract for the whole scoped collection.
pub trait NoteStorage {
    /// Reads the persisted collection, defaulting on any failure.
    fn load(&self) -> ScopedCollection;

    /// Overwrites the persisted collection.
    fn save(&self, collection: &ScopedCollection) -> StorageResult<()>;
}

impl<T: NoteStorage + ?Sized> NoteStorage for Box<T> {
    fn load(&self) -> ScopedCollection {
        (**self).load()
    }

    fn save(&self, collection: &ScopedCollection) -> StorageResult<()> {
        (**self).save(collection)
    }
}

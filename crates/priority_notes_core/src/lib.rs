//! Scoped priority-note store with optimistic remote synchronization.
//!
//! Notes live in five fixed scopes, are persisted as one JSON document in a
//! SQLite key-value table, and are created optimistically: inserted locally
//! first, then confirmed or rolled back by the remote create call.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod sync;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, NotesConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::collection::ScopedCollection;
pub use model::note::{normalize_note_text, Note, NoteId};
pub use model::scope::{ParseScopeError, Scope};
pub use storage::{
    MemoryNoteStorage, NoteStorage, SqliteNoteStorage, StorageError, StorageResult, STORAGE_KEY,
};
pub use store::{ChangeKind, ScopeStore, StoreChange, SubscriptionId};
pub use sync::controller::{AddNoteOutcome, SharedStore, SyncController, SyncError};
pub use sync::http::HttpRemoteNotes;
pub use sync::remote::{
    CreateNoteRequest, CreateNoteResponse, RemoteError, RemoteNotes, RemoteResult,
};
pub use sync::state::{PendingCreate, SyncState, SyncStateError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

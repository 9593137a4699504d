//! SQLite key-value implementation of `NoteStorage`.

use super::{NoteStorage, StorageResult, STORAGE_KEY};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::collection::ScopedCollection;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Stores the serialized collection as one row of `kv_store`.
pub struct SqliteNoteStorage {
    conn: Connection,
    key: String,
}

impl SqliteNoteStorage {
    /// Wraps an already migrated connection, using `STORAGE_KEY`.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, STORAGE_KEY)
    }

    /// Wraps a migrated connection with a custom namespace key.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the raw persisted blob, if any. Used by diagnostics and tests.
    pub fn read_raw(&self) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                params![self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
    }
}

impl NoteStorage for SqliteNoteStorage {
    fn load(&self) -> ScopedCollection {
        match self.read_raw() {
            Ok(Some(raw)) => {
                let collection = ScopedCollection::from_json_lenient(&raw);
                debug!(
                    "event=storage_load module=storage status=ok backend=sqlite notes={}",
                    collection.len()
                );
                collection
            }
            Ok(None) => {
                debug!("event=storage_load module=storage status=empty backend=sqlite");
                ScopedCollection::default()
            }
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=fallback backend=sqlite error={}",
                    err
                );
                ScopedCollection::default()
            }
        }
    }

    fn save(&self, collection: &ScopedCollection) -> StorageResult<()> {
        let raw = serde_json::to_string(collection)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), raw],
        )?;
        debug!(
            "event=storage_save module=storage status=ok backend=sqlite bytes={}",
            raw.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteNoteStorage;
    use crate::db::open_db;
    use crate::model::collection::ScopedCollection;
    use crate::model::note::{Note, NoteId};
    use crate::model::scope::Scope;
    use crate::storage::NoteStorage;

    #[test]
    fn load_without_row_returns_default() {
        let storage = SqliteNoteStorage::open_in_memory().unwrap();
        assert!(storage.read_raw().unwrap().is_none());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn save_overwrites_single_row() {
        let storage = SqliteNoteStorage::open_in_memory().unwrap();
        let mut collection = ScopedCollection::default();
        storage.save(&collection).unwrap();

        collection
            .notes_mut(Scope::Week)
            .push(Note::new(NoteId::from("w1"), "plan", 5));
        storage.save(&collection).unwrap();

        let rows: i64 = storage
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(storage.load().notes(Scope::Week)[0].text, "plan");
    }

    #[test]
    fn corrupt_blob_loads_as_default() {
        let storage = SqliteNoteStorage::open_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, '{{{');",
                [storage.key()],
            )
            .unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn unreadable_table_loads_as_default() {
        // No migrations: `kv_store` does not exist, so every read fails.
        let storage = SqliteNoteStorage::new(rusqlite::Connection::open_in_memory().unwrap());
        assert!(storage.read_raw().is_err());

        let loaded = storage.load();
        assert!(loaded.is_empty());
        let value = serde_json::to_value(&loaded).unwrap();
        assert_eq!(value.as_object().map(|map| map.len()), Some(Scope::ALL.len()));
        assert!(storage.save(&ScopedCollection::default()).is_err());
    }

    #[test]
    fn custom_keys_share_a_file_without_mixing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.sqlite3");
        let work = SqliteNoteStorage::with_key(open_db(&path).unwrap(), "work");
        let home = SqliteNoteStorage::with_key(open_db(&path).unwrap(), "home");
        assert_eq!(work.key(), "work");

        let mut collection = ScopedCollection::default();
        collection
            .notes_mut(Scope::Today)
            .push(Note::new(NoteId::from("w1"), "ship", 1));
        work.save(&collection).unwrap();

        assert_eq!(work.load().notes(Scope::Today)[0].text, "ship");
        assert!(home.load().is_empty());
        assert!(SqliteNoteStorage::open(&path).unwrap().load().is_empty());
    }
}

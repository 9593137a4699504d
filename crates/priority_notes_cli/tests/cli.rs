use assert_cmd::Command;
use predicates::prelude::*;
use priority_notes_core::{Note, NoteId, NoteStorage, Scope, ScopedCollection, SqliteNoteStorage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config: PathBuf,
}

impl Env {
    /// Config pointing at a temp database and a create URL nothing listens on.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let create_url = format!("http://{}/api/priority-notes", listener.local_addr().unwrap());
        drop(listener);

        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "db_path = {:?}\nlog_dir = {:?}\ncreate_url = {:?}\nrequest_timeout_secs = 2\nlog_level = \"debug\"\n",
                dir.path().join("notes.sqlite3"),
                dir.path().join("logs"),
                create_url,
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("notes.sqlite3")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("priority-notes").unwrap();
        cmd.arg("--config").arg(&self.config);
        cmd
    }

    fn seed(&self, scope: Scope, notes: Vec<Note>) {
        seed_db(&self.db_path(), scope, notes);
    }
}

fn seed_db(path: &Path, scope: Scope, notes: Vec<Note>) {
    let storage = SqliteNoteStorage::open(path).unwrap();
    let mut collection = storage.load();
    *collection.notes_mut(scope) = notes;
    storage.save(&collection).unwrap();
}

fn load(env: &Env) -> ScopedCollection {
    SqliteNoteStorage::open(env.db_path()).unwrap().load()
}

#[test]
fn scopes_lists_all_five_in_order() {
    Command::cargo_bin("priority-notes")
        .unwrap()
        .arg("scopes")
        .assert()
        .success()
        .stdout("today\nweek\nmonth\nsemester\nyear\n");
}

#[test]
fn list_on_fresh_database_shows_empty_scopes() {
    let env = Env::new();
    env.cmd()
        .args(["list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[semester]\n(no notes)"));
}

#[test]
fn failed_sync_rolls_back_and_exits_non_zero() {
    let env = Env::new();
    env.cmd()
        .args(["add", "--scope", "today", "Buy", "milk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("removed from `today`"));

    assert!(load(&env).notes(Scope::Today).is_empty());
}

#[test]
fn blank_add_is_ignored() {
    let env = Env::new();
    env.cmd()
        .args(["add", "   "])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to add"));
}

#[test]
fn toggle_and_remove_work_on_seeded_notes() {
    let env = Env::new();
    env.seed(
        Scope::Week,
        vec![
            Note::new(NoteId::from("srv-2"), "Gym", 2),
            Note::new(NoteId::from("srv-1"), "Groceries", 1),
        ],
    );

    env.cmd()
        .args(["toggle", "--scope", "week", "srv-1"])
        .assert()
        .success()
        .stdout("srv-1 is now done\n");
    env.cmd()
        .args(["remove", "-s", "week", "srv-2"])
        .assert()
        .success();

    env.cmd()
        .args(["list", "--scope", "week"])
        .assert()
        .success()
        .stdout("[x] srv-1  Groceries\n");
}

#[test]
fn unknown_ids_are_reported_not_errors() {
    let env = Env::new();
    env.cmd()
        .args(["toggle", "--scope", "month", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no note ghost in month"));
}

#[test]
fn removed_note_cannot_be_toggled_afterwards() {
    let env = Env::new();
    env.seed(Scope::Semester, vec![Note::new(NoteId::from("s1"), "Thesis", 1)]);

    env.cmd()
        .args(["remove", "--scope", "semester", "s1"])
        .assert()
        .success()
        .stdout("removed s1\n");
    env.cmd()
        .args(["toggle", "--scope", "semester", "s1"])
        .assert()
        .success()
        .stdout("no note s1 in semester\n");
    assert!(load(&env).notes(Scope::Semester).is_empty());
}

#[test]
fn clear_requires_confirmation_and_touches_one_scope() {
    let env = Env::new();
    env.seed(Scope::Week, vec![Note::new(NoteId::from("w"), "weekly", 1)]);
    env.seed(Scope::Year, vec![Note::new(NoteId::from("y"), "yearly", 1)]);

    env.cmd()
        .args(["clear", "--scope", "week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(load(&env).notes(Scope::Week).len(), 1);

    env.cmd()
        .args(["clear", "--scope", "week", "--yes"])
        .assert()
        .success();
    let collection = load(&env);
    assert!(collection.notes(Scope::Week).is_empty());
    assert_eq!(collection.notes(Scope::Year).len(), 1);
}

#[test]
fn unknown_scope_is_a_usage_error() {
    let env = Env::new();
    env.cmd()
        .args(["list", "--scope", "decade"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("decade"));
}

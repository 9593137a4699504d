//! Terminal front end for the priority-note store.
//!
//! # Responsibility
//! - Map subcommands onto scope store and sync controller operations.
//! - Gate scope-wide clearing behind an explicit `--yes`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use priority_notes_core::{
    core_version, init_logging_from_config, HttpRemoteNotes, MemoryNoteStorage, Note, NoteId,
    NoteStorage, NotesConfig, Scope, ScopeStore, SqliteNoteStorage, SyncController,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Debug, Parser)]
#[command(name = "priority-notes", about = "Scoped priority notes", version)]
struct Cli {
    /// Config file (defaults to $PRIORITY_NOTES_CONFIG or the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes in one scope or all scopes.
    List {
        #[arg(long, short)]
        scope: Option<Scope>,
        /// Show every scope.
        #[arg(long, conflicts_with = "scope")]
        all: bool,
    },
    /// Add a note and sync it to the server.
    Add {
        #[command(flatten)]
        target: ScopeArg,
        /// Note text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Toggle a note's done flag.
    Toggle {
        #[command(flatten)]
        target: ScopeArg,
        id: String,
    },
    /// Delete a note.
    Remove {
        #[command(flatten)]
        target: ScopeArg,
        id: String,
    },
    /// Delete every note in a scope.
    Clear {
        #[command(flatten)]
        target: ScopeArg,
        /// Confirm the scope-wide delete.
        #[arg(long)]
        yes: bool,
    },
    /// Print the available scopes.
    Scopes,
    /// Print the core library version.
    Version,
}

#[derive(Debug, Args)]
struct ScopeArg {
    #[arg(long, short, default_value_t = Scope::Today)]
    scope: Scope,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Scopes => {
            for scope in Scope::ALL {
                println!("{scope}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Version => {
            println!("priority_notes_core version={}", core_version());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = NotesConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let storage = open_storage(&config);
    let store = Rc::new(RefCell::new(ScopeStore::load(storage)));
    let remote = HttpRemoteNotes::new(config.create_url.clone(), config.request_timeout)
        .context("failed to build remote client")?;
    let controller = SyncController::new(store, remote);

    match cli.command {
        Command::List { scope, all } => {
            let store = controller.store().borrow();
            let scopes = match (scope, all) {
                (_, true) => Scope::ALL.to_vec(),
                (Some(scope), false) => vec![scope],
                (None, false) => vec![store.selected_scope()],
            };
            for scope in scopes {
                print_scope(scope, store.notes_for(scope), all);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Add { target, text } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;

            let raw = text.join(" ");
            match runtime.block_on(controller.add_note(target.scope, &raw)) {
                Ok(Some(outcome)) => {
                    println!("added {} to {}", outcome.note_id(), target.scope);
                    Ok(ExitCode::SUCCESS)
                }
                Ok(None) => {
                    println!("nothing to add");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Toggle { target, id } => {
            match controller.toggle_done(target.scope, &NoteId::from(id.as_str())) {
                Some(done) => println!("{id} is now {}", if done { "done" } else { "open" }),
                None => println!("no note {id} in {}", target.scope),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Remove { target, id } => {
            if controller.remove_note(target.scope, &NoteId::from(id.as_str())) {
                println!("removed {id}");
            } else {
                println!("no note {id} in {}", target.scope);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Clear { target, yes } => {
            if !yes {
                bail!(
                    "refusing to clear `{}` without --yes; this deletes every note in the scope",
                    target.scope
                );
            }
            controller.clear_all(target.scope);
            println!("cleared {}", target.scope);
            Ok(ExitCode::SUCCESS)
        }
        Command::Scopes | Command::Version => Ok(ExitCode::SUCCESS),
    }
}

/// Opens the SQLite store, falling back to memory-only when it is unusable.
fn open_storage(config: &NotesConfig) -> Box<dyn NoteStorage> {
    match SqliteNoteStorage::open(&config.db_path) {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!(
                "event=storage_open module=cli status=fallback backend=memory error={}",
                err
            );
            eprintln!(
                "warning: cannot open {} ({err}); changes will not be saved",
                config.db_path.display()
            );
            Box::new(MemoryNoteStorage::new())
        }
    }
}

fn print_scope(scope: Scope, notes: &[Note], with_header: bool) {
    if with_header {
        println!("[{scope}]");
    }
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in notes {
        let mark = if note.done { "x" } else { " " };
        println!("[{mark}] {}  {}", note.id, note.text);
    }
}

//! Per-note create state machine.
//!
//! ```text
//! Pending --confirm--> Confirmed
//!    \----roll_back--> RolledBack
//! ```
//!
//! `Confirmed` and `RolledBack` are terminal.

use crate::model::note::NoteId;
use crate::model::scope::Scope;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle state of one optimistic create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Inserted locally under its provisional id; request in flight.
    Pending,
    /// Remote accepted. `canonical` is `None` when the server sent no id and
    /// the provisional id stays in place.
    Confirmed { canonical: Option<NoteId> },
    /// Remote failed; the note was removed.
    RolledBack,
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed { .. } => "confirmed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Attempted transition out of a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStateError {
    pub from: &'static str,
    pub to: &'static str,
}

impl Display for SyncStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid sync transition {} -> {}", self.from, self.to)
    }
}

impl Error for SyncStateError {}

/// One optimistic create awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCreate {
    scope: Scope,
    provisional_id: NoteId,
    text: String,
    state: SyncState,
}

impl PendingCreate {
    pub fn new(scope: Scope, provisional_id: NoteId, text: impl Into<String>) -> Self {
        Self {
            scope,
            provisional_id,
            text: text.into(),
            state: SyncState::Pending,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn provisional_id(&self) -> &NoteId {
        &self.provisional_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Id the note is stored under once this state is applied.
    pub fn effective_id(&self) -> Option<&NoteId> {
        match &self.state {
            SyncState::Pending | SyncState::Confirmed { canonical: None } => {
                Some(&self.provisional_id)
            }
            SyncState::Confirmed {
                canonical: Some(canonical),
            } => Some(canonical),
            SyncState::RolledBack => None,
        }
    }

    pub fn confirm(&mut self, canonical: Option<NoteId>) -> Result<(), SyncStateError> {
        self.transition(SyncState::Confirmed { canonical })
    }

    pub fn roll_back(&mut self) -> Result<(), SyncStateError> {
        self.transition(SyncState::RolledBack)
    }

    fn transition(&mut self, next: SyncState) -> Result<(), SyncStateError> {
        if self.state.is_terminal() {
            return Err(SyncStateError {
                from: self.state.name(),
                to: next.name(),
            });
        }
        self.state = next;
        Ok(())
    }
}

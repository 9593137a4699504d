//! Sync controller: optimistic create with remote reconciliation.
//!
//! # Responsibility
//! - Insert new notes locally before the network call.
//! - Reconcile the identifier on success or remove the note on failure.
//! - Forward purely local operations to the store.
//!
//! # Invariants
//! - The store is never borrowed across the network await, so any number
//!   of creates may be in flight and complete in any order.
//! - Each create touches only its own provisional identifier.
//! - No retries, no cancellation; transport timeouts surface as failures.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{normalize_note_text, Note, NoteId};
use crate::model::scope::Scope;
use crate::storage::NoteStorage;
use crate::store::ScopeStore;
use crate::sync::remote::{CreateNoteRequest, RemoteError, RemoteNotes};
use crate::sync::state::{PendingCreate, SyncStateError};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Instant;

/// Store handle shared between the controller and the UI layer.
pub type SharedStore<S> = Rc<RefCell<ScopeStore<S>>>;

/// User-visible failure of an add-note flow.
#[derive(Debug)]
pub enum SyncError {
    /// Remote create failed; the optimistic note was removed.
    Remote {
        scope: Scope,
        provisional_id: NoteId,
        source: RemoteError,
    },
    /// `settle` was handed a create that is terminal or already requested.
    InvalidState(SyncStateError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { scope, source, .. } => write!(
                f,
                "note could not be saved to the server and was removed from `{scope}`: {source}"
            ),
            Self::InvalidState(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::InvalidState(err) => Some(err),
        }
    }
}

impl From<SyncStateError> for SyncError {
    fn from(value: SyncStateError) -> Self {
        Self::InvalidState(value)
    }
}

/// Result of a confirmed create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddNoteOutcome {
    /// The create in its `Confirmed` state.
    pub create: PendingCreate,
    /// `false` when the note was deleted locally before the reply arrived.
    pub reconciled: bool,
}

impl AddNoteOutcome {
    /// Identifier the note now carries.
    pub fn note_id(&self) -> &NoteId {
        self.create
            .effective_id()
            .unwrap_or(self.create.provisional_id())
    }
}

/// Bookkeeping for one create between `begin_add` and its reply.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    scope: Scope,
    /// Set once `settle` has issued the remote request.
    requested: bool,
}

/// Orchestrates local mutations and the remote create call.
pub struct SyncController<S: NoteStorage, R: RemoteNotes, C: Clock = SystemClock> {
    store: SharedStore<S>,
    remote: R,
    clock: C,
    in_flight: RefCell<BTreeMap<NoteId, InFlight>>,
}

impl<S: NoteStorage, R: RemoteNotes> SyncController<S, R, SystemClock> {
    pub fn new(store: SharedStore<S>, remote: R) -> Self {
        Self::with_clock(store, remote, SystemClock)
    }
}

impl<S: NoteStorage, R: RemoteNotes, C: Clock> SyncController<S, R, C> {
    pub fn with_clock(store: SharedStore<S>, remote: R, clock: C) -> Self {
        Self {
            store,
            remote,
            clock,
            in_flight: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Number of creates inserted locally and still awaiting the remote.
    pub fn pending_count(&self) -> usize {
        self.in_flight.borrow().len()
    }

    pub fn is_pending(&self, id: &NoteId) -> bool {
        self.in_flight.borrow().contains_key(id)
    }

    /// Validates and optimistically inserts a note.
    ///
    /// Returns `None` (and changes nothing) for blank input. The composer can
    /// be cleared as soon as this returns; the network call happens in
    /// `settle`.
    pub fn begin_add(&self, scope: Scope, raw_text: &str) -> Option<PendingCreate> {
        let Some(text) = normalize_note_text(raw_text) else {
            debug!(
                "event=note_add module=sync status=rejected scope={} reason=empty_text",
                scope
            );
            return None;
        };

        let now = self.clock.now_ms();
        let provisional_id = NoteId::provisional(now);
        let mut store = self.store.borrow_mut();
        let created_at = store
            .latest_created_at(scope)
            .map_or(now, |latest| latest.max(now));
        store.insert(
            scope,
            Note::new(provisional_id.clone(), text.clone(), created_at),
        );
        drop(store);

        self.in_flight.borrow_mut().insert(
            provisional_id.clone(),
            InFlight {
                scope,
                requested: false,
            },
        );
        info!(
            "event=note_sync_pending module=sync status=pending scope={} provisional_id={}",
            scope, provisional_id
        );
        Some(PendingCreate::new(scope, provisional_id, text))
    }

    /// Issues the remote create for `create` and reconciles the outcome.
    ///
    /// # Errors
    /// - `SyncError::Remote` after the note was rolled back.
    /// - `SyncError::InvalidState` if `create` is not pending, or if its
    ///   request was already issued (e.g. a cloned handle); nothing is sent
    ///   in that case.
    pub async fn settle(&self, mut create: PendingCreate) -> Result<AddNoteOutcome, SyncError> {
        if create.state().is_terminal() {
            return Err(SyncError::InvalidState(SyncStateError {
                from: "terminal",
                to: "pending",
            }));
        }

        let scope = create.scope();
        let provisional_id = create.provisional_id().clone();
        if !self.claim_request(scope, &provisional_id) {
            warn!(
                "event=note_sync_settle module=sync status=rejected scope={} provisional_id={} reason=not_awaiting_request",
                scope, provisional_id
            );
            return Err(SyncError::InvalidState(SyncStateError {
                from: "requested",
                to: "pending",
            }));
        }
        let request = CreateNoteRequest {
            scope,
            text: create.text().to_string(),
        };

        let started_at = Instant::now();
        let result = self.remote.create_note(request).await;
        self.in_flight.borrow_mut().remove(&provisional_id);

        match result {
            Ok(response) => {
                let canonical = self.usable_canonical_id(
                    scope,
                    &provisional_id,
                    response.canonical_id().map(NoteId::from),
                );
                let reconciled = match &canonical {
                    Some(canonical_id) => self.store.borrow_mut().replace_identifier(
                        scope,
                        &provisional_id,
                        canonical_id.clone(),
                    ),
                    None => self.store.borrow().contains(scope, &provisional_id),
                };
                create.confirm(canonical)?;
                info!(
                    "event=note_sync_confirmed module=sync status=ok scope={} provisional_id={} canonical={} reconciled={} duration_ms={}",
                    scope,
                    provisional_id,
                    create
                        .effective_id()
                        .map_or("-", NoteId::as_str),
                    reconciled,
                    started_at.elapsed().as_millis()
                );
                Ok(AddNoteOutcome { create, reconciled })
            }
            Err(err) => {
                let removed = self.store.borrow_mut().remove(scope, &provisional_id);
                create.roll_back()?;
                warn!(
                    "event=note_sync_rolled_back module=sync status=error scope={} provisional_id={} removed={} duration_ms={} error={}",
                    scope,
                    provisional_id,
                    removed,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(SyncError::Remote {
                    scope,
                    provisional_id,
                    source: err,
                })
            }
        }
    }

    /// Marks the create as requested. `false` if it is unknown or was
    /// already requested.
    fn claim_request(&self, scope: Scope, provisional_id: &NoteId) -> bool {
        match self.in_flight.borrow_mut().get_mut(provisional_id) {
            Some(entry) if entry.scope == scope && !entry.requested => {
                entry.requested = true;
                true
            }
            _ => false,
        }
    }

    /// Drops a canonical id that another note in `scope` already carries;
    /// the note then keeps its provisional id so ids stay unique per scope.
    fn usable_canonical_id(
        &self,
        scope: Scope,
        provisional_id: &NoteId,
        canonical: Option<NoteId>,
    ) -> Option<NoteId> {
        let canonical = canonical?;
        if &canonical != provisional_id && self.store.borrow().contains(scope, &canonical) {
            warn!(
                "event=note_sync_id_conflict module=sync status=kept_provisional scope={} provisional_id={} canonical={} reason=duplicate_id",
                scope, provisional_id, canonical
            );
            return None;
        }
        Some(canonical)
    }

    /// Full add flow: `begin_add` then `settle`.
    ///
    /// Returns `Ok(None)` when blank input was silently rejected.
    pub async fn add_note(
        &self,
        scope: Scope,
        raw_text: &str,
    ) -> Result<Option<AddNoteOutcome>, SyncError> {
        match self.begin_add(scope, raw_text) {
            Some(create) => self.settle(create).await.map(Some),
            None => Ok(None),
        }
    }

    /// Flips completion locally. `None` when the id is unknown.
    pub fn toggle_done(&self, scope: Scope, id: &NoteId) -> Option<bool> {
        let done = self.store.borrow_mut().toggle_done(scope, id);
        debug!(
            "event=note_toggle module=sync status={} scope={}",
            if done.is_some() { "ok" } else { "skipped" },
            scope
        );
        done
    }

    /// Deletes locally. Returns whether a note was removed.
    pub fn remove_note(&self, scope: Scope, id: &NoteId) -> bool {
        let removed = self.store.borrow_mut().remove(scope, id);
        debug!(
            "event=note_remove module=sync status={} scope={}",
            if removed { "ok" } else { "skipped" },
            scope
        );
        removed
    }

    /// Empties `scope`. Callers gate this behind user confirmation.
    pub fn clear_all(&self, scope: Scope) {
        self.store.borrow_mut().clear(scope);
        info!("event=note_clear module=sync status=ok scope={}", scope);
    }
}

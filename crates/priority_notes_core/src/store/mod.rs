//! In-memory authoritative note state.
//!
//! # Responsibility
//! - Own the scoped collection and the selected scope.
//! - Flush the whole collection to storage after every state change.
//! - Notify subscribers after each flushed change.

mod scope_store;

pub use scope_store::{ChangeKind, ScopeStore, StoreChange, SubscriptionId};

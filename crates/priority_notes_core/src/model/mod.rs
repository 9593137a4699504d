//! Domain model for scoped priority notes.
//!
//! # Responsibility
//! - Define the note record, its identifier states and the fixed scope set.
//! - Define the scoped collection shape shared by storage and store layers.
//!
//! # Invariants
//! - Every scope key is always present in a `ScopedCollection`.
//! - Note identity is the `id` field only.

pub mod collection;
pub mod note;
pub mod scope;

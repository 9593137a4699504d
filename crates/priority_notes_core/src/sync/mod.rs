//! Optimistic remote synchronization for note creation.
//!
//! # Responsibility
//! - Define the remote create boundary and its HTTP implementation.
//! - Drive the per-note `Pending -> Confirmed | RolledBack` state machine.
//!
//! # Invariants
//! - Create is the only operation that touches the network.
//! - A pending note always ends confirmed or removed; it never lingers.

pub mod controller;
pub mod http;
pub mod remote;
pub mod state;

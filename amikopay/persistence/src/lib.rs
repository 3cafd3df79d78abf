//! Snapshot persistence and pay-log storage for amikopay nodes (§4.1, §4.7).
//!
//! The state machine itself is storage-agnostic; this crate owns the one
//! durability mechanism the rest of the workspace relies on — a whole-
//! `NodeState` snapshot swapped in atomically via rename — plus the
//! append-only pay log the node loop writes terminal PayeeLink/PayerLink
//! outcomes to.
pub mod errors;
pub mod paylog;
pub mod snapshot;

pub use errors::PersistenceError;
pub use paylog::{
	PayLog,
	PayLogEntry,
	PayLogRole,
};
pub use snapshot::{
	load_snapshot,
	save_snapshot,
};

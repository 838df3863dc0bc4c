//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in a repository:
//! - `SessionLocks` - per-session mutual exclusion for combat mutations

pub mod session_locks;

pub use session_locks::SessionLocks;

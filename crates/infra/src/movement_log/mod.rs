//! Append-only movement log boundary.
//!
//! Defines the log contract without storage assumptions, plus an in-memory
//! implementation used by tests, dev and the CLI shell.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryMovementLog;
pub use r#trait::{LedgerError, MovementLog};

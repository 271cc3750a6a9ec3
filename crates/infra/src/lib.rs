//! Ledger infrastructure: the movement log, the balance engine, and the
//! `Ledger` handle that composes them.

pub mod ledger;
pub mod movement_log;
pub mod projections;


pub use ledger::{DashboardSummary, Ledger, LedgerSettings};
pub use movement_log::{InMemoryMovementLog, LedgerError, MovementLog};

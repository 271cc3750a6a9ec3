//! Stock movements: the facts the ledger is made of.
//!
//! Pure domain logic (no IO, no storage): the movement record, the typed
//! input it is validated from, and the canonical ordering of the log.

pub mod input;
pub mod movement;
pub mod timestamp;

pub use input::RecordMovement;
pub use movement::{sort_canonical, Movement, MovementKind};
pub use timestamp::{parse_timestamp, resolve_timestamp};

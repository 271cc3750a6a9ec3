//! Ledger facts and the read models folded from them.

pub mod event;
pub mod projection;

pub use event::Event;
pub use projection::Projection;

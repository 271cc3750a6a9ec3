//! `stockledger-core` — shared ledger building blocks.
//!
//! Identifiers, quantities and the domain error taxonomy. No IO, no storage.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{optional_location, LocationId, MovementId, ProductId};
pub use value_object::Quantity;

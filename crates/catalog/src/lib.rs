//! Product and location catalog.
//!
//! The ledger only needs existence checks and display names from here; the
//! in-memory catalog additionally covers create/edit/view of both entities.

pub mod catalog;
pub mod location;
pub mod product;

pub use catalog::{EntityCatalog, InMemoryCatalog};
pub use location::Location;
pub use product::Product;

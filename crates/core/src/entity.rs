//! Entity trait: catalog records whose identity outlives attribute edits.

/// Something with a stable identity (products, locations, movements).
///
/// Two values with the same id refer to the same thing even when their
/// attributes (name, address, description) differ.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the identifier.
    fn id(&self) -> &Self::Id;
}

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a permanent rejection: the ledger never retries, and a
/// rejected write leaves all state unchanged. Storage failures belong to the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identity (movement, product or location id) is already taken.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// A movement quantity was zero or negative.
    #[error("invalid quantity: {0} (must be strictly positive)")]
    InvalidQuantity(i64),

    /// A movement had neither an origin nor a destination location.
    #[error("ambiguous direction: movement needs a from_location, a to_location, or both")]
    AmbiguousDirection,

    /// A movement referenced a product the catalog does not know.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// A lookup by id found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A value failed validation (e.g. empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty after trimming).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateIdentity(id.into())
    }

    pub fn unknown_product(id: impl Into<String>) -> Self {
        Self::UnknownProduct(id.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

use std::sync::Arc;

use thiserror::Error;

use stockledger_core::{DomainError, MovementId, ProductId};
use stockledger_movements::Movement;

/// Ledger operation error.
///
/// Domain rejections (duplicate id, invalid quantity, ambiguous direction,
/// unknown product, not found) are passed through unchanged so callers can
/// match on the specific kind. `Storage` covers failures of the backing store
/// itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("ledger storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    /// The domain rejection behind this error, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Storage(_) => None,
        }
    }
}

/// Append-only record of stock movements.
///
/// ## Append Semantics
///
/// `append()`:
/// - rejects a movement with neither location (`AmbiguousDirection`)
/// - rejects a product the catalog does not know (`UnknownProduct`)
/// - rejects a `movement_id` already in the log (`DuplicateIdentity`)
/// - is atomic: the uniqueness check and the insert happen under one write
///   guard, and a rejected movement leaves the log unchanged
///
/// Quantity positivity is carried by the `Quantity` type.
///
/// ## Read Semantics
///
/// `list()` returns a consistent snapshot in canonical order: timestamp
/// ascending, then `movement_id` ordinal. Readers never observe a partially
/// applied append.
///
/// There is no update or delete.
pub trait MovementLog: Send + Sync {
    fn append(&self, movement: Movement) -> Result<Movement, LedgerError>;

    /// All movements in canonical order.
    fn list(&self) -> Result<Vec<Movement>, LedgerError>;

    /// Look up one movement; `NotFound` when the id was never appended.
    fn get(&self, movement_id: &MovementId) -> Result<Movement, LedgerError>;

    fn len(&self) -> Result<usize, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// The newest `limit` movements, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<Movement>, LedgerError> {
        Ok(self.list()?.into_iter().rev().take(limit).collect())
    }

    /// Canonical-order history of one product.
    fn for_product(&self, product_id: &ProductId) -> Result<Vec<Movement>, LedgerError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|m| &m.product_id == product_id)
            .collect())
    }
}

impl<L> MovementLog for Arc<L>
where
    L: MovementLog + ?Sized,
{
    fn append(&self, movement: Movement) -> Result<Movement, LedgerError> {
        (**self).append(movement)
    }

    fn list(&self) -> Result<Vec<Movement>, LedgerError> {
        (**self).list()
    }

    fn get(&self, movement_id: &MovementId) -> Result<Movement, LedgerError> {
        (**self).get(movement_id)
    }

    fn len(&self) -> Result<usize, LedgerError> {
        (**self).len()
    }

    fn recent(&self, limit: usize) -> Result<Vec<Movement>, LedgerError> {
        (**self).recent(limit)
    }

    fn for_product(&self, product_id: &ProductId) -> Result<Vec<Movement>, LedgerError> {
        (**self).for_product(product_id)
    }
}

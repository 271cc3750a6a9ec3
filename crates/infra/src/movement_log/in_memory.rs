use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use stockledger_catalog::EntityCatalog;
use stockledger_core::{DomainError, MovementId, ProductId};
use stockledger_movements::Movement;

use super::r#trait::{LedgerError, MovementLog};

/// Canonical position of a movement in the log.
type OrderKey = (DateTime<Utc>, MovementId);

#[derive(Debug, Default)]
struct LogState {
    ordered: BTreeMap<OrderKey, Movement>,
    index: HashMap<MovementId, DateTime<Utc>>,
}

/// In-memory append-only movement log.
///
/// Movements are kept in canonical order as they are inserted, so `list()` is
/// a straight copy under the read guard. Product existence is checked against
/// the catalog the log was opened with; location ids are not checked.
#[derive(Debug)]
pub struct InMemoryMovementLog<C> {
    catalog: C,
    state: RwLock<LogState>,
}

impl<C> InMemoryMovementLog<C>
where
    C: EntityCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            state: RwLock::new(LogState::default()),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }
}

impl<C> MovementLog for InMemoryMovementLog<C>
where
    C: EntityCatalog,
{
    fn append(&self, movement: Movement) -> Result<Movement, LedgerError> {
        if movement.from_location.is_none() && movement.to_location.is_none() {
            return Err(DomainError::AmbiguousDirection.into());
        }

        // Products are never removed from the catalog, so this check cannot be
        // invalidated between here and the insert.
        if !self.catalog.product_exists(&movement.product_id) {
            return Err(DomainError::unknown_product(movement.product_id.to_string()).into());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        if state.index.contains_key(&movement.movement_id) {
            return Err(DomainError::duplicate(format!("movement {}", movement.movement_id)).into());
        }

        state
            .index
            .insert(movement.movement_id.clone(), movement.timestamp);
        state.ordered.insert(
            (movement.timestamp, movement.movement_id.clone()),
            movement.clone(),
        );

        debug!(
            movement_id = %movement.movement_id,
            product_id = %movement.product_id,
            qty = movement.qty.get(),
            log_len = state.index.len(),
            "movement appended"
        );

        Ok(movement)
    }

    fn list(&self) -> Result<Vec<Movement>, LedgerError> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        Ok(state.ordered.values().cloned().collect())
    }

    fn get(&self, movement_id: &MovementId) -> Result<Movement, LedgerError> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        state
            .index
            .get(movement_id)
            .and_then(|ts| state.ordered.get(&(*ts, movement_id.clone())))
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("movement {movement_id}")).into())
    }

    fn len(&self) -> Result<usize, LedgerError> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        Ok(state.index.len())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Movement>, LedgerError> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        Ok(state.ordered.values().rev().take(limit).cloned().collect())
    }

    fn for_product(&self, product_id: &ProductId) -> Result<Vec<Movement>, LedgerError> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::Storage("lock poisoned".to_string()))?;

        Ok(state
            .ordered
            .values()
            .filter(|m| &m.product_id == product_id)
            .cloned()
            .collect())
    }
}

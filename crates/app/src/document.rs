//! JSON ledger documents: a catalog plus the movements to record against it.
//!
//! ```json
//! {
//!   "products":  [{ "product_id": "P1", "name": "Widget" }],
//!   "locations": [{ "location_id": "L1", "name": "Warehouse" }],
//!   "movements": [{ "movement_id": "M1", "product_id": "P1", "qty": 10, "to_location": "L1" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use stockledger_catalog::{EntityCatalog, InMemoryCatalog, Location, Product};
use stockledger_core::{DomainError, MovementId};
use stockledger_infra::{Ledger, LedgerError, MovementLog};
use stockledger_movements::RecordMovement;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read ledger document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ledger document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog entry: {0}")]
    Catalog(#[from] DomainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub movements: Vec<RecordMovement>,
}

/// A movement the ledger refused, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedMovement {
    pub movement_id: MovementId,
    pub reason: String,
}

/// Outcome of replaying a document's movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub recorded: usize,
    pub rejected: Vec<RejectedMovement>,
}

impl LedgerDocument {
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Build a catalog from the document. Entries are re-validated (names
    /// trimmed and required); a duplicate id is an error.
    pub fn build_catalog(&self) -> Result<InMemoryCatalog, DocumentError> {
        let catalog = InMemoryCatalog::new();
        for p in &self.products {
            let product = Product::new(p.product_id.clone(), &p.name, p.description.as_deref())?;
            catalog.add_product(product)?;
        }
        for l in &self.locations {
            let location = Location::new(l.location_id.clone(), &l.name, l.address.as_deref())?;
            catalog.add_location(location)?;
        }
        Ok(catalog)
    }

    /// Record every movement in document order.
    ///
    /// Domain rejections are collected in the report and replay continues;
    /// a storage failure aborts.
    pub fn replay<C, L>(&self, ledger: &Ledger<C, L>) -> Result<ImportReport, DocumentError>
    where
        C: EntityCatalog,
        L: MovementLog,
    {
        let mut report = ImportReport::default();

        for input in &self.movements {
            match ledger.record_movement(input.clone()) {
                Ok(_) => report.recorded += 1,
                Err(LedgerError::Domain(e)) => {
                    warn!(movement_id = %input.movement_id, error = %e, "skipping movement");
                    report.rejected.push(RejectedMovement {
                        movement_id: input.movement_id.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            recorded = report.recorded,
            rejected = report.rejected.len(),
            "ledger document replayed"
        );
        Ok(report)
    }
}

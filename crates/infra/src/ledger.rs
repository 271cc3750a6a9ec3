//! The `Ledger` handle: movement log + incremental balance cache.
//!
//! ```text
//! RecordMovement
//!   ↓
//! 1. validate (quantity, direction, timestamp fallback)
//!   ↓
//! 2. take the balance-cache write guard
//!   ↓
//! 3. MovementLog::append (product existence, id uniqueness)
//!   ↓
//! 4. BalanceProjection::apply (same movement, still under the guard)
//! ```
//!
//! Holding the cache guard across steps 3–4 means balance readers see the
//! ledger either before or after a movement, never the log without the cache.
//! The log is owned and never lent out, so every append goes through this
//! path; `close` hands it back and `with_log` rebuilds the cache on reopen.
//! A `Ledger` is an explicit value: open it at start-up, pass it by reference,
//! `close` it at shutdown.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use stockledger_catalog::EntityCatalog;
use stockledger_core::{MovementId, ProductId};
use stockledger_events::Projection;
use stockledger_movements::{Movement, RecordMovement};

use crate::movement_log::{InMemoryMovementLog, LedgerError, MovementLog};
use crate::projections::{
    balance_rows, derive_balances, BalanceFilter, BalanceProjection, BalanceRow, Balances,
    StockGrid,
};

/// Tunables for a ledger instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// How many movements the dashboard lists.
    pub recent_limit: usize,
    /// Row filter the dashboard uses.
    pub dashboard_filter: BalanceFilter,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            recent_limit: 6,
            dashboard_filter: BalanceFilter::IncludeZero,
        }
    }
}

/// Overview of the ledger: counts, latest movements and current balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub product_count: usize,
    pub location_count: usize,
    pub movement_count: usize,
    /// Newest first.
    pub recent_movements: Vec<Movement>,
    pub balances: Vec<BalanceRow>,
}

pub struct Ledger<C, L = InMemoryMovementLog<C>> {
    settings: LedgerSettings,
    catalog: C,
    log: L,
    cache: RwLock<BalanceProjection>,
}

impl<C> Ledger<C, InMemoryMovementLog<C>>
where
    C: EntityCatalog + Clone,
{
    /// Open an empty in-memory ledger over `catalog`.
    pub fn open(catalog: C, settings: LedgerSettings) -> Self {
        let log = InMemoryMovementLog::new(catalog.clone());
        info!(recent_limit = settings.recent_limit, "ledger opened");
        Self {
            settings,
            catalog,
            log,
            cache: RwLock::new(BalanceProjection::new()),
        }
    }
}

impl<C, L> Ledger<C, L>
where
    C: EntityCatalog,
    L: MovementLog,
{
    /// Open a ledger over an existing log, rebuilding the balance cache from it.
    pub fn with_log(catalog: C, log: L, settings: LedgerSettings) -> Result<Self, LedgerError> {
        let history = log.list()?;
        let mut projection = BalanceProjection::new();
        projection.rebuild(&history);
        info!(movements = history.len(), "ledger opened over existing log");
        Ok(Self {
            settings,
            catalog,
            log,
            cache: RwLock::new(projection),
        })
    }

    /// Shut the ledger down, returning the log it owned.
    pub fn close(self) -> L {
        let movements = self.log.len().unwrap_or_default();
        info!(movements, "ledger closed");
        self.log
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Number of recorded movements.
    pub fn movement_count(&self) -> Result<usize, LedgerError> {
        self.log.len()
    }

    pub fn settings(&self) -> LedgerSettings {
        self.settings
    }

    /// Record a movement, timestamped now when the input has no usable timestamp.
    pub fn record_movement(&self, input: RecordMovement) -> Result<Movement, LedgerError> {
        self.record_movement_at(input, Utc::now())
    }

    /// Record a movement with an explicit fallback time.
    #[instrument(skip(self, input), fields(movement_id = %input.movement_id, product_id = %input.product_id))]
    pub fn record_movement_at(
        &self,
        input: RecordMovement,
        now: DateTime<Utc>,
    ) -> Result<Movement, LedgerError> {
        let movement = input.validate(now).map_err(|e| {
            warn!(error = %e, "movement rejected");
            LedgerError::from(e)
        })?;

        let mut cache = self
            .cache
            .write()
            .map_err(|_| LedgerError::Storage("balance cache lock poisoned".to_string()))?;

        match self.log.append(movement) {
            Ok(recorded) => {
                cache.apply(&recorded);
                info!(qty = recorded.qty.get(), kind = ?recorded.kind(), "movement recorded");
                Ok(recorded)
            }
            Err(e) => {
                warn!(error = %e, "movement rejected");
                Err(e)
            }
        }
    }

    /// All movements in canonical order (timestamp, then id).
    pub fn list_movements(&self) -> Result<Vec<Movement>, LedgerError> {
        self.log.list()
    }

    pub fn get_movement(&self, movement_id: &MovementId) -> Result<Movement, LedgerError> {
        self.log.get(movement_id)
    }

    /// Canonical-order movements of one product.
    pub fn product_history(&self, product_id: &ProductId) -> Result<Vec<Movement>, LedgerError> {
        self.log.for_product(product_id)
    }

    /// Current balances from the incremental cache.
    pub fn balances(&self) -> Result<Balances, LedgerError> {
        let cache = self
            .cache
            .read()
            .map_err(|_| LedgerError::Storage("balance cache lock poisoned".to_string()))?;
        Ok(cache.balances().clone())
    }

    /// Current balances recomputed from the full log, bypassing the cache.
    pub fn recompute_balances(&self) -> Result<Balances, LedgerError> {
        let movements = self.log.list()?;
        debug!(movements = movements.len(), "full balance recompute");
        Ok(derive_balances(&movements))
    }

    /// Discard the cache and rebuild it from the log.
    pub fn rebuild_balances(&self) -> Result<(), LedgerError> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| LedgerError::Storage("balance cache lock poisoned".to_string()))?;
        let movements = self.log.list()?;
        cache.rebuild(&movements);
        debug!(movements = movements.len(), "balance cache rebuilt");
        Ok(())
    }

    /// Balance rows with display names, sorted by (product name, location name).
    pub fn compute_balances(&self, filter: BalanceFilter) -> Result<Vec<BalanceRow>, LedgerError> {
        let balances = self.balances()?;
        Ok(balance_rows(&balances, &self.catalog, filter))
    }

    /// Products × locations matrix over the whole catalog.
    pub fn stock_grid(&self) -> Result<StockGrid, LedgerError> {
        let balances = self.balances()?;
        Ok(StockGrid::build(&balances, &self.catalog))
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, LedgerError> {
        Ok(DashboardSummary {
            product_count: self.catalog.products().len(),
            location_count: self.catalog.locations().len(),
            movement_count: self.movement_count()?,
            recent_movements: self.log.recent(self.settings.recent_limit)?,
            balances: self.compute_balances(self.settings.dashboard_filter)?,
        })
    }
}

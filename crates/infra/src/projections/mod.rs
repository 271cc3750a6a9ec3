//! Read models derived from the movement log.

pub mod balances;
pub mod view;

pub use balances::{
    derive_balances, BalanceProjection, Balances, ConservationViolation, FlowTotals, StockLevel,
};
pub use view::{balance_rows, BalanceFilter, BalanceRow, GridEntry, StockGrid};

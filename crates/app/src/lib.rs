//! Thin shell around the ledger: configuration, ledger documents, and the
//! `stockledger` binary.

pub mod config;
pub mod document;

pub use config::{AppConfig, OutputMode};
pub use document::{DocumentError, ImportReport, LedgerDocument, RejectedMovement};

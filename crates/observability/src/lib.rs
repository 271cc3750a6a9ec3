//! Process-wide logging setup for ledger binaries.

pub use self::tracing::LogFormat;

/// Initialize tracing/logging for the process.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(format);
}

/// Tracing configuration (filters, formats).
pub mod tracing;

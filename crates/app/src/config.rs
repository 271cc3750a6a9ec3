//! Configuration loading.
//!
//! Everything comes from environment variables; unset variables take their
//! defaults and unparseable ones fall back to the default with a warning.
//! The log format is read separately, before the subscriber exists, so that
//! the warnings emitted while loading the rest are actually recorded.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use stockledger_infra::projections::BalanceFilter;
use stockledger_infra::LedgerSettings;
use stockledger_observability::LogFormat;

pub const ENV_RECENT_LIMIT: &str = "STOCKLEDGER_RECENT_LIMIT";
pub const ENV_INCLUDE_ZERO: &str = "STOCKLEDGER_INCLUDE_ZERO";
pub const ENV_LEDGER_FILE: &str = "STOCKLEDGER_LEDGER_FILE";
pub const ENV_LOG_FORMAT: &str = "STOCKLEDGER_LOG_FORMAT";
pub const ENV_OUTPUT: &str = "STOCKLEDGER_OUTPUT";

/// What the binary prints after replaying a ledger document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Sorted balance rows.
    #[default]
    Rows,
    /// Products × locations matrix.
    Grid,
    /// Counts, recent movements and balance rows.
    Dashboard,
}

impl OutputMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rows" => Some(OutputMode::Rows),
            "grid" => Some(OutputMode::Grid),
            "dashboard" => Some(OutputMode::Dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ledger: LedgerSettings,
    /// Row filter for `OutputMode::Rows`.
    pub balance_filter: BalanceFilter,
    pub ledger_file: Option<PathBuf>,
    pub output: OutputMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerSettings::default(),
            balance_filter: BalanceFilter::IncludeZero,
            ledger_file: None,
            output: OutputMode::Rows,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RECENT_LIMIT) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.ledger.recent_limit = limit,
                Err(e) => warn!(key = ENV_RECENT_LIMIT, value = %raw, error = %e, "invalid value; using default"),
            }
        }

        if let Some(raw) = lookup(ENV_INCLUDE_ZERO) {
            match parse_bool(&raw) {
                Some(include_zero) => {
                    let filter = BalanceFilter::from_include_zero(include_zero);
                    config.balance_filter = filter;
                    config.ledger.dashboard_filter = filter;
                }
                None => warn!(key = ENV_INCLUDE_ZERO, value = %raw, "invalid value; using default"),
            }
        }

        config.ledger_file = lookup(ENV_LEDGER_FILE)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup(ENV_OUTPUT) {
            match OutputMode::parse(&raw) {
                Some(mode) => config.output = mode,
                None => warn!(key = ENV_OUTPUT, value = %raw, "invalid value; using default"),
            }
        }

        config
    }
}

/// Log output format from the environment; JSON when unset.
pub fn log_format_from_env() -> LogFormat {
    log_format_from_lookup(|key| std::env::var(key).ok())
}

pub fn log_format_from_lookup<F>(lookup: F) -> LogFormat
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_FORMAT)
        .map(|raw| LogFormat::parse(&raw))
        .unwrap_or_default()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let map = env(pairs);
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]);
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.ledger.recent_limit, 6);
        assert_eq!(c.balance_filter, BalanceFilter::IncludeZero);
    }

    #[test]
    fn reads_all_keys() {
        let c = config(&[
            (ENV_RECENT_LIMIT, "10"),
            (ENV_INCLUDE_ZERO, "off"),
            (ENV_LEDGER_FILE, "/tmp/ledger.json"),
            (ENV_OUTPUT, "Grid"),
        ]);
        assert_eq!(c.ledger.recent_limit, 10);
        assert_eq!(c.balance_filter, BalanceFilter::NonZeroOnly);
        assert_eq!(c.ledger.dashboard_filter, BalanceFilter::NonZeroOnly);
        assert_eq!(c.ledger_file, Some(PathBuf::from("/tmp/ledger.json")));
        assert_eq!(c.output, OutputMode::Grid);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let c = config(&[
            (ENV_RECENT_LIMIT, "-1"),
            (ENV_INCLUDE_ZERO, "maybe"),
            (ENV_LEDGER_FILE, "  "),
            (ENV_OUTPUT, "xml"),
        ]);
        assert_eq!(c, AppConfig::default());
    }

    #[test]
    fn log_format_is_read_on_its_own() {
        let pretty = env(&[(ENV_LOG_FORMAT, "pretty")]);
        assert_eq!(log_format_from_lookup(|key| pretty.get(key).cloned()), LogFormat::Pretty);

        let unset = env(&[]);
        assert_eq!(log_format_from_lookup(|key| unset.get(key).cloned()), LogFormat::Json);
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use stockledger_app::{config, AppConfig, LedgerDocument, OutputMode};
use stockledger_infra::projections::FlowTotals;
use stockledger_infra::Ledger;

fn main() -> anyhow::Result<()> {
    stockledger_observability::init(config::log_format_from_env());

    let config = AppConfig::from_env();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.ledger_file.clone())
        .context("no ledger document: pass a path or set STOCKLEDGER_LEDGER_FILE")?;

    let document = LedgerDocument::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    let catalog = Arc::new(document.build_catalog().context("building catalog")?);

    let ledger = Ledger::open(catalog, config.ledger);
    let report = document.replay(&ledger).context("replaying movements")?;

    let flows = FlowTotals::by_product(&ledger.list_movements()?);
    ledger
        .balances()?
        .verify_conservation(&flows)
        .context("balance self-check failed")?;

    let output = match config.output {
        OutputMode::Rows => json!({
            "report": report,
            "balances": ledger.compute_balances(config.balance_filter)?,
        }),
        OutputMode::Grid => json!({
            "report": report,
            "grid": ledger.stock_grid()?,
        }),
        OutputMode::Dashboard => json!({
            "report": report,
            "dashboard": ledger.dashboard()?,
        }),
    };

    serde_json::to_writer_pretty(std::io::stdout().lock(), &output)?;
    println!();

    ledger.close();
    Ok(())
}

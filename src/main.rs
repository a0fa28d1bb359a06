//! ledger-batch
//!
//! Walks a list of Aptos accounts one at a time. Each account talks to the
//! node through its own forward proxy; funded accounts submit the batch
//! payload and wait for it to settle.
//!
//! # Architecture Overview
//!
//! ```text
//!   wallets.txt ─┐
//!                ├─▶ batch::inputs ─▶ batch::driver ─┬─▶ engine::balance ──────┐
//!   proxies.txt ─┘                                   └─▶ engine::orchestrator ─┤
//!                                                                             ▼
//!                                       ledger::client (reqwest via proxy) ─▶ node
//!                                                                             │
//!                                       ledger::confirmation ◀────────────────┘
//!
//!   Cross-cutting: config, observability, resilience::retries
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};

use ledger_batch::batch::{load_accounts, opt_in_direct_transfer, BatchDriver};
use ledger_batch::config::validation::validate_config;
use ledger_batch::config::{load_config, BatchConfig, ConfigError};
use ledger_batch::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "ledger-batch")]
#[command(about = "Opt Aptos accounts into direct token transfers, one proxy per account", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(short, long, default_value = "ledger-batch.toml")]
    config: PathBuf,

    /// Private keys, one per line
    #[arg(short, long)]
    wallets: Option<String>,

    /// Proxies, one per line, paired with keys by position
    #[arg(short, long)]
    proxies: Option<String>,

    /// Node REST endpoint
    #[arg(short, long)]
    rpc: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<BatchConfig, ConfigError> {
    let mut config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        BatchConfig::default()
    };

    if let Some(wallets) = &cli.wallets {
        config.batch.wallets_path = wallets.clone();
    }
    if let Some(proxies) = &cli.proxies {
        config.batch.proxies_path = proxies.clone();
    }
    if let Some(rpc) = &cli.rpc {
        config.node.rpc_url = rpc.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("ledger-batch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = %cli.config.display(),
        rpc_url = %config.node.rpc_url,
        max_attempts = config.retries.max_attempts,
        poll_interval_ms = config.polling.interval_ms,
        poll_max_attempts = config.polling.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let accounts = load_accounts(
        Path::new(&config.batch.wallets_path),
        Path::new(&config.batch.proxies_path),
    )?;
    tracing::info!(accounts = accounts.len(), "Accounts loaded");

    let payload = opt_in_direct_transfer(true)?;
    let mut driver = BatchDriver::new(config, payload);
    let summary = driver.run(&accounts).await;

    tracing::info!(summary = %serde_json::to_string(&summary)?, "Done");
    Ok(())
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a batch run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a batch run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BatchConfig {
    /// Ledger node endpoint and HTTP timeouts.
    pub node: NodeConfig,

    /// Retry ceilings and cooldowns.
    pub retries: RetryConfig,

    /// Confirmation polling.
    pub polling: PollingConfig,

    /// Gas parameters for built transactions.
    pub gas: GasConfig,

    /// Input files and pacing.
    pub batch: RunConfig,

    /// Explorer links printed for submitted transactions.
    pub explorer: ExplorerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// REST API base URL, including the version segment.
    pub rpc_url: String,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds (includes the proxy).
    pub connect_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://fullnode.mainnet.aptoslabs.com/v1".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per account identity.
    pub max_attempts: u32,

    /// Pause before re-running a failed transaction, in seconds.
    pub cooldown_secs: u64,

    /// Pause before re-reading a failed balance, in seconds.
    pub balance_cooldown_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown_secs: 10,
            balance_cooldown_secs: 2,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Fixed spacing between reads in milliseconds.
    pub interval_ms: u64,

    /// Read ceiling per polling phase.
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 50,
        }
    }
}

/// Gas configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Lower bound of the randomized `max_gas_amount`.
    pub min_max_gas: u64,

    /// Upper bound (inclusive) of the randomized `max_gas_amount`.
    pub max_max_gas: u64,

    /// Price per gas unit in octas.
    pub gas_unit_price: u64,

    /// Transaction lifetime in seconds.
    pub expiration_secs: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            min_max_gas: 700,
            max_max_gas: 2000,
            gas_unit_price: 100,
            expiration_secs: 600,
        }
    }
}

/// Input files and pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// One private key per line.
    pub wallets_path: String,

    /// One proxy per line, paired with wallets by position.
    pub proxies_path: String,

    /// Delay between accounts in milliseconds.
    pub sleep_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            wallets_path: "wallets.txt".to_string(),
            proxies_path: "proxy.txt".to_string(),
            sleep_ms: 5000,
        }
    }
}

/// Explorer link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub network: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://explorer.aptoslabs.com".to_string(),
            network: "mainnet".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Link to a transaction page.
    pub fn transaction_url(&self, hash: &str) -> String {
        format!(
            "{}/txn/{}?network={}",
            self.base_url.trim_end_matches('/'),
            hash,
            self.network
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

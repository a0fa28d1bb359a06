//! Batch transaction runner for Aptos accounts behind per-account proxies.

pub mod batch;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod observability;
pub mod resilience;

pub use batch::{BatchDriver, BatchSummary};
pub use config::BatchConfig;

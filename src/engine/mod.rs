//! Per-account operations with bounded retries.
//!
//! # Data Flow
//! ```text
//! batch driver
//!     → balance.rs (coin balance, retried on failure)
//!     → orchestrator.rs (build → sign → submit → confirm, retried on failure)
//!         → ledger::client (through the account's proxy)
//!         → ledger::confirmation
//!         → resilience::retries (on every failure)
//! ```

pub mod balance;
pub mod orchestrator;

pub use balance::BalanceChecker;
pub use orchestrator::{ExecutionOutcome, OrchestratorSettings, TransactionOrchestrator};

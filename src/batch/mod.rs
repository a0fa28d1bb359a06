//! Batch execution subsystem.
//!
//! # Data Flow
//! ```text
//! wallets file + proxies file
//!     → inputs.rs (trim, drop junk lines, pair by position)
//!     → driver.rs (one account at a time)
//!         → ledger::client (one transport per account, bound to its proxy)
//!         → engine::balance (skip unfunded accounts)
//!         → engine::orchestrator (run the payload from operations.rs)
//!     → BatchSummary
//! ```
//!
//! # Design Decisions
//! - A bad key or proxy line costs that account only
//! - Retry ledgers live for the whole run, keyed by address

pub mod driver;
pub mod inputs;
pub mod operations;

pub use driver::{AccountOutcome, BatchDriver, BatchSummary};
pub use inputs::{load_accounts, AccountEntry, InputError};
pub use operations::opt_in_direct_transfer;

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Operation fails (transport, API, poll timeout, execution failure):
//!     → retries.rs (record failure for the account identity)
//!     → allowed: fixed cooldown, then the next iteration
//!     → denied: operation abandoned, batch moves on
//! ```
//!
//! # Design Decisions
//! - Every account gets a fixed attempt ceiling; no global abort
//! - Fixed cooldowns, no exponential backoff
//! - Ledgers are plain values owned by the batch driver, never globals

pub mod retries;

pub use retries::RetryLedger;

//! Ledger node integration subsystem.
//!
//! # Data Flow
//! ```text
//! wallets file (private keys)
//!     → wallet.rs (key loading, address derivation, signing)
//!     → transaction.rs (build raw transaction, BCS encode)
//!     → client.rs (REST calls through the account's proxy)
//!     → confirmation.rs (poll by hash until terminal or ceiling)
//! ```
//!
//! # Security Constraints
//! - Never log private keys
//! - Proxy credentials are masked in logs
//! - Every HTTP call has a request and connect timeout

pub mod client;
pub mod confirmation;
pub mod proxy;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{NodeClient, NodeTransport};
pub use confirmation::ConfirmationPoller;
pub use proxy::ProxyDescriptor;
pub use transaction::{EntryFunction, TransactionPayload, TxBuilder};
pub use types::{AccountAddress, LedgerError, LedgerResult, Lookup, TransactionRecord};
pub use wallet::{LocalAccount, Signer};

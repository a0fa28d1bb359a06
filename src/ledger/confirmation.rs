//! Confirmation polling for submitted transactions.
//!
//! # States
//! ```text
//! AwaitingIndex ──(record no longer pending)──▶ AwaitingFinality ──▶ Confirmed
//!       │                                              │          └─▶ Failed
//!       └──────────────(ceiling reached)───────────────┴──▶ TimedOut
//! ```
//!
//! A record whose `type` is set and is not `pending_transaction` is terminal
//! as reported. A record without a `type` only settles once it reports
//! `success: true`; until then it is re-fetched like a pending one.

use std::time::Duration;
use tokio::time::sleep;

use crate::config::PollingConfig;
use crate::ledger::client::NodeTransport;
use crate::ledger::types::{LedgerError, LedgerResult, Lookup, TransactionRecord};
use crate::observability::metrics;

/// Polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Not indexed yet, or still in the mempool.
    AwaitingIndex,
    /// Indexed; waiting for a settled execution status.
    AwaitingFinality,
}

/// What a single read says about the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    NotIndexed,
    Pending,
    /// Indexed but without an authoritative status yet.
    Unsettled,
    Succeeded,
    Failed(String),
}

impl Settlement {
    pub fn of(lookup: &Lookup) -> Self {
        let record = match lookup {
            Lookup::NotFound => return Settlement::NotIndexed,
            Lookup::Found(record) => record,
        };

        if record.is_pending() {
            return Settlement::Pending;
        }

        match (record.kind.is_some(), record.success) {
            (_, Some(true)) => Settlement::Succeeded,
            (true, Some(false)) => Settlement::Failed(record.diagnostic()),
            _ => Settlement::Unsettled,
        }
    }

    fn is_waiting_for_index(&self) -> bool {
        matches!(self, Settlement::NotIndexed | Settlement::Pending)
    }
}

/// Polls a transaction until it reaches a terminal state or a ceiling.
#[derive(Debug, Clone)]
pub struct ConfirmationPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ConfirmationPoller {
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// Wait for `hash` to be confirmed.
    ///
    /// Each phase makes at most `max_attempts` reads. Transport and API
    /// errors are returned as-is.
    pub async fn wait<T: NodeTransport + ?Sized>(
        &self,
        transport: &T,
        hash: &str,
    ) -> LedgerResult<TransactionRecord> {
        let mut phase = PollPhase::AwaitingIndex;
        let mut lookup = self.fetch(transport, hash).await?;
        let mut attempts = 1;

        loop {
            let settlement = Settlement::of(&lookup);

            match phase {
                PollPhase::AwaitingIndex if settlement.is_waiting_for_index() => {
                    tracing::debug!(hash = %hash, attempts, "Transaction pending");
                }
                PollPhase::AwaitingIndex => {
                    tracing::debug!(hash = %hash, attempts, "Transaction indexed");
                    phase = PollPhase::AwaitingFinality;
                    attempts = 0;
                    continue;
                }
                PollPhase::AwaitingFinality => match (settlement, lookup) {
                    (Settlement::Succeeded, Lookup::Found(record)) => return Ok(record),
                    (Settlement::Failed(vm_status), _) => {
                        return Err(LedgerError::ExecutionFailure {
                            hash: hash.to_string(),
                            vm_status,
                        });
                    }
                    (_, unsettled) => {
                        lookup = unsettled;
                        tracing::debug!(hash = %hash, attempts, "Waiting for execution status");
                    }
                },
            }

            if attempts >= self.max_attempts {
                tracing::warn!(hash = %hash, phase = ?phase, attempts, "Confirmation timed out");
                return Err(LedgerError::PollTimeout {
                    hash: hash.to_string(),
                    attempts,
                });
            }

            sleep(self.interval).await;
            lookup = self.fetch(transport, hash).await?;
            attempts += 1;
        }
    }

    async fn fetch<T: NodeTransport + ?Sized>(&self, transport: &T, hash: &str) -> LedgerResult<Lookup> {
        metrics::record_poll_request();
        transport.fetch_by_hash(hash).await
    }
}

//! Native coin balance reads with the same retry policy as transactions.

use std::time::Duration;
use tokio::time::sleep;

use crate::ledger::client::NodeTransport;
use crate::ledger::types::{format_apt, AccountAddress};
use crate::observability::metrics;
use crate::resilience::RetryLedger;

/// Reads an account's balance, retrying transient failures.
#[derive(Debug, Clone)]
pub struct BalanceChecker {
    cooldown: Duration,
}

impl BalanceChecker {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Balance in octas, or `None` once the ledger denies another attempt.
    ///
    /// An account without a coin store has never been funded and reads as 0.
    pub async fn check<T: NodeTransport + ?Sized>(
        &self,
        transport: &T,
        ledger: &mut RetryLedger,
        address: AccountAddress,
    ) -> Option<u64> {
        let identity = address.to_string();

        loop {
            let err = match transport.coin_balance(address).await {
                Ok(octas) => {
                    tracing::info!("Balance {} APT", format_apt(octas));
                    metrics::record_balance_check("ok");
                    return Some(octas);
                }
                Err(err) if err.is_resource_not_found() => {
                    tracing::info!("Balance 0 APT");
                    metrics::record_balance_check("ok");
                    return Some(0);
                }
                Err(err) => err,
            };

            tracing::error!(identity = %identity, error = %err.describe(), "Balance check failed");

            if !ledger.record_attempt_and_may_retry(&identity) {
                tracing::warn!(
                    identity = %identity,
                    max_attempts = ledger.max_attempts(),
                    "Balance retries exhausted"
                );
                metrics::record_balance_check("abandoned");
                return None;
            }

            metrics::record_retry("balance");
            sleep(self.cooldown).await;
        }
    }
}

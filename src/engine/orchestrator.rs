//! Transaction lifecycle: build, sign, submit, confirm, retry.
//!
//! Each iteration builds a fresh transaction (new gas ceiling, current
//! sequence number), so a retried attempt always produces a new handle. The
//! same transport, and therefore the same proxy, is used for every
//! iteration.

use std::time::Duration;
use tokio::time::sleep;

use crate::config::{ExplorerConfig, GasConfig, PollingConfig};
use crate::ledger::client::NodeTransport;
use crate::ledger::confirmation::ConfirmationPoller;
use crate::ledger::transaction::{TransactionPayload, TxBuilder};
use crate::ledger::types::{LedgerResult, TransactionRecord};
use crate::ledger::wallet::Signer;
use crate::observability::metrics;
use crate::resilience::RetryLedger;

/// Final result of one orchestrated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Confirmed {
        hash: String,
        attempts: u32,
        record: TransactionRecord,
    },
    /// Retries exhausted; `last_error` is the normalized message.
    Abandoned { attempts: u32, last_error: String },
}

impl ExecutionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ExecutionOutcome::Confirmed { .. })
    }
}

/// Settings shared by every orchestrated operation.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub gas: GasConfig,
    pub polling: PollingConfig,
    pub explorer: ExplorerConfig,
    /// Pause between a failed attempt and the next one.
    pub cooldown: Duration,
}

/// Drives a payload through submission and confirmation with bounded retries.
#[derive(Debug, Clone)]
pub struct TransactionOrchestrator {
    builder: TxBuilder,
    poller: ConfirmationPoller,
    explorer: ExplorerConfig,
    cooldown: Duration,
}

impl TransactionOrchestrator {
    pub fn new(settings: OrchestratorSettings) -> Self {
        Self {
            builder: TxBuilder::new(settings.gas),
            poller: ConfirmationPoller::new(&settings.polling),
            explorer: settings.explorer,
            cooldown: settings.cooldown,
        }
    }

    /// Run `payload` for `signer` until it is confirmed or the ledger denies
    /// another attempt. Failures never escape; they end in `Abandoned`.
    pub async fn execute<T, S>(
        &self,
        transport: &T,
        ledger: &mut RetryLedger,
        signer: &S,
        payload: &TransactionPayload,
    ) -> ExecutionOutcome
    where
        T: NodeTransport + ?Sized,
        S: Signer + ?Sized,
    {
        let identity = signer.address().to_string();
        let mut attempts = 0;

        loop {
            attempts += 1;

            let err = match self.attempt(transport, signer, payload).await {
                Ok((hash, record)) => {
                    tracing::info!(hash = %hash, attempts, "Transaction confirmed");
                    metrics::record_transaction_outcome("confirmed");
                    return ExecutionOutcome::Confirmed {
                        hash,
                        attempts,
                        record,
                    };
                }
                Err(err) => err,
            };

            let message = err.describe();
            tracing::error!(identity = %identity, attempts, error = %message, "Transaction attempt failed");

            if !ledger.record_attempt_and_may_retry(&identity) {
                tracing::warn!(
                    identity = %identity,
                    attempts,
                    max_attempts = ledger.max_attempts(),
                    "Retries exhausted, giving up"
                );
                metrics::record_transaction_outcome("abandoned");
                return ExecutionOutcome::Abandoned {
                    attempts,
                    last_error: message,
                };
            }

            metrics::record_retry("transaction");
            tracing::info!(
                cooldown_secs = self.cooldown.as_secs(),
                "Retrying transaction after cooldown"
            );
            sleep(self.cooldown).await;
        }
    }

    /// One build → sign → submit → confirm pass.
    async fn attempt<T, S>(
        &self,
        transport: &T,
        signer: &S,
        payload: &TransactionPayload,
    ) -> LedgerResult<(String, TransactionRecord)>
    where
        T: NodeTransport + ?Sized,
        S: Signer + ?Sized,
    {
        let raw = self
            .builder
            .build(transport, signer.address(), payload.clone())
            .await?;

        tracing::debug!(
            sequence_number = raw.sequence_number,
            max_gas_amount = raw.max_gas_amount,
            function = %payload.describe(),
            "Transaction built"
        );

        let signed = signer.sign(raw)?;
        let bytes = signed.to_bytes()?;

        metrics::record_submission();
        let submitted = transport.submit(&bytes).await?;

        tracing::info!("tx: {}", self.explorer.transaction_url(&submitted.hash));

        let record = self.poller.wait(transport, &submitted.hash).await?;
        Ok((submitted.hash, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::client::MockNodeTransport;
    use crate::ledger::transaction::EntryFunction;
    use crate::ledger::types::{AccountInfo, LedgerError, LedgerInfo, Lookup, SubmittedTransaction};
    use crate::ledger::wallet::LocalAccount;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const TEST_PRIVATE_KEY: &str =
        "0x4aa2fc1c3c2d8d4e7b5b0f0c3c6a3c1e9d7f2b6a5c4d3e2f1a0b9c8d7e6f5a4b";

    fn orchestrator(polling: PollingConfig) -> TransactionOrchestrator {
        TransactionOrchestrator::new(OrchestratorSettings {
            gas: GasConfig::default(),
            polling,
            explorer: ExplorerConfig::default(),
            cooldown: Duration::from_secs(10),
        })
    }

    fn payload() -> TransactionPayload {
        TransactionPayload::EntryFunction(
            EntryFunction::new("0x3::token::opt_in_direct_transfer")
                .unwrap()
                .arg(&true)
                .unwrap(),
        )
    }

    fn node_state(transport: &mut MockNodeTransport) {
        transport
            .expect_account()
            .returning(|_| Ok(AccountInfo { sequence_number: 3 }));
        transport
            .expect_ledger_info()
            .returning(|| Ok(LedgerInfo { chain_id: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_never_exceed_ceiling() {
        let mut transport = MockNodeTransport::new();
        node_state(&mut transport);
        transport.expect_submit().times(3).returning(|_| {
            Err(LedgerError::Api {
                status: 429,
                body: r#"{"message":"rate limited"}"#.to_string(),
            })
        });
        transport.expect_fetch_by_hash().never();

        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut ledger = RetryLedger::new(3);

        let outcome = orchestrator(PollingConfig::default())
            .execute(&transport, &mut ledger, &account, &payload())
            .await;

        assert_eq!(
            outcome,
            ExecutionOutcome::Abandoned {
                attempts: 3,
                last_error: "rate limited".to_string(),
            }
        );
        assert_eq!(ledger.attempts(&account.address().to_string()), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_identity_gets_single_attempt() {
        let mut transport = MockNodeTransport::new();
        node_state(&mut transport);
        transport
            .expect_submit()
            .times(1)
            .returning(|_| Err(LedgerError::Decode("garbled".to_string())));

        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let identity = account.address().to_string();
        let mut ledger = RetryLedger::new(2);
        ledger.record_attempt_and_may_retry(&identity);
        ledger.record_attempt_and_may_retry(&identity);

        let outcome = orchestrator(PollingConfig::default())
            .execute(&transport, &mut ledger, &account, &payload())
            .await;

        assert!(matches!(outcome, ExecutionOutcome::Abandoned { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_without_touching_ledger() {
        let mut transport = MockNodeTransport::new();
        node_state(&mut transport);
        transport.expect_submit().times(1).returning(|_| {
            Ok(SubmittedTransaction {
                hash: "0xh".to_string(),
            })
        });

        let reads = Arc::new(AtomicU32::new(0));
        let counter = reads.clone();
        transport
            .expect_fetch_by_hash()
            .times(2)
            .withf(|hash: &str| hash == "0xh")
            .returning(move |_| {
                let record = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    TransactionRecord {
                        kind: Some("pending_transaction".to_string()),
                        ..Default::default()
                    }
                } else {
                    TransactionRecord {
                        kind: Some("user_transaction".to_string()),
                        success: Some(true),
                        ..Default::default()
                    }
                };
                Ok(Lookup::Found(record))
            });

        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut ledger = RetryLedger::new(3);

        let outcome = orchestrator(PollingConfig::default())
            .execute(&transport, &mut ledger, &account, &payload())
            .await;

        assert!(outcome.is_confirmed());
        assert!(matches!(outcome, ExecutionOutcome::Confirmed { attempts: 1, ref hash, .. } if hash == "0xh"));
        assert_eq!(ledger.tracked(), 0);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_timeout_uses_fresh_submission() {
        let mut transport = MockNodeTransport::new();
        node_state(&mut transport);

        let submissions = Arc::new(AtomicU32::new(0));
        let counter = submissions.clone();
        transport.expect_submit().times(2).returning(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(SubmittedTransaction {
                hash: format!("0x{}", n),
            })
        });
        transport.expect_fetch_by_hash().returning(|hash| {
            if hash == "0x0" {
                Ok(Lookup::NotFound)
            } else {
                Ok(Lookup::Found(TransactionRecord {
                    kind: Some("user_transaction".to_string()),
                    success: Some(true),
                    ..Default::default()
                }))
            }
        });

        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut ledger = RetryLedger::new(3);
        let polling = PollingConfig {
            interval_ms: 1000,
            max_attempts: 5,
        };

        let started = tokio::time::Instant::now();
        let outcome = orchestrator(polling)
            .execute(&transport, &mut ledger, &account, &payload())
            .await;

        assert!(matches!(outcome, ExecutionOutcome::Confirmed { attempts: 2, ref hash, .. } if hash == "0x1"));
        assert_eq!(ledger.attempts(&account.address().to_string()), 1);
        // Four poll gaps on the first handle plus the cooldown.
        assert_eq!(started.elapsed(), Duration::from_secs(4 + 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_failure_is_retried() {
        let mut transport = MockNodeTransport::new();
        node_state(&mut transport);
        transport.expect_submit().times(2).returning(|_| {
            Ok(SubmittedTransaction {
                hash: "0xf".to_string(),
            })
        });
        transport.expect_fetch_by_hash().times(2).returning(|_| {
            Ok(Lookup::Found(TransactionRecord {
                kind: Some("user_transaction".to_string()),
                success: Some(false),
                vm_status: Some("Move abort".to_string()),
                ..Default::default()
            }))
        });

        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut ledger = RetryLedger::new(2);

        let outcome = orchestrator(PollingConfig::default())
            .execute(&transport, &mut ledger, &account, &payload())
            .await;

        match outcome {
            ExecutionOutcome::Abandoned { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("Move abort"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}

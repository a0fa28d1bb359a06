//! Sequential walk over the account list.

use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::Instrument;
use uuid::Uuid;

use crate::batch::inputs::AccountEntry;
use crate::config::BatchConfig;
use crate::engine::{BalanceChecker, ExecutionOutcome, OrchestratorSettings, TransactionOrchestrator};
use crate::ledger::client::{NodeClient, NodeTransport};
use crate::ledger::proxy::ProxyDescriptor;
use crate::ledger::transaction::TransactionPayload;
use crate::ledger::types::format_apt;
use crate::ledger::wallet::{LocalAccount, Signer};
use crate::resilience::RetryLedger;

const SEPARATOR_WIDTH: usize = 130;

/// Counts reported once the batch finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub accounts: usize,
    /// Zero balance, or the balance could not be read.
    pub skipped: usize,
    pub confirmed: usize,
    pub abandoned: usize,
    /// Bad private key or proxy line.
    pub invalid: usize,
}

/// What happened to a single account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    Invalid(String),
    Skipped { balance: Option<u64> },
    Executed(ExecutionOutcome),
}

impl BatchSummary {
    fn record(&mut self, outcome: &AccountOutcome) {
        self.accounts += 1;
        match outcome {
            AccountOutcome::Invalid(_) => self.invalid += 1,
            AccountOutcome::Skipped { .. } => self.skipped += 1,
            AccountOutcome::Executed(outcome) if outcome.is_confirmed() => self.confirmed += 1,
            AccountOutcome::Executed(_) => self.abandoned += 1,
        }
    }
}

/// Runs one payload for every funded account, one account at a time.
///
/// Balance reads and transactions keep separate retry ledgers, so a flaky
/// balance endpoint never eats into an account's transaction attempts.
pub struct BatchDriver {
    config: BatchConfig,
    payload: TransactionPayload,
    balance: BalanceChecker,
    orchestrator: TransactionOrchestrator,
    balance_ledger: RetryLedger,
    transaction_ledger: RetryLedger,
}

impl BatchDriver {
    pub fn new(config: BatchConfig, payload: TransactionPayload) -> Self {
        let orchestrator = TransactionOrchestrator::new(OrchestratorSettings {
            gas: config.gas.clone(),
            polling: config.polling.clone(),
            explorer: config.explorer.clone(),
            cooldown: Duration::from_secs(config.retries.cooldown_secs),
        });

        Self {
            balance: BalanceChecker::new(Duration::from_secs(config.retries.balance_cooldown_secs)),
            balance_ledger: RetryLedger::new(config.retries.max_attempts),
            transaction_ledger: RetryLedger::new(config.retries.max_attempts),
            orchestrator,
            payload,
            config,
        }
    }

    pub fn balance_ledger(&self) -> &RetryLedger {
        &self.balance_ledger
    }

    pub fn transaction_ledger(&self) -> &RetryLedger {
        &self.transaction_ledger
    }

    /// Process every account in order. Never fails; per-account problems
    /// end up in the summary.
    pub async fn run(&mut self, accounts: &[AccountEntry]) -> BatchSummary {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", run_id = %run_id, accounts = accounts.len());

        async {
            tracing::info!(function = %self.payload.describe(), "Starting batch");

            let delay = Duration::from_millis(self.config.batch.sleep_ms);
            let mut summary = BatchSummary::default();

            for (position, entry) in accounts.iter().enumerate() {
                let outcome = self.process(entry).await;
                summary.record(&outcome);
                tracing::info!("{}", "-".repeat(SEPARATOR_WIDTH));

                if position + 1 < accounts.len() && !delay.is_zero() {
                    sleep(delay).await;
                }
            }

            tracing::info!(
                accounts = summary.accounts,
                confirmed = summary.confirmed,
                abandoned = summary.abandoned,
                skipped = summary.skipped,
                invalid = summary.invalid,
                "Batch finished"
            );
            summary
        }
        .instrument(span)
        .await
    }

    async fn process(&mut self, entry: &AccountEntry) -> AccountOutcome {
        let account = match LocalAccount::from_private_key(&entry.private_key) {
            Ok(account) => account,
            Err(err) => {
                tracing::error!(index = entry.index, error = %err, "Invalid private key, skipping account");
                return AccountOutcome::Invalid(err.to_string());
            }
        };

        let client = match ProxyDescriptor::parse(&entry.proxy)
            .and_then(|proxy| NodeClient::new(&self.config.node, &proxy))
        {
            Ok(client) => client,
            Err(err) => {
                tracing::error!(index = entry.index, error = %err, "Invalid proxy, skipping account");
                return AccountOutcome::Invalid(err.to_string());
            }
        };

        let span = tracing::info_span!(
            "account",
            index = entry.index,
            address = %account.address(),
            proxy = %client.proxy()
        );
        self.process_with(&client, &account).instrument(span).await
    }

    /// Balance gate, then the payload. Exposed to the crate so tests can
    /// drive it with a mocked transport.
    pub(crate) async fn process_with<T, S>(&mut self, transport: &T, signer: &S) -> AccountOutcome
    where
        T: NodeTransport + ?Sized,
        S: Signer + ?Sized,
    {
        let address = signer.address();
        tracing::info!("{}", address);

        let balance = self
            .balance
            .check(transport, &mut self.balance_ledger, address)
            .await;

        let octas = match balance {
            Some(octas) if octas > 0 => octas,
            Some(_) => {
                tracing::info!("Empty balance, skipping account");
                return AccountOutcome::Skipped { balance };
            }
            None => {
                tracing::warn!("Balance unavailable, skipping account");
                return AccountOutcome::Skipped { balance };
            }
        };

        tracing::debug!(balance = %format_apt(octas), "Account funded");

        let outcome = self
            .orchestrator
            .execute(transport, &mut self.transaction_ledger, signer, &self.payload)
            .await;
        AccountOutcome::Executed(outcome)
    }
}

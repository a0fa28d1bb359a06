//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ledger_submissions_total` (counter): signed transactions posted
//! - `ledger_poll_requests_total` (counter): by-hash reads
//! - `ledger_retries_total` (counter): retries granted, by operation
//! - `ledger_transactions_total` (counter): final outcomes, by outcome
//! - `ledger_balance_checks_total` (counter): balance reads, by outcome
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on `addr`. Must run inside a runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission() {
    ::metrics::counter!("ledger_submissions_total").increment(1);
}

pub fn record_poll_request() {
    ::metrics::counter!("ledger_poll_requests_total").increment(1);
}

pub fn record_retry(operation: &'static str) {
    ::metrics::counter!("ledger_retries_total", "operation" => operation).increment(1);
}

pub fn record_transaction_outcome(outcome: &'static str) {
    ::metrics::counter!("ledger_transactions_total", "outcome" => outcome).increment(1);
}

pub fn record_balance_check(outcome: &'static str) {
    ::metrics::counter!("ledger_balance_checks_total", "outcome" => outcome).increment(1);
}

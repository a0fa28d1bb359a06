//! Per-identity retry accounting.
//!
//! # Responsibilities
//! - Count failed attempts per account identity
//! - Authorize or deny one more attempt against a fixed ceiling
//!
//! Counts only grow; an identity that reached the ceiling stays there for the
//! lifetime of the ledger.

use std::collections::HashMap;

/// Failure counts keyed by account identity.
#[derive(Debug, Clone)]
pub struct RetryLedger {
    max_attempts: u32,
    counts: HashMap<String, u32>,
}

impl RetryLedger {
    /// Create a ledger allowing `max_attempts` attempts per identity.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            counts: HashMap::new(),
        }
    }

    /// Record a failed attempt for `identity` and report whether another
    /// attempt may be made.
    ///
    /// Returns true iff the count after this failure is still below the
    /// ceiling, so at most `max_attempts` attempts are ever made.
    pub fn record_attempt_and_may_retry(&mut self, identity: &str) -> bool {
        let count = self.counts.entry(identity.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count < self.max_attempts
    }

    /// Failures recorded so far for `identity`.
    pub fn attempts(&self, identity: &str) -> u32 {
        self.counts.get(identity).copied().unwrap_or(0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Number of identities with at least one recorded failure.
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine + ledger client produce:
//!     → logging.rs (structured log events, run/account spans)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BatchConfig (validated, immutable)
//!     → CLI flags override selected fields
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - A missing config file is fine; defaults apply
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BatchConfig, ExplorerConfig, GasConfig, NodeConfig, ObservabilityConfig, PollingConfig,
    RetryConfig, RunConfig,
};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RotatorConfig (validated, immutable)
//!     → candidates.rs (chain ID → ordered endpoint URLs)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the candidate table is read-only at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod candidates;
pub mod loader;
pub mod schema;
pub mod validation;

pub use candidates::CandidateTable;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, RotationConfig, RotatorConfig};

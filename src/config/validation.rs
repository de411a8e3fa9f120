//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval in 1..=30 days, timeout > 0)
//! - Check the candidate table (integer keys, http(s) URLs, no empty lists)
//! - Check that the configured chain actually has candidates
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RotatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::candidates::CandidateTable;
use crate::config::schema::{RotatorConfig, MAX_ROTATE_INTERVAL_MINS};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rotation.{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("rotation.{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("candidate key '{0}' is not an integer chain ID")]
    InvalidChainKey(String),

    #[error("candidate list for chain {0} is empty")]
    EmptyCandidates(u64),

    #[error("candidate URL '{url}' for chain {chain_id} is invalid: {reason}")]
    InvalidUrl {
        chain_id: u64,
        url: String,
        reason: String,
    },

    #[error("no candidates configured for chain {0}")]
    MissingChain(u64),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RotatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let rotation = &config.rotation;

    if rotation.rotate_interval_mins == 0 {
        errors.push(ValidationError::ZeroValue { field: "rotate_interval_mins" });
    } else if rotation.rotate_interval_mins > MAX_ROTATE_INTERVAL_MINS {
        errors.push(ValidationError::TooLarge {
            field: "rotate_interval_mins",
            max: MAX_ROTATE_INTERVAL_MINS,
        });
    }
    if rotation.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "probe_timeout_ms" });
    }
    if rotation.max_providers == 0 {
        errors.push(ValidationError::ZeroValue { field: "max_providers" });
    }

    match CandidateTable::parse(&config.candidates) {
        Ok(table) => {
            if !table.contains(rotation.chain_id.into()) {
                errors.push(ValidationError::MissingChain(rotation.chain_id));
            }
        }
        Err(table_errors) => errors.extend(table_errors),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Endpoint selection subsystem.
//!
//! # Data Flow
//! ```text
//! chain ID + ordered candidates
//!     → selector.rs (fan out one probe per candidate, join all)
//!     → filter healthy, stable sort by elapsed
//!     → fastest URL, or NoHealthyEndpoint
//! ```
//!
//! # Design Decisions
//! - No concurrency cap beyond the candidate list length
//! - Equal elapsed times resolve to the earlier candidate

pub mod selector;

use thiserror::Error;

use crate::blockchain::types::ChainId;

pub use selector::{EndpointSelector, SelectionRound};

/// Errors produced by a selection round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Every candidate failed its probe (or there were none).
    #[error("no healthy endpoint for chain {chain_id} ({probed} candidates probed)")]
    NoHealthyEndpoint { chain_id: ChainId, probed: usize },
}

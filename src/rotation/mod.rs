//! Endpoint rotation subsystem.
//!
//! # Data Flow
//! ```text
//! create():
//!     select_best (awaited) → EndpointClient for the winner → Ready
//!     → spawn rotation task (interval = rotate_interval_mins)
//!
//! every tick / manual rotate():
//!     rotation lock → select_best
//!     → same URL:      nothing
//!     → different URL: new EndpointClient, ArcSwap::swap, publish RotationEvent
//!     → no healthy:    keep current, log + count
//!
//! stop():
//!     Stopped → shutdown signal ends the task after any in-flight round
//! ```
//!
//! # Design Decisions
//! - The active client is replaced wholesale; readers hold an `Arc` snapshot
//! - Rounds never overlap for one manager
//! - A failed background round is never an error to callers

pub mod manager;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::blockchain::client::EndpointClient;
use crate::blockchain::types::ChainId;
use crate::selection::SelectionError;

pub use manager::RotationManager;

/// Manager lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Initializing = 0,
    Ready = 1,
    Stopped = 2,
}

impl From<u8> for ManagerState {
    fn from(val: u8) -> Self {
        match val {
            1 => ManagerState::Ready,
            2 => ManagerState::Stopped,
            _ => ManagerState::Initializing,
        }
    }
}

/// Move `state` from `from` to `to`. Returns false if it was not in `from`.
pub(crate) fn transition(state: &AtomicU8, from: ManagerState, to: ManagerState) -> bool {
    state
        .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

/// Published when the active endpoint changes.
#[derive(Debug, Clone)]
pub struct RotationEvent {
    pub chain_id: ChainId,
    pub new_url: Url,
    /// The retired client, for draining in-flight work.
    pub previous: Arc<EndpointClient>,
}

/// What one `rotate()` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The current endpoint is still the fastest.
    Unchanged,
    /// The active endpoint was replaced.
    Rotated { from: Url, to: Url },
    /// No candidate was healthy; the current endpoint stays active.
    Skipped(SelectionError),
    /// The manager was stopped; nothing was probed.
    Stopped,
}

/// Errors creating a rotation manager.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("no candidates configured for chain {0}")]
    UnknownNetwork(ChainId),

    #[error("invalid rotation config: {0}")]
    InvalidConfig(String),

    #[error("failed to build liveness client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type RotationResult<T> = Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for state in [ManagerState::Initializing, ManagerState::Ready, ManagerState::Stopped] {
            assert_eq!(ManagerState::from(state as u8), state);
        }
    }

    #[test]
    fn test_transition_forward_only() {
        let state = AtomicU8::new(ManagerState::Initializing as u8);

        assert!(transition(&state, ManagerState::Initializing, ManagerState::Ready));
        assert!(!transition(&state, ManagerState::Initializing, ManagerState::Ready));
        assert_eq!(ManagerState::from(state.load(Ordering::SeqCst)), ManagerState::Ready);

        state.store(ManagerState::Stopped as u8, Ordering::SeqCst);
        assert!(!transition(&state, ManagerState::Ready, ManagerState::Stopped));
        assert!(!transition(&state, ManagerState::Initializing, ManagerState::Ready));
        assert_eq!(ManagerState::from(state.load(Ordering::SeqCst)), ManagerState::Stopped);
    }

    #[test]
    fn test_error_display() {
        let err = RotationError::from(SelectionError::NoHealthyEndpoint {
            chain_id: ChainId(137),
            probed: 3,
        });
        assert_eq!(err.to_string(), "no healthy endpoint for chain 137 (3 candidates probed)");
        assert_eq!(
            RotationError::UnknownNetwork(ChainId(10)).to_string(),
            "no candidates configured for chain 10"
        );
    }
}

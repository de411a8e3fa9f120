//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Selection round (shared start instant)
//!     → prober.rs (race one check against the timeout)
//!     → liveness.rs (eth_chainId request, decode, compare)
//!     → ProbeResult { url, elapsed, healthy }
//! ```
//!
//! # Design Decisions
//! - One timed attempt per endpoint per round, no retries
//! - Probe failures are values, never errors to the caller
//! - Elapsed is measured from the round start so results rank within the round

pub mod liveness;
pub mod prober;

#[cfg(test)]
pub(crate) mod testing;

pub use liveness::{JsonRpcLiveness, LivenessCheck, ProbeFailure};
pub use prober::{ProbeResult, Prober, DEFAULT_PROBE_TIMEOUT};

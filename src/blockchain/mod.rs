//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Selected endpoint URL
//!     → client.rs (provider bound to the URL, timeouts)
//!     → fees.rs (fetch fee data, pick EIP-1559 or legacy)
//!     → transaction.rs (fill fees, broadcast)
//! ```
//!
//! # Constraints
//! - Signing and key management stay with the caller
//! - All RPC calls have timeouts
//! - Exactly one fee representation is ever written to a transaction

pub mod client;
pub mod fees;
pub mod transaction;
pub mod types;

pub use client::EndpointClient;
pub use fees::{AppliedFee, FeeData, FeeSource};
pub use types::{BlockchainError, BlockchainResult, ChainId};

//! RPC endpoint rotator library.
//!
//! Keeps each chain connected to its fastest healthy JSON-RPC endpoint,
//! re-racing the candidate pool in the background and swapping the active
//! endpoint without interrupting callers.

pub mod blockchain;
pub mod config;
pub mod events;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod rotation;
pub mod selection;

pub use blockchain::{ChainId, EndpointClient};
pub use config::RotatorConfig;
pub use rotation::{RotationEvent, RotationManager, RotationOutcome};
pub use selection::EndpointSelector;

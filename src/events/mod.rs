//! Event notification subsystem.
//!
//! # Data Flow
//! ```text
//! Rotation swaps the active endpoint
//!     → channel.rs publishes a RotationEvent
//!     → every subscriber runs synchronously, in registration order
//! ```
//!
//! # Design Decisions
//! - One uniform ordered list regardless of subscriber count
//! - Subscriber failures are logged per handler, never propagated

pub mod channel;

pub use channel::{DispatchReport, EventChannel, SubscriberError, SubscriptionId};

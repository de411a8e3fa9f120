//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Rotation task (shutdown.rs):
//!     RotationManager::stop() → broadcast → task exits after in-flight round
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → CLI stops its managers and exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

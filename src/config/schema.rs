//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the rotator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest accepted rotation interval (30 days).
pub const MAX_ROTATE_INTERVAL_MINS: u64 = 30 * 24 * 60;

/// Root configuration for the rotator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RotatorConfig {
    /// Rotation settings (target chain, interval, probe timeout).
    pub rotation: RotationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Candidate endpoint URLs keyed by chain ID (as a string, e.g. "137").
    pub candidates: BTreeMap<String, Vec<String>>,
}

/// Rotation manager configuration.
///
/// Immutable once a manager has been built from it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RotationConfig {
    /// Chain ID the manager serves (e.g., 1 for Ethereum mainnet, 137 for Polygon).
    pub chain_id: u64,

    /// Soft cap on the candidate pool size. Advisory only: never truncates.
    pub max_providers: usize,

    /// Minutes between background rotation rounds, at most
    /// [`MAX_ROTATE_INTERVAL_MINS`].
    pub rotate_interval_mins: u64,

    /// Per-probe liveness timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            max_providers: 5,
            rotate_interval_mins: 60,
            probe_timeout_ms: 3000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

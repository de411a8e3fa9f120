//! Bounded-time endpoint probing.
//!
//! # Responsibilities
//! - Race one liveness check against a fixed timeout
//! - Mark the endpoint healthy only if it answered in time with the expected chain
//! - Report elapsed time from the round's shared start instant

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use url::Url;

use crate::blockchain::types::ChainId;
use crate::health::liveness::{LivenessCheck, ProbeFailure};
use crate::observability::metrics;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Outcome of one probe. Produced fresh per attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: Url,
    /// Time from the round's start until this probe settled.
    pub elapsed: Duration,
    pub healthy: bool,
}

/// Runs single liveness checks with a timeout.
#[derive(Clone)]
pub struct Prober {
    checker: Arc<dyn LivenessCheck>,
    timeout_duration: Duration,
}

impl Prober {
    pub fn new(checker: Arc<dyn LivenessCheck>, timeout_duration: Duration) -> Self {
        Self {
            checker,
            timeout_duration,
        }
    }

    /// Probe `url` on its own, timing from now.
    pub async fn probe(&self, url: &Url, chain_id: ChainId) -> ProbeResult {
        self.probe_from(url, chain_id, Instant::now()).await
    }

    /// Probe `url`, measuring elapsed time from `round_start`.
    ///
    /// Never fails; every failure becomes `healthy = false`.
    pub async fn probe_from(&self, url: &Url, chain_id: ChainId, round_start: Instant) -> ProbeResult {
        let outcome = match timeout(self.timeout_duration, self.checker.chain_id(url)).await {
            Ok(Ok(actual)) if actual == chain_id => Ok(()),
            Ok(Ok(actual)) => Err(ProbeFailure::ChainMismatch {
                expected: chain_id,
                actual,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeFailure::Timeout(self.timeout_duration.as_millis() as u64)),
        };
        let elapsed = round_start.elapsed();

        let healthy = match outcome {
            Ok(()) => {
                tracing::debug!(url = %url, elapsed_ms = elapsed.as_millis() as u64, "Probe succeeded");
                true
            }
            Err(e) => {
                tracing::debug!(url = %url, chain_id = %chain_id, error = %e, "Probe failed");
                false
            }
        };
        metrics::record_probe(healthy, elapsed);

        ProbeResult {
            url: url.clone(),
            elapsed,
            healthy,
        }
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::testing::{ScriptedLiveness, Step};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn assert_close(elapsed: Duration, expected_ms: u64) {
        let ms = elapsed.as_millis() as u64;
        assert!(
            ms >= expected_ms && ms <= expected_ms + 1,
            "elapsed {}ms, expected ~{}ms",
            ms,
            expected_ms
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_probe() {
        let checker = ScriptedLiveness::new();
        checker.set(&url("http://a.test"), Step::answer(50, 137));
        let prober = Prober::new(Arc::new(checker), DEFAULT_PROBE_TIMEOUT);

        let result = prober.probe(&url("http://a.test"), ChainId(137)).await;
        assert!(result.healthy);
        assert_close(result.elapsed, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_mismatch_is_unhealthy() {
        let checker = ScriptedLiveness::new();
        checker.set(&url("http://a.test"), Step::answer(10, 1));
        let prober = Prober::new(Arc::new(checker), DEFAULT_PROBE_TIMEOUT);

        let result = prober.probe(&url("http://a.test"), ChainId(137)).await;
        assert!(!result.healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unhealthy_and_bounded() {
        let checker = ScriptedLiveness::new();
        checker.set(&url("http://slow.test"), Step::answer(10_000, 137));
        let prober = Prober::new(Arc::new(checker), DEFAULT_PROBE_TIMEOUT);

        let result = prober.probe(&url("http://slow.test"), ChainId(137)).await;
        assert!(!result.healthy);
        assert_close(result.elapsed, 3000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_unhealthy() {
        let checker = ScriptedLiveness::new();
        checker.set(&url("http://down.test"), Step::fail(5));
        let prober = Prober::new(Arc::new(checker), DEFAULT_PROBE_TIMEOUT);

        let result = prober.probe(&url("http://down.test"), ChainId(137)).await;
        assert!(!result.healthy);
        assert_close(result.elapsed, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_counts_from_round_start() {
        let checker = ScriptedLiveness::new();
        checker.set(&url("http://a.test"), Step::answer(20, 1));
        let prober = Prober::new(Arc::new(checker), DEFAULT_PROBE_TIMEOUT);

        let round_start = Instant::now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let result = prober.probe_from(&url("http://a.test"), ChainId(1), round_start).await;

        assert_close(result.elapsed, 50);
    }
}

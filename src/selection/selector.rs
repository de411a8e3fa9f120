//! Fastest-endpoint selection.
//!
//! # Responsibilities
//! - Probe every candidate concurrently from one shared start instant
//! - Wait for every probe to settle (no early exit)
//! - Rank healthy survivors by elapsed time and return the fastest

use futures_util::future::join_all;
use tokio::time::Instant;
use url::Url;

use crate::blockchain::types::ChainId;
use crate::health::prober::{ProbeResult, Prober};
use crate::observability::metrics;
use crate::selection::SelectionError;

/// All probe results of one round, fastest healthy first.
#[derive(Debug, Clone)]
pub struct SelectionRound {
    pub chain_id: ChainId,
    /// Every probe result in candidate order.
    pub results: Vec<ProbeResult>,
    /// Healthy results ranked by elapsed time; ties keep candidate order.
    pub ranked: Vec<ProbeResult>,
}

impl SelectionRound {
    pub fn winner(&self) -> Option<&ProbeResult> {
        self.ranked.first()
    }
}

/// Runs selection rounds with a fixed prober.
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    prober: Prober,
}

impl EndpointSelector {
    pub fn new(prober: Prober) -> Self {
        Self { prober }
    }

    /// Probe all candidates and return the full ranked round.
    pub async fn run_round(&self, chain_id: ChainId, candidates: &[Url]) -> SelectionRound {
        let round_start = Instant::now();

        // join_all keeps input order, so the stable sort below breaks ties by candidate order.
        let results: Vec<ProbeResult> = join_all(
            candidates
                .iter()
                .map(|url| self.prober.probe_from(url, chain_id, round_start)),
        )
        .await;

        let mut ranked: Vec<ProbeResult> = results.iter().filter(|r| r.healthy).cloned().collect();
        ranked.sort_by_key(|r| r.elapsed);

        metrics::record_healthy_candidates(chain_id, ranked.len());
        tracing::debug!(
            chain_id = %chain_id,
            candidates = candidates.len(),
            healthy = ranked.len(),
            round_ms = round_start.elapsed().as_millis() as u64,
            "Selection round complete"
        );

        SelectionRound {
            chain_id,
            results,
            ranked,
        }
    }

    /// Return the URL of the fastest healthy candidate.
    pub async fn select_best(&self, chain_id: ChainId, candidates: &[Url]) -> Result<Url, SelectionError> {
        let round = self.run_round(chain_id, candidates).await;
        match round.winner() {
            Some(best) => Ok(best.url.clone()),
            None => Err(SelectionError::NoHealthyEndpoint {
                chain_id,
                probed: candidates.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::prober::DEFAULT_PROBE_TIMEOUT;
    use crate::health::testing::{ScriptedLiveness, Step};
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn selector(checker: Arc<ScriptedLiveness>) -> EndpointSelector {
        EndpointSelector::new(Prober::new(checker, DEFAULT_PROBE_TIMEOUT))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_healthy_wins_over_timeout() {
        let (a, b, c) = (url("http://a.test"), url("http://b.test"), url("http://c.test"));
        let checker = Arc::new(ScriptedLiveness::new());
        checker.set(&a, Step::answer(50, 137));
        checker.set(&b, Step::answer(10_000, 137));
        checker.set(&c, Step::answer(120, 137));

        let best = selector(checker)
            .select_best(ChainId(137), &[a.clone(), b, c])
            .await
            .unwrap();
        assert_eq!(best, a);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lower_latency_wins() {
        let (a, b) = (url("http://a.test"), url("http://b.test"));
        let checker = Arc::new(ScriptedLiveness::new());
        checker.set(&a, Step::answer(200, 1));
        checker.set(&b, Step::answer(80, 1));

        let best = selector(checker).select_best(ChainId(1), &[a, b.clone()]).await.unwrap();
        assert_eq!(best, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_returns_failed_candidate() {
        let (a, b, c) = (url("http://a.test"), url("http://b.test"), url("http://c.test"));
        let checker = Arc::new(ScriptedLiveness::new());
        checker.set(&a, Step::answer(1, 1)); // fastest, wrong chain
        checker.set(&b, Step::fail(2)); // fast, transport error
        checker.set(&c, Step::answer(900, 137));

        let round = selector(checker).run_round(ChainId(137), &[a, b, c.clone()]).await;
        assert_eq!(round.results.len(), 3);
        assert_eq!(round.ranked.len(), 1);
        assert_eq!(round.winner().unwrap().url, c);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failing_is_no_healthy_endpoint() {
        let (a, b) = (url("http://a.test"), url("http://b.test"));
        let checker = Arc::new(ScriptedLiveness::new());
        checker.set(&a, Step::fail(5));
        checker.set(&b, Step::answer(10_000, 137));

        let err = selector(checker).select_best(ChainId(137), &[a, b]).await.unwrap_err();
        assert!(matches!(
            err,
            SelectionError::NoHealthyEndpoint { chain_id: ChainId(137), probed: 2 }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_candidates_is_no_healthy_endpoint() {
        let checker = Arc::new(ScriptedLiveness::new());
        let err = selector(checker).select_best(ChainId(1), &[]).await.unwrap_err();
        assert!(matches!(err, SelectionError::NoHealthyEndpoint { probed: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_breaks_by_candidate_order() {
        let (a, b) = (url("http://a.test"), url("http://b.test"));
        let checker = Arc::new(ScriptedLiveness::new());
        checker.set(&a, Step::answer(100, 1));
        checker.set(&b, Step::answer(100, 1));

        let s = selector(checker);
        let best = s.select_best(ChainId(1), &[b.clone(), a.clone()]).await.unwrap();
        assert_eq!(best, b);
        let best = s.select_best(ChainId(1), &[a.clone(), b]).await.unwrap();
        assert_eq!(best, a);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_run_concurrently_and_all_settle() {
        let urls: Vec<Url> = (0..5).map(|i| url(&format!("http://n{}.test", i))).collect();
        let checker = Arc::new(ScriptedLiveness::new());
        for (i, u) in urls.iter().enumerate() {
            checker.set(u, Step::answer(100 * (i as u64 + 1), 1));
        }

        let start = Instant::now();
        let round = selector(checker.clone()).run_round(ChainId(1), &urls).await;

        // Sequential probing would take 1.5s; concurrent takes the slowest probe.
        let took = start.elapsed().as_millis();
        assert!((500..=501).contains(&took), "round took {}ms", took);
        assert_eq!(checker.calls(), 5);
        assert_eq!(round.ranked.len(), 5);
        assert_eq!(round.winner().unwrap().url, urls[0]);
    }
}

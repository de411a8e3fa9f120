//! Rotation manager.
//!
//! # Responsibilities
//! - Perform the initial selection before handing out a manager
//! - Own the active endpoint client and swap it atomically
//! - Re-run selection on a fixed interval and on demand
//! - Notify subscribers with the retired client on every change

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::blockchain::client::EndpointClient;
use crate::blockchain::types::ChainId;
use crate::config::candidates::CandidateTable;
use crate::config::schema::{RotationConfig, MAX_ROTATE_INTERVAL_MINS};
use crate::events::{EventChannel, SubscriberError, SubscriptionId};
use crate::health::liveness::{JsonRpcLiveness, LivenessCheck};
use crate::health::prober::Prober;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::rotation::{transition, ManagerState, RotationError, RotationEvent, RotationOutcome, RotationResult};
use crate::selection::EndpointSelector;

struct Inner {
    config: RotationConfig,
    chain_id: ChainId,
    candidates: Vec<Url>,
    selector: EndpointSelector,
    active: ArcSwap<EndpointClient>,
    events: EventChannel<RotationEvent>,
    rotation_lock: tokio::sync::Mutex<()>,
    state: AtomicU8,
}

/// Keeps one chain connected to its fastest healthy endpoint.
pub struct RotationManager {
    inner: Arc<Inner>,
    shutdown: Shutdown,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RotationManager {
    /// Create a manager for `config.chain_id` using candidates from `table`
    /// and the JSON-RPC liveness check.
    pub async fn from_table(config: RotationConfig, table: &CandidateTable) -> RotationResult<Self> {
        let chain_id = ChainId(config.chain_id);
        let candidates = table
            .urls_for(chain_id)
            .ok_or(RotationError::UnknownNetwork(chain_id))?
            .to_vec();

        let checker = JsonRpcLiveness::new(Duration::from_millis(config.probe_timeout_ms))?;
        Self::create(config, candidates, Arc::new(checker)).await
    }

    /// Run the initial selection, bind the winner and start the rotation timer.
    ///
    /// Fails if no candidate is healthy; no manager exists in that case.
    pub async fn create(
        config: RotationConfig,
        candidates: Vec<Url>,
        checker: Arc<dyn LivenessCheck>,
    ) -> RotationResult<Self> {
        if config.rotate_interval_mins == 0 {
            return Err(RotationError::InvalidConfig(
                "rotate_interval_mins must be greater than zero".to_string(),
            ));
        }
        if config.rotate_interval_mins > MAX_ROTATE_INTERVAL_MINS {
            return Err(RotationError::InvalidConfig(format!(
                "rotate_interval_mins must be at most {}",
                MAX_ROTATE_INTERVAL_MINS
            )));
        }
        if config.probe_timeout_ms == 0 {
            return Err(RotationError::InvalidConfig(
                "probe_timeout_ms must be greater than zero".to_string(),
            ));
        }

        let chain_id = ChainId(config.chain_id);
        if candidates.len() > config.max_providers {
            tracing::warn!(
                chain_id = %chain_id,
                candidates = candidates.len(),
                max_providers = config.max_providers,
                "Candidate list exceeds max_providers; probing all of them"
            );
        }

        let state = AtomicU8::new(ManagerState::Initializing as u8);
        metrics::record_manager_state(chain_id, ManagerState::Initializing);
        tracing::info!(
            chain_id = %chain_id,
            candidates = candidates.len(),
            "Selecting initial endpoint"
        );

        let prober = Prober::new(checker, Duration::from_millis(config.probe_timeout_ms));
        let selector = EndpointSelector::new(prober);
        let best = match selector.select_best(chain_id, &candidates).await {
            Ok(url) => url,
            Err(e) => {
                metrics::record_manager_state(chain_id, ManagerState::Stopped);
                return Err(e.into());
            }
        };
        transition(&state, ManagerState::Initializing, ManagerState::Ready);
        metrics::record_manager_state(chain_id, ManagerState::Ready);

        tracing::info!(chain_id = %chain_id, url = %best, "Initial endpoint selected");
        metrics::record_active_endpoint(chain_id, &best, None);

        let inner = Arc::new(Inner {
            active: ArcSwap::from_pointee(EndpointClient::connect(best, chain_id)),
            config,
            chain_id,
            candidates,
            selector,
            events: EventChannel::new(),
            rotation_lock: tokio::sync::Mutex::new(()),
            state,
        });

        let shutdown = Shutdown::new();
        let task = spawn_rotation_task(inner.clone(), shutdown.subscribe());

        Ok(Self {
            inner,
            shutdown,
            task: Mutex::new(Some(task)),
        })
    }

    /// Snapshot of the current endpoint client.
    ///
    /// The returned client stays valid after later rotations.
    pub fn active(&self) -> Arc<EndpointClient> {
        self.inner.active.load_full()
    }

    pub fn active_url(&self) -> Url {
        self.inner.active.load().url().clone()
    }

    pub fn chain_id(&self) -> ChainId {
        self.inner.chain_id
    }

    pub fn config(&self) -> &RotationConfig {
        &self.inner.config
    }

    pub fn candidates(&self) -> &[Url] {
        &self.inner.candidates
    }

    pub fn state(&self) -> ManagerState {
        ManagerState::from(self.inner.state.load(Ordering::SeqCst))
    }

    /// Register a handler for endpoint changes.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RotationEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.inner.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Re-run selection now. Waits for any round already in flight.
    pub async fn rotate(&self) -> RotationOutcome {
        self.inner.rotate().await
    }

    /// Stop the rotation timer. Idempotent.
    ///
    /// A round already in flight runs to completion; no round starts afterwards.
    pub fn stop(&self) {
        let previous = self.inner.state.swap(ManagerState::Stopped as u8, Ordering::SeqCst);
        if ManagerState::from(previous) != ManagerState::Stopped {
            self.shutdown.trigger();
            metrics::record_manager_state(self.inner.chain_id, ManagerState::Stopped);
            tracing::info!(chain_id = %self.inner.chain_id, "Rotation manager stopped");
        }
    }

    /// Stop and wait for the rotation task to exit.
    pub async fn stop_and_wait(&self) {
        self.stop();
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Rotation task ended abnormally");
            }
        }
    }
}

impl Drop for RotationManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RotationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationManager")
            .field("chain_id", &self.inner.chain_id.0)
            .field("active", &self.inner.active.load().url().as_str())
            .field("state", &self.state())
            .field("candidates", &self.inner.candidates.len())
            .finish()
    }
}

impl Inner {
    fn is_stopped(&self) -> bool {
        ManagerState::from(self.state.load(Ordering::SeqCst)) == ManagerState::Stopped
    }

    async fn rotate(&self) -> RotationOutcome {
        let _guard = self.rotation_lock.lock().await;
        if self.is_stopped() {
            return RotationOutcome::Stopped;
        }

        let current = self.active.load_full();
        let best = match self.selector.select_best(self.chain_id, &self.candidates).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    chain_id = %self.chain_id,
                    current = %current.url(),
                    error = %e,
                    "Rotation skipped, keeping current endpoint"
                );
                metrics::record_selection_failure(self.chain_id);
                return RotationOutcome::Skipped(e);
            }
        };

        if &best == current.url() {
            tracing::debug!(chain_id = %self.chain_id, url = %best, "Active endpoint still fastest");
            return RotationOutcome::Unchanged;
        }

        // stop() may have landed while the round was probing.
        if self.is_stopped() {
            tracing::debug!(chain_id = %self.chain_id, url = %best, "Manager stopped mid-round, discarding winner");
            return RotationOutcome::Stopped;
        }

        let next = Arc::new(EndpointClient::connect(best.clone(), self.chain_id));
        let previous = self.active.swap(next);

        tracing::info!(
            chain_id = %self.chain_id,
            from = %previous.url(),
            to = %best,
            "Rotated active endpoint"
        );
        metrics::record_rotation(self.chain_id);
        metrics::record_active_endpoint(self.chain_id, &best, Some(previous.url()));

        let from = previous.url().clone();
        let report = self.events.publish(&RotationEvent {
            chain_id: self.chain_id,
            new_url: best.clone(),
            previous,
        });
        if report.failed > 0 {
            tracing::warn!(
                failed = report.failed,
                delivered = report.delivered,
                "Some rotation subscribers failed"
            );
        }

        RotationOutcome::Rotated { from, to: best }
    }
}

fn spawn_rotation_task(inner: Arc<Inner>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
    let period = Duration::from_secs(inner.config.rotate_interval_mins.saturating_mul(60));

    tokio::spawn(async move {
        tracing::info!(
            chain_id = %inner.chain_id,
            interval_mins = inner.config.rotate_interval_mins,
            "Rotation task starting"
        );

        // The initial selection already ran, so the first tick is one period out.
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    inner.rotate().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!(chain_id = %inner.chain_id, "Rotation task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}

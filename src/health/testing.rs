//! Scripted liveness checker for deterministic tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::blockchain::types::ChainId;
use crate::health::liveness::{LivenessCheck, ProbeFailure};

/// What a scripted endpoint does when probed.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub delay: Duration,
    pub answer: Option<u64>,
}

impl Step {
    /// Answer `chain_id` after `delay_ms`.
    pub fn answer(delay_ms: u64, chain_id: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            answer: Some(chain_id),
        }
    }

    /// Fail with a transport error after `delay_ms`.
    pub fn fail(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            answer: None,
        }
    }
}

/// Endpoints answer from a mutable script; unknown URLs fail immediately.
#[derive(Debug, Default)]
pub struct ScriptedLiveness {
    script: Mutex<HashMap<Url, Step>>,
    calls: AtomicUsize,
}

impl ScriptedLiveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &Url, step: Step) {
        self.script.lock().unwrap().insert(url.clone(), step);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessCheck for ScriptedLiveness {
    async fn chain_id(&self, url: &Url) -> Result<ChainId, ProbeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().get(url).copied();
        let Some(step) = step else {
            return Err(ProbeFailure::Transport(format!("no script for {}", url)));
        };

        tokio::time::sleep(step.delay).await;
        step.answer
            .map(ChainId)
            .ok_or_else(|| ProbeFailure::Transport("connection refused".to_string()))
    }
}

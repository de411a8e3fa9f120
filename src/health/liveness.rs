//! Liveness check wire contract.
//!
//! # Responsibilities
//! - Ask an endpoint which chain it serves (`eth_chainId`)
//! - Decode hex (`"0x89"`) or decimal (`"137"`, `137`) answers
//! - Classify every way the exchange can go wrong

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::blockchain::types::ChainId;

/// Why a single probe failed. Never leaves the prober.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("endpoint serves chain {actual}, expected {expected}")]
    ChainMismatch { expected: ChainId, actual: ChainId },

    #[error("no answer within {0} ms")]
    Timeout(u64),
}

/// One request asking an endpoint for its chain ID.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    async fn chain_id(&self, url: &Url) -> Result<ChainId, ProbeFailure>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// `eth_chainId` over HTTP POST.
#[derive(Debug, Clone)]
pub struct JsonRpcLiveness {
    client: reqwest::Client,
}

impl JsonRpcLiveness {
    /// Build a checker. `request_timeout` bounds the HTTP exchange itself;
    /// the prober applies its own race on top.
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("rpc-rotator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessCheck for JsonRpcLiveness {
    async fn chain_id(&self, url: &Url) -> Result<ChainId, ProbeFailure> {
        let body = json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
        });

        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProbeFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeFailure::Transport(format!("HTTP {}", status)));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProbeFailure::Malformed(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ProbeFailure::Malformed(format!("RPC error {}", error)));
        }
        let result = parsed
            .result
            .ok_or_else(|| ProbeFailure::Malformed("missing result".to_string()))?;

        parse_chain_id(&result)
    }
}

/// Decode a chain ID as returned by `eth_chainId`.
pub fn parse_chain_id(value: &Value) -> Result<ChainId, ProbeFailure> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse::<u64>(),
            };
            parsed
                .map(ChainId)
                .map_err(|_| ProbeFailure::Malformed(format!("invalid chain ID '{}'", s)))
        }
        Value::Number(n) => n
            .as_u64()
            .map(ChainId)
            .ok_or_else(|| ProbeFailure::Malformed(format!("invalid chain ID {}", n))),
        other => Err(ProbeFailure::Malformed(format!("unexpected chain ID type: {}", other))),
    }
}

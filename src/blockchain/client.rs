//! Endpoint client: one JSON-RPC endpoint bound to an alloy provider.
//!
//! # Responsibilities
//! - Hold the URL and transport for a single endpoint
//! - Query chain ID and fee data with timeouts
//! - Serve as the immutable "active endpoint" handle swapped by rotation

use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::fees::{FeeData, FeeSource};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Default timeout for calls made through an endpoint client.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider bound to exactly one endpoint URL.
///
/// Never mutated after construction; rotation replaces the whole client.
#[derive(Clone)]
pub struct EndpointClient {
    url: Url,
    chain_id: ChainId,
    provider: Arc<dyn Provider + Send + Sync>,
    timeout_duration: Duration,
}

impl EndpointClient {
    /// Bind a new HTTP provider to `url`.
    ///
    /// Does no I/O; the provider connects lazily on first request.
    pub fn connect(url: Url, chain_id: ChainId) -> Self {
        let provider = ProviderBuilder::new().connect_http(url.clone());
        Self {
            url,
            chain_id,
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            timeout_duration: DEFAULT_RPC_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout_duration: Duration) -> Self {
        self.timeout_duration = timeout_duration;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Chain the endpoint was selected for.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.provider.as_ref()
    }

    /// Get the chain ID reported by the endpoint.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let id = self.call(self.provider.get_chain_id()).await?;
        Ok(ChainId(id))
    }

    /// Verify the endpoint still serves the chain it was selected for.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let actual = self.get_chain_id().await?;
        if actual != self.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.chain_id.0,
                actual: actual.0,
            });
        }
        Ok(())
    }

    async fn call<T, E, F>(&self, fut: F) -> BlockchainResult<T>
    where
        F: std::future::IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{}: {}", self.url, e))),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl FeeSource for EndpointClient {
    /// Query both fee representations; either may be absent.
    async fn fee_data(&self) -> BlockchainResult<FeeData> {
        let (legacy, eip1559) = tokio::join!(
            self.call(self.provider.get_gas_price()),
            self.call(self.provider.estimate_eip1559_fees()),
        );

        let mut data = FeeData::default();
        match legacy {
            Ok(price) => data.gas_price = Some(price),
            Err(e) => tracing::debug!(url = %self.url, error = %e, "Legacy gas price unavailable"),
        }
        match eip1559 {
            Ok(estimate) => {
                data.max_fee_per_gas = Some(estimate.max_fee_per_gas);
                data.max_priority_fee_per_gas = Some(estimate.max_priority_fee_per_gas);
            }
            Err(e) => tracing::debug!(url = %self.url, error = %e, "EIP-1559 fee estimate unavailable"),
        }

        if data.is_empty() {
            return Err(BlockchainError::NoFeeData(self.url.to_string()));
        }
        Ok(data)
    }
}

impl std::fmt::Debug for EndpointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointClient")
            .field("url", &self.url.as_str())
            .field("chain_id", &self.chain_id.0)
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}

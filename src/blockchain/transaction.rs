//! Transaction submission through the active endpoint.
//!
//! # Responsibilities
//! - Populate fee parameters right before submission
//! - Broadcast pre-signed transactions
//!
//! Nonce, recipient, value, data and signing belong to the caller.

use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::EndpointClient;
use crate::blockchain::fees::{fill_fees, AppliedFee};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Fill current fees on `tx` so it can be handed to an external signer.
pub async fn prepare_transaction(
    client: &EndpointClient,
    mut tx: TransactionRequest,
) -> BlockchainResult<(TransactionRequest, AppliedFee)> {
    let fee = fill_fees(client, &mut tx).await?;
    Ok((tx, fee))
}

/// Fill fees and submit through the node's `eth_sendTransaction`.
///
/// Requires the node to manage the sending account.
pub async fn send_with_fees(
    client: &EndpointClient,
    tx: TransactionRequest,
) -> BlockchainResult<TxHash> {
    let (tx, fee) = prepare_transaction(client, tx).await?;

    let pending = client
        .provider()
        .send_transaction(tx)
        .await
        .map_err(|e| BlockchainError::Rpc(format!("send_transaction via {}: {}", client.url(), e)))?;

    let tx_hash = *pending.tx_hash();
    tracing::info!(
        tx_hash = %tx_hash,
        url = %client.url(),
        fee = ?fee,
        "Transaction submitted"
    );
    Ok(tx_hash)
}

/// Broadcast an already-signed, RLP-encoded transaction.
pub async fn send_raw(client: &EndpointClient, raw: &[u8]) -> BlockchainResult<TxHash> {
    let pending = client
        .provider()
        .send_raw_transaction(raw)
        .await
        .map_err(|e| BlockchainError::Rpc(format!("send_raw_transaction via {}: {}", client.url(), e)))?;

    let tx_hash = *pending.tx_hash();
    tracing::info!(tx_hash = %tx_hash, url = %client.url(), "Raw transaction submitted");
    Ok(tx_hash)
}

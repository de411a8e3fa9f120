//! Fee-aware transaction preparation.
//!
//! # Responsibilities
//! - Fetch current fee parameters from an endpoint
//! - Pick exactly one fee representation: EIP-1559 pair first, legacy otherwise
//! - Populate it on a transaction without touching nonce, recipient, value or data

use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Fee parameters reported by an endpoint. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// Legacy-only fee data.
    pub fn legacy(gas_price: u128) -> Self {
        Self {
            gas_price: Some(gas_price),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gas_price.is_none() && self.max_fee_per_gas.is_none() && self.max_priority_fee_per_gas.is_none()
    }

    /// The representation a transaction should carry, if any.
    pub fn preferred(&self) -> Option<AppliedFee> {
        match (self.max_fee_per_gas, self.max_priority_fee_per_gas, self.gas_price) {
            (Some(max_fee_per_gas), Some(max_priority_fee_per_gas), _) => Some(AppliedFee::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }),
            (_, _, Some(gas_price)) => Some(AppliedFee::Legacy { gas_price }),
            _ => None,
        }
    }
}

/// The fee representation written onto a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedFee {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

/// Anything that can report current network fee parameters.
#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn fee_data(&self) -> BlockchainResult<FeeData>;
}

/// Write `fee` onto `tx`, clearing the other representation.
pub fn apply_fee(tx: &mut TransactionRequest, fee: AppliedFee) {
    match fee {
        AppliedFee::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            tx.gas_price = None;
            tx.max_fee_per_gas = Some(max_fee_per_gas);
            tx.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        }
        AppliedFee::Legacy { gas_price } => {
            tx.max_fee_per_gas = None;
            tx.max_priority_fee_per_gas = None;
            tx.gas_price = Some(gas_price);
        }
    }
}

/// Query `source` and populate the preferred fee representation on `tx`.
pub async fn fill_fees<S>(source: &S, tx: &mut TransactionRequest) -> BlockchainResult<AppliedFee>
where
    S: FeeSource + ?Sized,
{
    let data = source.fee_data().await?;
    let fee = data
        .preferred()
        .ok_or_else(|| BlockchainError::NoFeeData("fee source".to_string()))?;

    apply_fee(tx, fee);
    tracing::debug!(fee = ?fee, "Applied fee parameters to transaction");
    Ok(fee)
}

//! # Mock Bridge
//!
//! In-memory asset bridge implementing the `AssetBridge` port. Tracks
//! custody per asset so tests can assert where deposited assets sit while an
//! instruction is in flight or failed.

use crate::ports::outbound::{AssetBridge, BridgeError, BridgeReceipt};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, Amount, DomainId};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// In-memory bridge adapter for testing.
#[derive(Default)]
pub struct MockBridge {
    custody: RwLock<HashMap<Address, Amount>>,
    should_fail: RwLock<bool>,
}

impl MockBridge {
    /// Create an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets of one kind currently in custody.
    pub fn custody_of(&self, asset: &Address) -> Amount {
        self.custody.read().get(asset).copied().unwrap_or(0)
    }

    /// Make every transfer fail.
    pub fn set_fail(&self, fail: bool) {
        *self.should_fail.write() = fail;
    }
}

#[async_trait]
impl AssetBridge for MockBridge {
    async fn move_assets(
        &self,
        asset: Address,
        from: Address,
        dest_domain: DomainId,
        amount: Amount,
    ) -> Result<BridgeReceipt, BridgeError> {
        if *self.should_fail.read() {
            return Err(BridgeError::Unavailable("bridge offline".to_string()));
        }
        *self.custody.write().entry(asset).or_insert(0) += amount;
        let receipt = BridgeReceipt {
            id: Uuid::new_v4(),
            asset,
            amount,
        };
        debug!(
            "[sv-03] bridge took {} units of {} from {} bound for domain {}",
            amount,
            hex::encode(asset),
            hex::encode(from),
            dest_domain
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: Address = [0xC0; 20];

    #[tokio::test]
    async fn test_custody_accumulates() {
        let bridge = MockBridge::new();
        bridge.move_assets(USDC, [1; 20], 2, 300).await.unwrap();
        bridge.move_assets(USDC, [1; 20], 2, 200).await.unwrap();
        assert_eq!(bridge.custody_of(&USDC), 500);
    }

    #[tokio::test]
    async fn test_failure_switch() {
        let bridge = MockBridge::new();
        bridge.set_fail(true);
        let result = bridge.move_assets(USDC, [1; 20], 2, 300).await;
        assert!(matches!(result, Err(BridgeError::Unavailable(_))));
        assert_eq!(bridge.custody_of(&USDC), 0);
    }

    #[tokio::test]
    async fn test_receipt_carries_transfer() {
        let bridge = MockBridge::new();
        let receipt = bridge.move_assets(USDC, [1; 20], 2, 300).await.unwrap();
        assert_eq!(receipt.asset, USDC);
        assert_eq!(receipt.amount, 300);
    }
}

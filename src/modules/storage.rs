//! Storage slot scan
//!
//! Reads slots 0, 1, 2, ... until the first all-zero slot. This only lists the
//! leading value slots of a contract; mappings and dynamic arrays live at
//! hashed slots and are not found.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use anyhow::{Context, Result};

use crate::infrastructure::ethereum::EthereumProvider;

use super::watch::WatchHandle;

pub const DEFAULT_SCAN_LIMIT: u64 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    pub index: u64,
    pub value: B256,
}

/// Scan sequential slots starting at 0, stopping at the first zero slot or
/// after `limit` slots
pub async fn scan_storage(
    provider: &dyn EthereumProvider,
    address: Address,
    limit: u64,
) -> Result<Vec<StorageSlot>> {
    let mut slots = Vec::new();
    for index in 0..limit {
        let value = provider
            .get_storage_at(address, U256::from(index))
            .await
            .with_context(|| format!("read slot {index} of {address}"))?;
        if value.is_zero() {
            break;
        }
        slots.push(StorageSlot { index, value });
    }
    tracing::debug!(%address, slots = slots.len(), "storage scan finished");
    Ok(slots)
}

/// Run a scan in the background; nothing is reported once the handle is dropped
pub fn spawn_scan(
    provider: Arc<dyn EthereumProvider>,
    address: Address,
    limit: u64,
    on_done: impl FnOnce(Result<Vec<StorageSlot>>) + Send + 'static,
) -> WatchHandle {
    WatchHandle::spawn(move |scope| async move {
        let result = scan_storage(provider.as_ref(), address, limit).await;
        scope.emit(|| on_done(result));
    })
}

//! In-memory provider for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{anyhow, Result};

use super::provider::EthereumProvider;
use super::types::{BlockSummary, LogEntry, ReceiptSummary, TxSummary};

#[derive(Default)]
pub struct MockState {
    pub block_number: u64,
    pub chain_id: u64,
    pub accounts: Vec<Address>,
    pub balances: HashMap<Address, U256>,
    pub code: HashMap<Address, Bytes>,
    pub storage: HashMap<(Address, U256), B256>,
    pub logs: Vec<LogEntry>,
    pub transactions: HashMap<B256, TxSummary>,
    pub blocks: HashMap<u64, BlockSummary>,
    pub receipts: HashMap<B256, ReceiptSummary>,
    pub call_result: Option<Bytes>,
    pub sent: Vec<TransactionRequest>,
    /// Error returned by `send_transaction`
    pub send_error: Option<String>,
    /// Every call fails with this message when set
    pub offline: Option<String>,
}

#[derive(Default)]
pub struct MockProvider {
    pub state: Mutex<MockState>,
    pub log_fetches: AtomicUsize,
}

impl MockProvider {
    pub fn new(chain_id: u64) -> Self {
        let provider = Self::default();
        provider.with(|s| s.chain_id = chain_id);
        provider
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn log_fetches(&self) -> usize {
        self.log_fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match &self.state.lock().unwrap().offline {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl EthereumProvider for MockProvider {
    async fn block_number(&self) -> Result<u64> {
        self.check()?;
        Ok(self.with(|s| s.block_number))
    }

    async fn chain_id(&self) -> Result<u64> {
        self.check()?;
        Ok(self.with(|s| s.chain_id))
    }

    async fn client_version(&self) -> Result<String> {
        self.check()?;
        Ok("anvil/v0.2.0".to_string())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.check()?;
        Ok(self.with(|s| s.accounts.clone()))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.check()?;
        Ok(self.with(|s| s.balances.get(&address).copied().unwrap_or_default()))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.check()?;
        Ok(self.with(|s| s.code.get(&address).cloned().unwrap_or_default()))
    }

    async fn get_storage_at(&self, address: Address, slot: U256) -> Result<B256> {
        self.check()?;
        Ok(self.with(|s| s.storage.get(&(address, slot)).copied().unwrap_or_default()))
    }

    async fn get_logs(&self, address: Address, from: u64, to: u64) -> Result<Vec<LogEntry>> {
        self.log_fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.with(|s| {
            s.logs
                .iter()
                .filter(|log| log.address == address)
                .filter(|log| log.block_number.is_some_and(|n| n >= from && n <= to))
                .cloned()
                .collect()
        }))
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<TxSummary>> {
        self.check()?;
        Ok(self.with(|s| s.transactions.get(&hash).cloned()))
    }

    async fn get_block(&self, number: u64) -> Result<Option<BlockSummary>> {
        self.check()?;
        Ok(self.with(|s| s.blocks.get(&number).cloned()))
    }

    async fn call(&self, _request: TransactionRequest) -> Result<Bytes> {
        self.check()?;
        self.with(|s| s.call_result.clone())
            .ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256> {
        self.check()?;
        self.with(|s| {
            if let Some(message) = &s.send_error {
                return Err(anyhow!(message.clone()));
            }
            s.sent.push(request.clone());
            s.block_number += 1;
            let hash = B256::with_last_byte(s.sent.len() as u8);
            let receipt = ReceiptSummary {
                transaction_hash: hash,
                block_number: Some(s.block_number),
                status: true,
                gas_used: 21000,
                from: request.from.unwrap_or_default(),
                to: request.to.and_then(|to| to.to().copied()),
                contract_address: None,
            };
            s.receipts.insert(hash, receipt);
            Ok(hash)
        })
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>> {
        self.check()?;
        Ok(self.with(|s| s.receipts.get(&hash).cloned()))
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}

/// A log at `block` from `address`
pub fn log_at(address: Address, block: u64, index: u64) -> LogEntry {
    LogEntry {
        address,
        block_number: Some(block),
        transaction_hash: Some(B256::with_last_byte(block as u8)),
        log_index: Some(index),
        topics: Vec::new(),
        data: Bytes::new(),
    }
}

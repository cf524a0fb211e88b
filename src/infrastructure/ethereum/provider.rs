//! Ethereum provider abstraction and Alloy implementations
//!
//! Transactions are looked up with raw JSON requests so that nodes returning
//! non-standard transaction types still parse.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{Filter, TransactionRequest};
use anyhow::{bail, Context, Result};

use super::types::{
    parse_raw_block, parse_raw_transaction, BlockSummary, LogEntry, ReceiptSummary, TxSummary,
};

/// How often `wait_for_receipt` asks the node for a receipt
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Abstract Ethereum provider trait
///
/// Everything the scaffold needs from a node, independent of the transport.
/// Signing is left to the node: writes go through `eth_sendTransaction` from
/// one of its unlocked accounts.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync + 'static {
    /// Get the current block number
    async fn block_number(&self) -> Result<u64>;

    async fn chain_id(&self) -> Result<u64>;

    /// Get client version (for node detection)
    async fn client_version(&self) -> Result<String>;

    /// Get available accounts (unlocked dev accounts)
    async fn accounts(&self) -> Result<Vec<Address>>;

    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Deployed bytecode, empty for externally owned accounts
    async fn get_code(&self, address: Address) -> Result<Bytes>;

    async fn get_storage_at(&self, address: Address, slot: U256) -> Result<B256>;

    /// Logs emitted by `address` in the inclusive block range
    async fn get_logs(&self, address: Address, from: u64, to: u64) -> Result<Vec<LogEntry>>;

    async fn get_transaction(&self, hash: B256) -> Result<Option<TxSummary>>;

    /// Block with full transactions, `None` past the head
    async fn get_block(&self, number: u64) -> Result<Option<BlockSummary>>;

    /// Execute a call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Submit a transaction for the node to sign, returning its hash
    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256>;

    async fn get_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;

    /// Poll for a receipt until it appears or `timeout` elapses
    async fn wait_for_receipt(&self, hash: B256, timeout: Duration) -> Result<ReceiptSummary> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.get_receipt(hash).await? {
                return Ok(receipt);
            }
            if started.elapsed() >= timeout {
                bail!("Timed out waiting for receipt of {hash}");
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

// All transports share the same filler stack
type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores concrete types for each transport
pub enum AlloyProvider {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            Ok(Box::new(AlloyProvider::Ipc {
                provider,
                endpoint: path.display().to_string(),
            }))
        }
    }
}

impl AlloyProvider {
    fn inner(&self) -> &FilledProvider {
        match self {
            AlloyProvider::Http { provider, .. } => provider,
            AlloyProvider::WebSocket { provider, .. } => provider,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider,
        }
    }
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.inner().get_block_number().await?)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.inner().get_chain_id().await?)
    }

    async fn client_version(&self) -> Result<String> {
        Ok(self.inner().get_client_version().await?)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.inner().get_accounts().await?)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.inner().get_balance(address).await?)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.inner().get_code_at(address).await?)
    }

    async fn get_storage_at(&self, address: Address, slot: U256) -> Result<B256> {
        let value = self.inner().get_storage_at(address, slot).await?;
        Ok(B256::from(value))
    }

    async fn get_logs(&self, address: Address, from: u64, to: u64) -> Result<Vec<LogEntry>> {
        let filter = Filter::new().address(address).from_block(from).to_block(to);
        let logs = self.inner().get_logs(&filter).await?;
        Ok(logs.iter().map(LogEntry::from).collect())
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<TxSummary>> {
        let json: serde_json::Value = self
            .inner()
            .raw_request("eth_getTransactionByHash".into(), (hash,))
            .await?;
        if json.is_null() {
            return Ok(None);
        }
        Ok(parse_raw_transaction(&json))
    }

    async fn get_block(&self, number: u64) -> Result<Option<BlockSummary>> {
        // Raw JSON so chains with non-standard transaction types still parse
        let json: serde_json::Value = self
            .inner()
            .raw_request(
                "eth_getBlockByNumber".into(),
                (format!("0x{:x}", number), true),
            )
            .await?;
        if json.is_null() {
            return Ok(None);
        }
        parse_raw_block(&json).map(Some)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        Ok(self.inner().call(request).await?)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256> {
        let pending = self.inner().send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>> {
        let receipt = self.inner().get_transaction_receipt(hash).await?;
        Ok(receipt.as_ref().map(ReceiptSummary::from))
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}

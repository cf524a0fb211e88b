//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI never awaits. It sends `RuntimeCommand`s to a worker thread that
//! owns a Tokio runtime, and drains `RuntimeEvent`s once per frame.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use tokio::runtime::Runtime;

use crate::domain::abi::{ContractCodeStatus, DeployedContract};
use crate::domain::display::CallValue;
use crate::infrastructure::ethereum::{LogEntry, ProviderConfig};
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::modules::blocks::TransactionsPage;
use crate::modules::logs::WatchConfig;
use crate::modules::search::SearchOutcome;
use crate::modules::storage::StorageSlot;
use crate::modules::transactor::TxPhase;

/// Worker settings taken from the configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
    pub log_limit: usize,
    pub storage_scan_limit: u64,
    pub faucet_account_index: usize,
}

impl WorkerConfig {
    pub fn watch(&self) -> WatchConfig {
        WatchConfig {
            limit: self.log_limit,
            poll_interval: self.poll_interval,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            receipt_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            log_limit: crate::modules::logs::DEFAULT_LOG_LIMIT,
            storage_scan_limit: crate::modules::storage::DEFAULT_SCAN_LIMIT,
            faucet_account_index: 0,
        }
    }
}

/// Who started a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOrigin {
    /// A write form, by function id
    Function(String),
    Faucet,
}

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Switch to a different endpoint
    SwitchEndpoint { index: usize },
    /// Reconnect if disconnected
    Refresh,
    /// Look up code at each contract address
    CheckDeployments { contracts: Vec<DeployedContract> },
    /// eth_call a view function with prepared calldata
    ReadCall {
        function_id: String,
        function: Function,
        to: Address,
        calldata: Bytes,
    },
    /// Submit a write through the transactor
    WriteCall {
        function_id: String,
        request: TransactionRequest,
    },
    /// Open the address view: balance, code, storage and a log watch
    OpenAddress { watch_id: u64, address: Address },
    /// Tear down the address view's background work
    CloseAddress,
    Search { query: String },
    /// Load one page of recent transactions
    FetchTransactions { page: u64 },
    Faucet { to: String, amount: String },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Successfully connected to a node
    Connected {
        endpoint: String,
        chain_id: u64,
        node_kind: String,
        accounts: Vec<Address>,
    },
    /// The node cannot be reached; shown as a persistent banner
    NetworkUnavailable { message: String },
    /// Latest block number
    NewHead { number: u64 },
    DeploymentChecked {
        statuses: Vec<(String, ContractCodeStatus)>,
    },
    /// Outcome of a read; errors are already normalized
    CallResult {
        function_id: String,
        outcome: Result<(Vec<DynSolValue>, CallValue), String>,
    },
    TxUpdate { origin: TxOrigin, phase: TxPhase },
    BalanceReady { watch_id: u64, balance: U256 },
    CodeReady { watch_id: u64, code: Bytes },
    StorageReady {
        watch_id: u64,
        outcome: Result<Vec<StorageSlot>, String>,
    },
    LogsUpdated { watch_id: u64, logs: Vec<LogEntry> },
    SearchResolved { outcome: SearchOutcome },
    TransactionsLoaded {
        page: u64,
        outcome: Result<TransactionsPage, String>,
    },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Create a new runtime bridge with the given endpoint configurations
    pub fn new(endpoints: Vec<ProviderConfig>, config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let runtime = Runtime::new()?;
        thread::Builder::new()
            .name("scaffold-rpc".into())
            .spawn(move || {
                runtime.block_on(async {
                    if let Err(err) = run_async_worker(endpoints, config, cmd_rx, evt_tx.clone()).await {
                        tracing::error!("worker exited: {err:#}");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

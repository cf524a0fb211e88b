//! Async worker - runs in Tokio runtime and handles RPC operations

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

use crate::domain::error::{error_message, ScaffoldError};
use crate::infrastructure::contracts::check_all;
use crate::infrastructure::ethereum::{create_provider, EthereumProvider, ProviderConfig};
use crate::infrastructure::runtime::bridge::{
    RuntimeCommand, RuntimeEvent, TxOrigin, WorkerConfig,
};
use crate::modules::blocks::fetch_page;
use crate::modules::calls::call_prepared;
use crate::modules::faucet::{faucet_account, faucet_request, NO_LOCAL_PROVIDER};
use crate::modules::logs::watch_logs;
use crate::modules::search::search;
use crate::modules::storage::spawn_scan;
use crate::modules::transactor::{Transactor, TxPhase};
use crate::modules::watch::WatchHandle;

/// Background work owned by the open address view. Dropping it stops both
/// tasks.
struct AddressWatch {
    _logs: WatchHandle,
    _storage: WatchHandle,
}

/// Run the async worker loop
pub async fn run_async_worker(
    endpoints: Vec<ProviderConfig>,
    config: WorkerConfig,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    if endpoints.is_empty() {
        anyhow::bail!("No endpoints configured");
    }

    let mut endpoint_index = 0usize;
    let mut provider: Option<Arc<dyn EthereumProvider>> = None;
    // Connection attempts happen at startup and on explicit refresh only
    let mut connect_pending = true;
    let mut last_head: Option<u64> = None;
    let mut last_head_check = Instant::now() - config.poll_interval;
    let mut address_watch: Option<AddressWatch> = None;

    loop {
        if provider.is_none() && connect_pending {
            let endpoint = endpoints[endpoint_index].clone();
            match connect_to_endpoint(endpoint.clone(), &evt_tx).await {
                Ok(p) => {
                    provider = Some(p);
                    last_head = None;
                }
                Err(err) => {
                    tracing::warn!(endpoint = %endpoint.display(), "connection failed: {err:#}");
                    let _ = evt_tx.send(RuntimeEvent::NetworkUnavailable {
                        message: format!("{} ({})", ScaffoldError::NetworkUnavailable, endpoint.display()),
                    });
                    connect_pending = false;

                    // The next refresh tries the next endpoint
                    if endpoints.len() > 1 {
                        endpoint_index = (endpoint_index + 1) % endpoints.len();
                    }
                }
            }
        }

        // Process commands (non-blocking)
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::SwitchEndpoint { index } => {
                    if index >= endpoints.len() {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!(
                                "Invalid endpoint index {} ({} total)",
                                index,
                                endpoints.len()
                            ),
                        });
                        continue;
                    }
                    endpoint_index = index;
                    provider = None;
                    address_watch = None;
                    connect_pending = true;
                }

                RuntimeCommand::Refresh => {
                    if provider.is_none() {
                        connect_pending = true;
                    }
                    last_head = None;
                }

                RuntimeCommand::CloseAddress => {
                    address_watch = None;
                }

                cmd => match provider {
                    Some(ref p) => {
                        dispatch(p.clone(), cmd, &config, &evt_tx, &mut address_watch);
                    }
                    None => {
                        let _ = evt_tx.send(RuntimeEvent::NetworkUnavailable {
                            message: ScaffoldError::NetworkUnavailable.to_string(),
                        });
                    }
                },
            }
        }

        if let Some(p) = provider.clone() {
            if last_head_check.elapsed() >= config.poll_interval {
                last_head_check = Instant::now();
                match p.block_number().await {
                    Ok(number) => {
                        if last_head != Some(number) {
                            last_head = Some(number);
                            let _ = evt_tx.send(RuntimeEvent::NewHead { number });
                        }
                    }
                    Err(err) => {
                        tracing::warn!("lost connection: {err:#}");
                        provider = None;
                        address_watch = None;
                        connect_pending = false;
                        let _ = evt_tx.send(RuntimeEvent::NetworkUnavailable {
                            message: error_message(&err),
                        });
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Start the work for one provider-bound command. Everything slow runs on
/// its own task so the loop keeps draining commands.
fn dispatch(
    provider: Arc<dyn EthereumProvider>,
    cmd: RuntimeCommand,
    config: &WorkerConfig,
    evt_tx: &Sender<RuntimeEvent>,
    address_watch: &mut Option<AddressWatch>,
) {
    let evt_tx = evt_tx.clone();
    match cmd {
        RuntimeCommand::CheckDeployments { contracts } => {
            tokio::spawn(async move {
                let statuses = check_all(provider.as_ref(), &contracts).await;
                let _ = evt_tx.send(RuntimeEvent::DeploymentChecked { statuses });
            });
        }

        RuntimeCommand::ReadCall {
            function_id,
            function,
            to,
            calldata,
        } => {
            tokio::spawn(async move {
                let outcome = call_prepared(provider.as_ref(), to, &function, calldata)
                    .await
                    .map_err(|err| {
                        tracing::debug!(function = %function_id, "read failed: {err:#}");
                        error_message(&err)
                    });
                let _ = evt_tx.send(RuntimeEvent::CallResult {
                    function_id,
                    outcome,
                });
            });
        }

        RuntimeCommand::WriteCall {
            function_id,
            request,
        } => {
            let timeout = config.receipt_timeout;
            tokio::spawn(async move {
                submit_tx(provider, timeout, TxOrigin::Function(function_id), request, &evt_tx)
                    .await;
            });
        }

        RuntimeCommand::OpenAddress { watch_id, address } => {
            // Stop the previous view's tasks before starting new ones
            *address_watch = None;

            let details_tx = evt_tx.clone();
            let details_provider = provider.clone();
            tokio::spawn(async move {
                match details_provider.get_balance(address).await {
                    Ok(balance) => {
                        let _ = details_tx.send(RuntimeEvent::BalanceReady { watch_id, balance });
                    }
                    Err(err) => {
                        let _ = details_tx.send(RuntimeEvent::Error {
                            message: format!("Balance fetch failed: {}", error_message(&err)),
                        });
                    }
                }
                match details_provider.get_code(address).await {
                    Ok(code) => {
                        let _ = details_tx.send(RuntimeEvent::CodeReady { watch_id, code });
                    }
                    Err(err) => {
                        let _ = details_tx.send(RuntimeEvent::Error {
                            message: format!("Code fetch failed: {}", error_message(&err)),
                        });
                    }
                }
            });

            let logs_tx = evt_tx.clone();
            let logs = watch_logs(provider.clone(), address, config.watch(), move |logs| {
                let _ = logs_tx.send(RuntimeEvent::LogsUpdated { watch_id, logs });
            });
            let storage = spawn_scan(provider, address, config.storage_scan_limit, move |result| {
                let _ = evt_tx.send(RuntimeEvent::StorageReady {
                    watch_id,
                    outcome: result.map_err(|err| error_message(&err)),
                });
            });
            *address_watch = Some(AddressWatch {
                _logs: logs,
                _storage: storage,
            });
        }

        RuntimeCommand::Search { query } => {
            tokio::spawn(async move {
                let outcome = search(provider.as_ref(), &query).await;
                let _ = evt_tx.send(RuntimeEvent::SearchResolved { outcome });
            });
        }

        RuntimeCommand::FetchTransactions { page } => {
            tokio::spawn(async move {
                let outcome = fetch_page(provider.as_ref(), page).await.map_err(|err| {
                    tracing::warn!(page, "transactions fetch failed: {err:#}");
                    error_message(&err)
                });
                let _ = evt_tx.send(RuntimeEvent::TransactionsLoaded { page, outcome });
            });
        }

        RuntimeCommand::Faucet { to, amount } => {
            let timeout = config.receipt_timeout;
            let index = config.faucet_account_index;
            tokio::spawn(async move {
                let from = match faucet_account(provider.as_ref(), index).await {
                    Ok(from) => from,
                    Err(ScaffoldError::NetworkUnavailable) => {
                        let _ = evt_tx.send(RuntimeEvent::NetworkUnavailable {
                            message: NO_LOCAL_PROVIDER.to_string(),
                        });
                        return;
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::TxUpdate {
                            origin: TxOrigin::Faucet,
                            phase: TxPhase::Failed(err.to_string()),
                        });
                        return;
                    }
                };
                match faucet_request(from, &to, &amount) {
                    Ok(request) => {
                        submit_tx(provider, timeout, TxOrigin::Faucet, request, &evt_tx).await;
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::TxUpdate {
                            origin: TxOrigin::Faucet,
                            phase: TxPhase::Failed(err.to_string()),
                        });
                    }
                }
            });
        }

        RuntimeCommand::Shutdown
        | RuntimeCommand::SwitchEndpoint { .. }
        | RuntimeCommand::Refresh
        | RuntimeCommand::CloseAddress => {}
    }
}

async fn submit_tx(
    provider: Arc<dyn EthereumProvider>,
    timeout: Duration,
    origin: TxOrigin,
    request: TransactionRequest,
    evt_tx: &Sender<RuntimeEvent>,
) {
    Transactor::new(provider, timeout)
        .submit(request, |phase| {
            let _ = evt_tx.send(RuntimeEvent::TxUpdate {
                origin: origin.clone(),
                phase: phase.clone(),
            });
        })
        .await;
}

/// Connect to an endpoint and announce it
async fn connect_to_endpoint(
    config: ProviderConfig,
    evt_tx: &Sender<RuntimeEvent>,
) -> Result<Arc<dyn EthereumProvider>> {
    let provider: Arc<dyn EthereumProvider> = Arc::from(create_provider(config).await?);

    // Get node info
    let client_version = provider
        .client_version()
        .await
        .context("Failed to get client version")?;
    let chain_id = provider.chain_id().await.context("Failed to get chain id")?;
    let node_kind = detect_node_kind(&client_version);
    let accounts = provider.accounts().await.unwrap_or_default();

    tracing::info!(
        endpoint = %provider.endpoint_name(),
        chain_id,
        node = %node_kind,
        accounts = accounts.len(),
        "connected"
    );
    let _ = evt_tx.send(RuntimeEvent::Connected {
        endpoint: provider.endpoint_name(),
        chain_id,
        node_kind,
        accounts,
    });

    Ok(provider)
}

/// Detect node kind from client version string
fn detect_node_kind(version: &str) -> String {
    let lower = version.to_lowercase();
    if lower.contains("anvil") {
        "anvil".to_string()
    } else if lower.contains("hardhat") {
        "hardhat".to_string()
    } else if lower.contains("reth") {
        "reth".to_string()
    } else if lower.contains("geth") || lower.contains("go-ethereum") {
        "geth".to_string()
    } else {
        version.to_string()
    }
}

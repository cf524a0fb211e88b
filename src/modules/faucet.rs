//! Local-chain faucet

use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;

use crate::core::AppContext;
use crate::domain::error::ScaffoldError;
use crate::infrastructure::ethereum::EthereumProvider;

use super::ether::ether_to_wei;

/// Banner shown when the node's accounts cannot be listed
pub const NO_LOCAL_PROVIDER: &str = "Cannot connect to local provider";

/// The faucet only runs against the local development chain
pub fn is_available(ctx: &AppContext) -> bool {
    ctx.is_local_chain()
}

/// Account at `index` among the node's unlocked accounts
pub async fn faucet_account(
    provider: &dyn EthereumProvider,
    index: usize,
) -> Result<Address, ScaffoldError> {
    let accounts = provider.accounts().await.map_err(|err| {
        tracing::warn!("listing accounts failed: {err:#}");
        ScaffoldError::NetworkUnavailable
    })?;
    accounts.get(index).copied().ok_or_else(|| {
        ScaffoldError::Config(format!(
            "faucet account index {index} out of range ({} accounts)",
            accounts.len()
        ))
    })
}

/// Transfer of `amount` ether from the faucet account to `to`
pub fn faucet_request(
    from: Address,
    to: &str,
    amount: &str,
) -> Result<TransactionRequest, ScaffoldError> {
    let to: Address = to.trim().parse().map_err(|_| ScaffoldError::Validation {
        field: "destination".to_string(),
        reason: format!("'{}' is not an address", to.trim()),
    })?;
    let value = ether_to_wei(amount).map_err(|e| ScaffoldError::Validation {
        field: "amount".to_string(),
        reason: format!("{e:#}"),
    })?;
    Ok(TransactionRequest::default().from(from).to(to).value(value))
}

//! Contracts file loading and deployment checks

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use futures::future::join_all;

use crate::domain::abi::{parse_contracts_file, ContractCodeStatus, DeployedContract};
use crate::infrastructure::ethereum::EthereumProvider;

/// Read the contracts deployed on `chain_id` from a contracts file
pub fn load_contracts(path: &Path, chain_id: u64) -> Result<Vec<DeployedContract>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("read contracts file {}", path.display()))?;
    let contracts = parse_contracts_file(&json, chain_id)?;
    tracing::info!(path = %path.display(), chain_id, count = contracts.len(), "contracts loaded");
    Ok(contracts)
}

/// Whether code exists at the contract's address. RPC failures count as not
/// found.
pub async fn check_deployment(
    provider: &dyn EthereumProvider,
    contract: &DeployedContract,
) -> ContractCodeStatus {
    match provider.get_code(contract.address).await {
        Ok(code) => ContractCodeStatus::from_code(&code),
        Err(err) => {
            tracing::warn!(contract = %contract.name, address = %contract.address, "code lookup failed: {err:#}");
            ContractCodeStatus::NotFound
        }
    }
}

/// Check every contract concurrently, keeping the input order
pub async fn check_all(
    provider: &dyn EthereumProvider,
    contracts: &[DeployedContract],
) -> Vec<(String, ContractCodeStatus)> {
    let checks = contracts.iter().map(|contract| async move {
        (contract.name.clone(), check_deployment(provider, contract).await)
    });
    join_all(checks).await
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alloy::primitives::{Address, Bytes};
    use alloy_json_abi::JsonAbi;

    use super::*;
    use crate::infrastructure::ethereum::mock::MockProvider;

    fn contract(name: &str, byte: u8) -> DeployedContract {
        DeployedContract {
            name: name.to_string(),
            address: Address::with_last_byte(byte),
            abi: JsonAbi::new(),
        }
    }

    #[tokio::test]
    async fn test_check_all() {
        let provider = MockProvider::new(31337);
        provider.with(|s| {
            s.code
                .insert(Address::with_last_byte(1), Bytes::from(vec![0x60, 0x80]))
        });
        let statuses = check_all(&provider, &[contract("A", 1), contract("B", 2)]).await;
        assert_eq!(
            statuses,
            vec![
                ("A".to_string(), ContractCodeStatus::Deployed),
                ("B".to_string(), ContractCodeStatus::NotFound),
            ]
        );
    }

    #[tokio::test]
    async fn test_rpc_failure_is_not_found() {
        let provider = MockProvider::new(31337);
        provider.with(|s| s.offline = Some("down".into()));
        assert_eq!(
            check_deployment(&provider, &contract("A", 1)).await,
            ContractCodeStatus::NotFound
        );
    }

    #[test]
    fn test_load_contracts_from_file() {
        let path = std::env::temp_dir().join(format!("scaffold-contracts-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"31337":[{{"contracts":{{"Greeter":{{"address":"0x5FbDB2315678afecb367f032d93F642f64180aa3","abi":[]}}}}}}]}}"#
        )
        .unwrap();

        let contracts = load_contracts(&path, 31337).unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].name, "Greeter");
        fs::remove_file(&path).unwrap();

        assert!(load_contracts(&path, 31337).is_err());
    }
}

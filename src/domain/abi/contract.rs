//! Deployed contracts and the contracts file

use std::collections::BTreeMap;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::error::ScaffoldError;

use super::function::ContractFunctions;

/// A contract the debug view can talk to
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub abi: JsonAbi,
}

impl DeployedContract {
    pub fn functions(&self) -> ContractFunctions {
        ContractFunctions::partition(&self.abi)
    }
}

/// Whether bytecode exists at the contract's address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractCodeStatus {
    Loading,
    Deployed,
    NotFound,
}

impl ContractCodeStatus {
    pub fn from_code(code: &[u8]) -> Self {
        if code.is_empty() {
            ContractCodeStatus::NotFound
        } else {
            ContractCodeStatus::Deployed
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContractEntry {
    address: Address,
    abi: JsonAbi,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    #[serde(default)]
    contracts: BTreeMap<String, ContractEntry>,
}

/// Contracts deployed on `chain_id`, sorted by name.
///
/// Accepts the hardhat-deploy export (`{chainId: [{contracts: {..}}]}`) and a
/// flat `{chainId: {Name: {address, abi}}}` map. A chain missing from the file
/// yields no contracts.
pub fn parse_contracts_file(
    json: &str,
    chain_id: u64,
) -> Result<Vec<DeployedContract>, ScaffoldError> {
    let root: BTreeMap<String, Value> = serde_json::from_str(json)
        .map_err(|e| ScaffoldError::Config(format!("contracts file: {e}")))?;

    let Some(chain) = root.get(&chain_id.to_string()) else {
        return Ok(Vec::new());
    };

    let entries: BTreeMap<String, ContractEntry> = match chain {
        Value::Array(deployments) => {
            let first = deployments.first().cloned().unwrap_or(Value::Null);
            if first.is_null() {
                BTreeMap::new()
            } else {
                serde_json::from_value::<Deployment>(first)
                    .map_err(|e| ScaffoldError::Config(format!("chain {chain_id}: {e}")))?
                    .contracts
            }
        }
        Value::Object(_) => serde_json::from_value(chain.clone())
            .map_err(|e| ScaffoldError::Config(format!("chain {chain_id}: {e}")))?,
        _ => {
            return Err(ScaffoldError::Config(format!(
                "chain {chain_id}: expected an array or object"
            )))
        }
    };

    Ok(entries
        .into_iter()
        .map(|(name, entry)| DeployedContract {
            name,
            address: entry.address,
            abi: entry.abi,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[{"type":"function","name":"greeting","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"}]"#;

    #[test]
    fn test_hardhat_export_format() {
        let json = format!(
            r#"{{"31337":[{{"chainId":"31337","name":"localhost","contracts":{{
                "YourContract":{{"address":"0x5FbDB2315678afecb367f032d93F642f64180aa3","abi":{ABI}}},
                "Another":{{"address":"0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512","abi":[]}}
            }}}}]}}"#
        );
        let contracts = parse_contracts_file(&json, 31337).unwrap();
        let names: Vec<_> = contracts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Another", "YourContract"]);
        assert_eq!(contracts[1].functions().variables.len(), 1);
    }

    #[test]
    fn test_flat_format() {
        let json = format!(
            r#"{{"1":{{"Token":{{"address":"0x5FbDB2315678afecb367f032d93F642f64180aa3","abi":{ABI}}}}}}}"#
        );
        let contracts = parse_contracts_file(&json, 1).unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].name, "Token");
    }

    #[test]
    fn test_missing_chain_is_empty() {
        let contracts = parse_contracts_file(r#"{"1":{}}"#, 31337).unwrap();
        assert!(contracts.is_empty());
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            parse_contracts_file("not json", 1),
            Err(ScaffoldError::Config(_))
        ));
        assert!(parse_contracts_file(r#"{"1": 5}"#, 1).is_err());
    }

    #[test]
    fn test_code_status() {
        assert_eq!(ContractCodeStatus::from_code(&[]), ContractCodeStatus::NotFound);
        assert_eq!(ContractCodeStatus::from_code(&[0x60]), ContractCodeStatus::Deployed);
    }
}

//! Type conversions between Alloy types and the scaffold's own summaries

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{Log, TransactionReceipt};
use anyhow::{Context, Result};

use crate::domain::abi::BigInteger;
use crate::domain::display::CallValue;

/// One event log of a watched contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl From<&Log> for LogEntry {
    fn from(log: &Log) -> Self {
        Self {
            address: log.address(),
            block_number: log.block_number,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
        }
    }
}

/// The parts of a receipt the scaffold shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `false` when the transaction reverted
    pub status: bool,
    pub gas_used: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
}

impl From<&TransactionReceipt> for ReceiptSummary {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            status: receipt.status(),
            gas_used: receipt.gas_used(),
            from: receipt.from(),
            to: receipt.to(),
            contract_address: receipt.contract_address(),
        }
    }
}

impl From<&ReceiptSummary> for CallValue {
    fn from(receipt: &ReceiptSummary) -> Self {
        let address = |a: Option<Address>| match a {
            Some(a) => CallValue::Text(a.to_checksum(None)),
            None => CallValue::Null,
        };
        CallValue::record([
            ("transactionHash", CallValue::Text(receipt.transaction_hash.to_string())),
            (
                "blockNumber",
                receipt
                    .block_number
                    .map(|n| CallValue::Int(BigInteger::positive(U256::from(n))))
                    .unwrap_or(CallValue::Null),
            ),
            (
                "status",
                CallValue::Text(if receipt.status { "success" } else { "reverted" }.to_string()),
            ),
            (
                "gasUsed",
                CallValue::Int(BigInteger::positive(U256::from(receipt.gas_used))),
            ),
            ("from", CallValue::Text(receipt.from.to_checksum(None))),
            ("to", address(receipt.to)),
            ("contractAddress", address(receipt.contract_address)),
        ])
    }
}

/// Transaction data parsed from raw JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSummary {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub gas: u64,
    pub nonce: u64,
    pub block_number: Option<u64>,
}

/// Parse a transaction object from `eth_getTransactionByHash`
pub fn parse_raw_transaction(json: &serde_json::Value) -> Option<TxSummary> {
    let hash = json.get("hash")?.as_str()?.parse().ok()?;
    let from = json.get("from")?.as_str()?.parse().ok()?;
    let to = json
        .get("to")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok());

    let value_str = json.get("value").and_then(|v| v.as_str()).unwrap_or("0x0");
    let value = parse_hex_u256(value_str).unwrap_or(U256::ZERO);

    let input_str = json.get("input").and_then(|v| v.as_str()).unwrap_or("0x");
    let input = hex::decode(input_str.strip_prefix("0x").unwrap_or(input_str)).unwrap_or_default();

    let hex_field = |name: &str| json.get(name).and_then(|v| v.as_str()).and_then(|s| parse_hex_u64(s).ok());

    Some(TxSummary {
        hash,
        from,
        to,
        value,
        input: Bytes::from(input),
        gas: hex_field("gas").unwrap_or(0),
        nonce: hex_field("nonce").unwrap_or(0),
        block_number: hex_field("blockNumber"),
    })
}

/// A block with its full transaction objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: Option<B256>,
    pub timestamp: u64,
    pub transactions: Vec<TxSummary>,
}

/// Parse a block object from `eth_getBlockByNumber` with full transactions
pub fn parse_raw_block(json: &serde_json::Value) -> Result<BlockSummary> {
    let hex_field = |name: &str| -> Result<u64> {
        let value = json
            .get(name)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Block is missing {name}"))?;
        parse_hex_u64(value)
    };
    let number = hex_field("number")?;
    let hash = json
        .get("hash")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok());

    let transactions = json
        .get("transactions")
        .and_then(|v| v.as_array())
        .map(|txs| {
            txs.iter()
                .filter_map(parse_raw_transaction)
                .map(|mut tx| {
                    tx.block_number = tx.block_number.or(Some(number));
                    tx
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(BlockSummary {
        number,
        hash,
        timestamp: hex_field("timestamp")?,
        transactions,
    })
}

/// Parse hex string to u64
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).context("Failed to parse hex u64")
}

/// Parse hex string to U256
pub fn parse_hex_u256(s: &str) -> Result<U256> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(s, 16).context("Failed to parse hex u256")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::display::{render, DisplayResult};

    #[test]
    fn test_parse_raw_transaction() {
        let json = json!({
            "hash": "0x2c2f6b5cd1a7e5b7a63a1c7fb36f6a6a86e6d87e3d0b1e6f7f1b0aa0f5d2c3e1",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": null,
            "value": "0xde0b6b3a7640000",
            "input": "0x6080",
            "gas": "0x5208",
            "nonce": "0x1",
            "blockNumber": "0x10",
            "type": "0x7e"
        });
        let tx = parse_raw_transaction(&json).unwrap();
        assert_eq!(tx.to, None);
        assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(tx.input, Bytes::from(vec![0x60, 0x80]));
        assert_eq!(tx.gas, 21000);
        assert_eq!(tx.block_number, Some(16));
    }

    #[test]
    fn test_pending_transaction_has_no_block() {
        let json = json!({
            "hash": "0x2c2f6b5cd1a7e5b7a63a1c7fb36f6a6a86e6d87e3d0b1e6f7f1b0aa0f5d2c3e1",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "blockNumber": null
        });
        assert_eq!(parse_raw_transaction(&json).unwrap().block_number, None);
        assert!(parse_raw_transaction(&json!({"hash": "0x1"})).is_none());
    }

    #[test]
    fn test_parse_raw_block_keeps_full_transactions() {
        let json = json!({
            "number": "0x2a",
            "hash": "0x88e96d4537bea4d9c05d12549907b32561d3bf31f45aae734cdc119f13406cb6",
            "timestamp": "0x65a0f2c0",
            "transactions": [
                {
                    "hash": "0x2c2f6b5cd1a7e5b7a63a1c7fb36f6a6a86e6d87e3d0b1e6f7f1b0aa0f5d2c3e1",
                    "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                    "to": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "value": "0x0",
                    "input": "0xa4136862"
                },
                "0x2c2f6b5cd1a7e5b7a63a1c7fb36f6a6a86e6d87e3d0b1e6f7f1b0aa0f5d2c3e2"
            ]
        });
        let block = parse_raw_block(&json).unwrap();
        assert_eq!(block.number, 42);
        assert_eq!(block.timestamp, 0x65a0f2c0);
        assert!(block.hash.is_some());
        // hash-only entries are skipped
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].block_number, Some(42));

        assert!(parse_raw_block(&json!({"hash": null})).is_err());
    }

    #[test]
    fn test_receipt_renders_as_record() {
        let receipt = ReceiptSummary {
            transaction_hash: B256::repeat_byte(0xab),
            block_number: Some(7),
            status: false,
            gas_used: 21000,
            from: Address::with_last_byte(1),
            to: None,
            contract_address: Some(Address::with_last_byte(2)),
        };
        let DisplayResult::Text(text) = render(&CallValue::from(&receipt), false) else {
            panic!("expected text");
        };
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "reverted");
        assert_eq!(parsed["gasUsed"], "21000");
        assert_eq!(parsed["to"], serde_json::Value::Null);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_u64("0x1f").unwrap(), 31);
        assert_eq!(parse_hex_u256("0x").unwrap(), U256::ZERO);
        assert!(parse_hex_u64("0xzz").is_err());
    }
}

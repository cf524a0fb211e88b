//! Explorer search by transaction hash or address

use alloy::primitives::{Address, B256};

use crate::infrastructure::ethereum::{EthereumProvider, TxSummary};

pub const EMPTY_QUERY: &str = "Please enter a search term.";
pub const INVALID_QUERY: &str = "Invalid transaction hash or address.";
pub const FETCH_FAILED: &str = "An error occurred while fetching the data.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Transaction(TxSummary),
    Address(Address),
    /// Message to show under the search field
    Error(&'static str),
}

fn parse_hash(query: &str) -> Option<B256> {
    let digits = query.strip_prefix("0x")?;
    if digits.len() != 64 {
        return None;
    }
    digits.parse().ok()
}

fn parse_address(query: &str) -> Option<Address> {
    let digits = query.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    query.parse().ok()
}

/// A hash that names a known transaction opens it; otherwise an address opens
/// the address view
pub async fn search(provider: &dyn EthereumProvider, query: &str) -> SearchOutcome {
    let query = query.trim();
    if query.is_empty() {
        return SearchOutcome::Error(EMPTY_QUERY);
    }

    if let Some(hash) = parse_hash(query) {
        match provider.get_transaction(hash).await {
            Ok(Some(tx)) => return SearchOutcome::Transaction(tx),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%hash, "transaction lookup failed: {err:#}");
                return SearchOutcome::Error(FETCH_FAILED);
            }
        }
    }

    match parse_address(query) {
        Some(address) => SearchOutcome::Address(address),
        None => SearchOutcome::Error(INVALID_QUERY),
    }
}

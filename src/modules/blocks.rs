//! Recent transactions for the explorer home page, newest block first

use anyhow::Result;
use futures::future::join_all;

use crate::infrastructure::ethereum::{EthereumProvider, ReceiptSummary, TxSummary};

/// Blocks fetched per page
pub const BLOCKS_PER_PAGE: u64 = 20;

pub const NOT_LOCALHOST: &str =
    "targetNetwork is not localhost. This block explorer is only for localhost.";

/// One transaction with the block time and its receipt when the node has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRow {
    pub tx: TxSummary,
    pub timestamp: u64,
    pub receipt: Option<ReceiptSummary>,
}

impl TxRow {
    /// Address of the contract this transaction created, if any
    pub fn created_contract(&self) -> Option<alloy::primitives::Address> {
        match self.tx.to {
            Some(_) => None,
            None => self.receipt.as_ref().and_then(|r| r.contract_address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsPage {
    pub page: u64,
    /// Blocks on chain when the page was fetched, genesis included
    pub total_blocks: u64,
    pub rows: Vec<TxRow>,
}

impl TransactionsPage {
    pub fn page_count(&self) -> u64 {
        page_count(self.total_blocks)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }
}

pub fn page_count(total_blocks: u64) -> u64 {
    total_blocks.div_ceil(BLOCKS_PER_PAGE)
}

/// Block numbers shown on `page` when `head` is the latest block
pub fn page_blocks(head: u64, page: u64) -> Vec<u64> {
    let skip = page.saturating_mul(BLOCKS_PER_PAGE);
    if skip > head {
        return Vec::new();
    }
    let newest = head - skip;
    let count = BLOCKS_PER_PAGE.min(newest + 1);
    (0..count).map(|i| newest - i).collect()
}

/// Fetch one page of blocks, then the receipts of their transactions
pub async fn fetch_page(provider: &dyn EthereumProvider, page: u64) -> Result<TransactionsPage> {
    let head = provider.block_number().await?;
    let numbers = page_blocks(head, page);

    let blocks = join_all(numbers.iter().map(|n| provider.get_block(*n))).await;
    let mut rows = Vec::new();
    for block in blocks {
        // A reorg can drop a block between the head read and the fetch
        let Some(block) = block? else { continue };
        rows.extend(block.transactions.into_iter().map(|tx| TxRow {
            tx,
            timestamp: block.timestamp,
            receipt: None,
        }));
    }

    let receipts = join_all(rows.iter().map(|row| provider.get_receipt(row.tx.hash))).await;
    for (row, receipt) in rows.iter_mut().zip(receipts) {
        row.receipt = receipt?;
    }

    tracing::debug!(page, head, transactions = rows.len(), "transactions page loaded");
    Ok(TransactionsPage {
        page,
        total_blocks: head + 1,
        rows,
    })
}

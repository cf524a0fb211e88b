//! Application context shared with the code that needs it

use alloy::primitives::Address;

/// Chain id of the local development chain
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// Settings and connection facts passed explicitly instead of living in a
/// global store
#[derive(Debug, Clone)]
pub struct AppContext {
    /// USD per native token; 0 when unknown
    pub native_currency_price: f64,

    /// Chain the contracts file and faucet are for
    pub target_chain_id: u64,

    /// Chain of the connected node, once known
    pub chain_id: Option<u64>,

    /// Current RPC endpoint display string
    pub rpc_endpoint: String,

    /// Node type (anvil, hardhat, geth, ...)
    pub node_kind: String,

    /// Unlocked accounts of the node
    pub accounts: Vec<Address>,

    /// Index into `accounts` used for writes
    pub sender_index: usize,

    /// Index into `accounts` used by the faucet
    pub faucet_account_index: usize,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            native_currency_price: 0.0,
            target_chain_id: LOCAL_CHAIN_ID,
            chain_id: None,
            rpc_endpoint: String::new(),
            node_kind: String::new(),
            accounts: Vec::new(),
            sender_index: 0,
            faucet_account_index: 0,
        }
    }
}

impl AppContext {
    pub fn is_connected(&self) -> bool {
        self.chain_id.is_some()
    }

    /// Connected to the target chain and that chain is the local one
    pub fn is_local_chain(&self) -> bool {
        self.target_chain_id == LOCAL_CHAIN_ID && self.chain_id == Some(self.target_chain_id)
    }

    /// Account used to send writes
    pub fn sender(&self) -> Option<Address> {
        self.accounts.get(self.sender_index).copied()
    }

    pub fn faucet_account(&self) -> Option<Address> {
        self.accounts.get(self.faucet_account_index).copied()
    }

    pub fn has_price(&self) -> bool {
        self.native_currency_price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_chain_detection() {
        let mut ctx = AppContext::default();
        assert!(!ctx.is_local_chain());
        ctx.chain_id = Some(LOCAL_CHAIN_ID);
        assert!(ctx.is_local_chain());
        ctx.chain_id = Some(1);
        assert!(!ctx.is_local_chain());
    }

    #[test]
    fn test_accounts_by_index() {
        let mut ctx = AppContext {
            accounts: vec![Address::with_last_byte(1), Address::with_last_byte(2)],
            faucet_account_index: 1,
            ..Default::default()
        };
        assert_eq!(ctx.sender(), Some(Address::with_last_byte(1)));
        assert_eq!(ctx.faucet_account(), Some(Address::with_last_byte(2)));
        ctx.faucet_account_index = 5;
        assert_eq!(ctx.faucet_account(), None);
    }
}

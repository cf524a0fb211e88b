//! Application services
//!
//! Each module wraps one piece of behaviour behind the provider trait:
//! - blocks: recent transactions for the explorer home page
//! - calls: calldata from forms, eth_call and output decoding
//! - transactor: write submission with phase reporting
//! - watch: cancellable background tasks
//! - logs: contract log watch
//! - storage: storage slot scan
//! - search: explorer search
//! - faucet: local-chain ether transfers
//! - ether: ether/USD amount conversion
//! - bytecode: code listing for the address view

pub mod blocks;
pub mod bytecode;
pub mod calls;
pub mod ether;
pub mod faucet;
pub mod logs;
pub mod search;
pub mod storage;
pub mod transactor;
pub mod watch;

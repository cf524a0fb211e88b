//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - Contracts file loading and deployment checks
//! - Tokio runtime bridge for async operations

pub mod contracts;
pub mod ethereum;
pub mod runtime;

pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, TxOrigin, WorkerConfig};

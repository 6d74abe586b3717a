//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - ABI descriptor loading and dynamic contract bindings (alloy-dyn-abi)
//! - Session, port relay and the Tokio runtime bridge

pub mod abi;
pub mod ethereum;
pub mod runtime;

pub use ethereum::{EthereumProvider, ProviderConfig, TransactionOutcome};
pub use runtime::{RuntimeBridge, RuntimeCommand, SessionSettings};

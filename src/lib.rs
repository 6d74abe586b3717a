//! Port bridge between a message-passing frontend and the HardcoreBank
//! savings contract.
//!
//! Inbound port messages (`createAccount`, `getAccounts`, `getTokenBalance`,
//! `deposit`, `withdraw`) are turned into contract calls over JSON-RPC and
//! answered on the matching outbound ports.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{BridgeError, BridgeResult};

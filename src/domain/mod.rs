//! Domain layer - bridge data model and port messages
//!
//! Independent of the RPC transport and the ABI machinery.

pub mod bank;
pub mod ports;

pub use bank::{Account, AccountId, AccountRow, CreateAccountRequest, DepositRequest};
pub use ports::{InboundPort, OutboundPort};

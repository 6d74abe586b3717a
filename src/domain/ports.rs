//! Port messages exchanged with the frontend
//!
//! Every message is an envelope `{"port": <name>, "value": <payload>}`; the
//! port names are the channel names the frontend subscribes to.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::domain::bank::amount;
use crate::domain::bank::{Account, AccountId, CreateAccountRequest, DepositRequest};

/// Requests sent by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "value", rename_all = "camelCase")]
pub enum InboundPort {
    CreateAccount(CreateAccountRequest),
    GetAccounts,
    /// Token contract to query the wallet balance on
    GetTokenBalance(Address),
    Deposit(DepositRequest),
    Withdraw(#[serde(with = "amount::decimal")] AccountId),
}

/// Replies published back to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "value", rename_all = "camelCase")]
pub enum OutboundPort {
    Created(bool),
    GotAccounts(Vec<Account>),
    GotTokenBalance(#[serde(with = "amount::decimal")] U256),
    DepositDone(bool),
    WithdrawDone(bool),
}

impl InboundPort {
    pub fn name(&self) -> &'static str {
        match self {
            InboundPort::CreateAccount(_) => "createAccount",
            InboundPort::GetAccounts => "getAccounts",
            InboundPort::GetTokenBalance(_) => "getTokenBalance",
            InboundPort::Deposit(_) => "deposit",
            InboundPort::Withdraw(_) => "withdraw",
        }
    }

    /// Parse one JSON-encoded message.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl OutboundPort {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundPort::Created(_) => "created",
            OutboundPort::GotAccounts(_) => "gotAccounts",
            OutboundPort::GotTokenBalance(_) => "gotTokenBalance",
            OutboundPort::DepositDone(_) => "depositDone",
            OutboundPort::WithdrawDone(_) => "withdrawDone",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

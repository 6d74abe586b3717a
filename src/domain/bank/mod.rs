//! Savings-account read model and request payloads

pub mod amount;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Bank-side account identifier (a `uint256` on chain).
pub type AccountId = U256;

/// A savings account as presented to the frontend.
///
/// Assembled from one `getAccounts` row plus the account balance held by the
/// bank and the name/symbol of the underlying token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(with = "amount::decimal")]
    pub id: AccountId,
    pub subject: String,
    pub description: String,
    pub contract_address: Address,
    pub token_name: String,
    pub token_symbol: String,
    #[serde(with = "amount::decimal")]
    pub target_amount: U256,
    /// Keeps the key spelling the frontend decoder reads
    #[serde(
        with = "amount::decimal",
        rename = "monthlyRemittrance",
        alias = "monthlyRemittance"
    )]
    pub monthly_remittance: U256,
    /// Creation time, unix seconds
    pub created: u64,
    #[serde(with = "amount::decimal")]
    pub balance: U256,
}

/// One entry of the bank's `getAccounts()` enumeration, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub id: AccountId,
    pub owner: Address,
    pub subject: String,
    pub description: String,
    pub token: Address,
    pub target_amount: U256,
    pub monthly_remittance: U256,
    pub created: u64,
}

impl AccountRow {
    /// Complete the row with the lookups made against the bank and token.
    pub fn into_account(self, balance: U256, token_name: String, token_symbol: String) -> Account {
        Account {
            id: self.id,
            subject: self.subject,
            description: self.description,
            contract_address: self.token,
            token_name,
            token_symbol,
            target_amount: self.target_amount,
            monthly_remittance: self.monthly_remittance,
            created: self.created,
            balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub subject: String,
    pub description: String,
    pub token_contract_address: Address,
    #[serde(with = "amount::decimal")]
    pub target_amount: U256,
    #[serde(with = "amount::decimal", alias = "monthlyRemittrance")]
    pub monthly_remittance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub token_contract_address: Address,
    #[serde(with = "amount::decimal")]
    pub amount: U256,
    #[serde(with = "amount::decimal")]
    pub account_id: AccountId,
}

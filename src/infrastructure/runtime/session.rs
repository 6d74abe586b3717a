//! Bridge session - the immutable state every port handler works against

use std::sync::Arc;
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::domain::{Account, AccountId, AccountRow, CreateAccountRequest, DepositRequest};
use crate::error::{BridgeError, BridgeResult};
use crate::infrastructure::abi::{values, AbiLoader, AbiSource, ContractBinding};
use crate::infrastructure::ethereum::{EthereumProvider, TransactionOutcome};

/// Where the session finds its contracts.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub bank_address: Address,
    pub bank_abi: AbiSource,
    pub token_abi: AbiSource,
    /// HTTP timeout for ABI descriptor fetches
    pub abi_timeout: Duration,
}

/// Everything resolved during initialization.
///
/// Built once and shared read-only with every handler; there is no other
/// bridge state.
pub struct Session {
    provider: Arc<dyn EthereumProvider>,
    wallet: Vec<Address>,
    sender: Address,
    bank: ContractBinding,
    token: ContractBinding,
}

impl Session {
    /// Load both ABI descriptors and authorize the wallet, all concurrently.
    pub async fn initialize(
        provider: Arc<dyn EthereumProvider>,
        settings: &SessionSettings,
        loader: &AbiLoader,
    ) -> BridgeResult<Self> {
        let (bank_abi, token_abi, wallet) = tokio::try_join!(
            loader.load(&settings.bank_abi),
            loader.load(&settings.token_abi),
            authorize(provider.as_ref()),
        )?;

        let sender = wallet[0];
        let bank = ContractBinding::new("HardcoreBank", settings.bank_address, Arc::new(bank_abi));
        let token = ContractBinding::new("ERC777", Address::ZERO, Arc::new(token_abi));

        info!(
            endpoint = %provider.endpoint_name(),
            bank = %settings.bank_address,
            sender = %sender,
            wallet_accounts = wallet.len(),
            "session ready"
        );

        Ok(Self {
            provider,
            wallet,
            sender,
            bank,
            token,
        })
    }

    /// Address every call and transaction is sent from.
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn wallet(&self) -> &[Address] {
        &self.wallet
    }

    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> BridgeResult<TransactionOutcome> {
        let args = [
            DynSolValue::String(request.subject.clone()),
            DynSolValue::String(request.description.clone()),
            DynSolValue::Address(request.token_contract_address),
            uint(request.target_amount),
            uint(request.monthly_remittance),
        ];
        self.bank
            .transact(self.provider.as_ref(), self.sender, "createAccount", &args)
            .await
    }

    /// Every account the bank reports for the sender, enriched and in
    /// contract order.
    ///
    /// Rows are enriched concurrently; the list is only complete once every
    /// lookup succeeded, and any failure fails the whole list.
    pub async fn list_accounts(&self) -> BridgeResult<Vec<Account>> {
        let output = self
            .bank
            .call(self.provider.as_ref(), self.sender, "getAccounts", &[])
            .await?;
        let rows = values::account_rows("getAccounts", &output)?;
        debug!(count = rows.len(), "enriching accounts");

        try_join_all(rows.into_iter().map(|row| self.enrich(row))).await
    }

    async fn enrich(&self, row: AccountRow) -> BridgeResult<Account> {
        let token = self.token.at(row.token);
        let (balance, name, symbol) = tokio::try_join!(
            self.account_balance(row.id),
            self.read_string(&token, "name"),
            self.read_string(&token, "symbol"),
        )?;
        Ok(row.into_account(balance, name, symbol))
    }

    async fn account_balance(&self, id: AccountId) -> BridgeResult<U256> {
        let output = self
            .bank
            .call(self.provider.as_ref(), self.sender, "balanceOf", &[uint(id)])
            .await?;
        values::as_uint("balanceOf", values::single("balanceOf", &output)?)
    }

    async fn read_string(&self, contract: &ContractBinding, function: &str) -> BridgeResult<String> {
        let output = contract
            .call(self.provider.as_ref(), self.sender, function, &[])
            .await?;
        values::as_string(function, values::single(function, &output)?)
    }

    /// The sender's raw balance on `token`.
    pub async fn token_balance(&self, token: Address) -> BridgeResult<U256> {
        let output = self
            .token
            .at(token)
            .call(
                self.provider.as_ref(),
                self.sender,
                "balanceOf",
                &[DynSolValue::Address(self.sender)],
            )
            .await?;
        values::as_uint("balanceOf", values::single("balanceOf", &output)?)
    }

    /// Send tokens to the bank with the target account id as user data.
    pub async fn deposit(&self, request: &DepositRequest) -> BridgeResult<TransactionOutcome> {
        let data = uint(request.account_id).abi_encode();
        let args = [
            DynSolValue::Address(self.bank.address()),
            uint(request.amount),
            DynSolValue::Bytes(data),
        ];
        self.token
            .at(request.token_contract_address)
            .transact(self.provider.as_ref(), self.sender, "send", &args)
            .await
    }

    pub async fn withdraw(&self, id: AccountId) -> BridgeResult<TransactionOutcome> {
        self.bank
            .transact(self.provider.as_ref(), self.sender, "withdraw", &[uint(id)])
            .await
    }
}

async fn authorize(provider: &dyn EthereumProvider) -> BridgeResult<Vec<Address>> {
    let accounts = provider
        .request_accounts()
        .await
        .map_err(|err| BridgeError::WalletRejected(format!("{:#}", err)))?;

    if accounts.is_empty() {
        return Err(BridgeError::WalletRejected(
            "wallet exposed no accounts".to_string(),
        ));
    }
    Ok(accounts)
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

//! In-memory chain answering like HardcoreBank and ERC777 contracts would

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use anyhow::{anyhow, bail, ensure, Result};

use hardcore_bridge::infrastructure::abi::{parse_abi, AbiSource};
use hardcore_bridge::infrastructure::{EthereumProvider, SessionSettings, TransactionOutcome};

pub const BANK_ABI: &str = include_str!("../../abi/HardcoreBank.json");
pub const TOKEN_ABI: &str = include_str!("../../abi/ERC777.json");

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn bank_address() -> Address {
    Address::repeat_byte(0xba)
}

pub fn token_a() -> Address {
    Address::repeat_byte(0x0a)
}

pub fn token_b() -> Address {
    Address::repeat_byte(0x0b)
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        bank_address: bank_address(),
        bank_abi: AbiSource::Inline(BANK_ABI.to_string()),
        token_abi: AbiSource::Inline(TOKEN_ABI.to_string()),
        abi_timeout: Duration::from_secs(1),
    }
}

#[derive(Debug, Clone)]
struct BankAccount {
    id: U256,
    owner: Address,
    subject: String,
    description: String,
    token: Address,
    target_amount: U256,
    monthly_remittance: U256,
    created: u64,
    balance: U256,
}

#[derive(Debug, Default)]
struct Token {
    name: String,
    symbol: String,
    holders: HashMap<Address, U256>,
}

#[derive(Debug, Default)]
struct ChainState {
    accounts: Vec<BankAccount>,
    tokens: HashMap<Address, Token>,
    next_id: u64,
    tx_count: u8,
    broken_tokens: HashSet<Address>,
    wallet_rejects: bool,
    wallet: Vec<Address>,
}

pub struct MockChain {
    bank: Address,
    bank_abi: JsonAbi,
    token_abi: JsonAbi,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            bank: bank_address(),
            bank_abi: parse_abi("bank", BANK_ABI).expect("bank abi"),
            token_abi: parse_abi("token", TOKEN_ABI).expect("token abi"),
            state: Mutex::new(ChainState {
                next_id: 1,
                wallet: vec![alice(), bob()],
                ..ChainState::default()
            }),
        })
    }

    pub fn deploy_token(&self, address: Address, name: &str, symbol: &str) {
        self.state.lock().unwrap().tokens.insert(
            address,
            Token {
                name: name.to_string(),
                symbol: symbol.to_string(),
                holders: HashMap::new(),
            },
        );
    }

    pub fn mint(&self, token: Address, holder: Address, amount: u64) {
        let mut state = self.state.lock().unwrap();
        let token = state.tokens.get_mut(&token).expect("token deployed");
        *token.holders.entry(holder).or_default() += U256::from(amount);
    }

    /// Open an account directly in bank storage, returning its id
    pub fn open_account(&self, owner: Address, subject: &str, token: Address, balance: u64) -> U256 {
        let mut state = self.state.lock().unwrap();
        let id = U256::from(state.next_id);
        state.next_id += 1;
        let created = 1_600_000_000 + state.accounts.len() as u64;
        state.accounts.push(BankAccount {
            id,
            owner,
            subject: subject.to_string(),
            description: format!("{} savings", subject),
            token,
            target_amount: U256::from(10_000u64),
            monthly_remittance: U256::from(500u64),
            created,
            balance: U256::from(balance),
        });
        id
    }

    pub fn account_balance(&self, id: U256) -> Option<U256> {
        let state = self.state.lock().unwrap();
        state.accounts.iter().find(|a| a.id == id).map(|a| a.balance)
    }

    pub fn holder_balance(&self, token: Address, holder: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state
            .tokens
            .get(&token)
            .and_then(|t| t.holders.get(&holder).copied())
            .unwrap_or_default()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    /// Make every read of `token` fail
    pub fn break_token(&self, token: Address) {
        self.state.lock().unwrap().broken_tokens.insert(token);
    }

    pub fn reject_wallet(&self) {
        self.state.lock().unwrap().wallet_rejects = true;
    }

    pub fn empty_wallet(&self) {
        self.state.lock().unwrap().wallet.clear();
    }

    fn bank_call(&self, from: Address, data: &[u8]) -> Result<Vec<u8>> {
        let (func, args) = resolve(&self.bank_abi, data)?;
        let state = self.state.lock().unwrap();

        let output = match func.name.as_str() {
            "getAccounts" => {
                let rows = state
                    .accounts
                    .iter()
                    .filter(|a| a.owner == from)
                    .map(|a| {
                        DynSolValue::Tuple(vec![
                            uint(a.id),
                            DynSolValue::Address(a.owner),
                            DynSolValue::String(a.subject.clone()),
                            DynSolValue::String(a.description.clone()),
                            DynSolValue::Address(a.token),
                            uint(a.target_amount),
                            uint(a.monthly_remittance),
                            uint(U256::from(a.created)),
                        ])
                    })
                    .collect();
                vec![DynSolValue::Array(rows)]
            }
            "balanceOf" => {
                let id = arg_uint(&args, 0)?;
                let account = state
                    .accounts
                    .iter()
                    .find(|a| a.id == id)
                    .ok_or_else(|| anyhow!("execution reverted: unknown account"))?;
                vec![uint(account.balance)]
            }
            other => bail!("bank view `{}` not mocked", other),
        };
        Ok(func.abi_encode_output(&output)?)
    }

    fn token_call(&self, token: Address, data: &[u8]) -> Result<Vec<u8>> {
        let (func, args) = resolve(&self.token_abi, data)?;
        let state = self.state.lock().unwrap();
        ensure!(!state.broken_tokens.contains(&token), "execution reverted");
        let contract = state
            .tokens
            .get(&token)
            .ok_or_else(|| anyhow!("no contract at {}", token))?;

        let output = match func.name.as_str() {
            "name" => vec![DynSolValue::String(contract.name.clone())],
            "symbol" => vec![DynSolValue::String(contract.symbol.clone())],
            "balanceOf" => {
                let holder = arg_address(&args, 0)?;
                vec![uint(contract.holders.get(&holder).copied().unwrap_or_default())]
            }
            other => bail!("token view `{}` not mocked", other),
        };
        Ok(func.abi_encode_output(&output)?)
    }

    /// Ok(false) models a mined-but-reverted transaction, Err a rejected one
    fn bank_transact(&self, from: Address, data: &[u8]) -> Result<bool> {
        let (func, args) = resolve(&self.bank_abi, data)?;
        let mut state = self.state.lock().unwrap();

        match func.name.as_str() {
            "createAccount" => {
                let target_amount = arg_uint(&args, 3)?;
                ensure!(!target_amount.is_zero(), "execution reverted: zero target");
                let id = U256::from(state.next_id);
                state.next_id += 1;
                let created = 1_600_000_000 + state.accounts.len() as u64;
                state.accounts.push(BankAccount {
                    id,
                    owner: from,
                    subject: arg_string(&args, 0)?,
                    description: arg_string(&args, 1)?,
                    token: arg_address(&args, 2)?,
                    target_amount,
                    monthly_remittance: arg_uint(&args, 4)?,
                    created,
                    balance: U256::ZERO,
                });
                Ok(true)
            }
            "withdraw" => {
                let id = arg_uint(&args, 0)?;
                let account = state
                    .accounts
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| anyhow!("execution reverted: unknown account"))?;
                if account.owner != from {
                    return Ok(false);
                }
                let (token, amount) = (account.token, account.balance);
                account.balance = U256::ZERO;
                if let Some(contract) = state.tokens.get_mut(&token) {
                    *contract.holders.entry(from).or_default() += amount;
                }
                Ok(true)
            }
            other => bail!("bank transaction `{}` not mocked", other),
        }
    }

    fn token_transact(&self, token: Address, from: Address, data: &[u8]) -> Result<bool> {
        let (func, args) = resolve(&self.token_abi, data)?;
        ensure!(func.name == "send", "token transaction `{}` not mocked", func.name);

        let recipient = arg_address(&args, 0)?;
        let amount = arg_uint(&args, 1)?;
        let user_data = match args.get(2) {
            Some(DynSolValue::Bytes(bytes)) => bytes.clone(),
            _ => bail!("missing data argument"),
        };

        let mut state = self.state.lock().unwrap();
        let held = state
            .tokens
            .get(&token)
            .ok_or_else(|| anyhow!("no contract at {}", token))?
            .holders
            .get(&from)
            .copied()
            .unwrap_or_default();
        ensure!(held >= amount, "execution reverted: insufficient balance");

        if recipient == self.bank {
            // tokensReceived hook: data carries the target account id
            let id = match DynSolType::Uint(256).abi_decode(&user_data)? {
                DynSolValue::Uint(id, _) => id,
                _ => bail!("execution reverted: bad user data"),
            };
            let account = state
                .accounts
                .iter_mut()
                .find(|a| a.id == id && a.token == token)
                .ok_or_else(|| anyhow!("execution reverted: unknown account"))?;
            account.balance += amount;
        } else {
            let contract = state.tokens.get_mut(&token).expect("checked above");
            *contract.holders.entry(recipient).or_default() += amount;
        }

        let contract = state.tokens.get_mut(&token).expect("checked above");
        *contract.holders.entry(from).or_default() -= amount;
        Ok(true)
    }

    fn next_hash(&self) -> B256 {
        let mut state = self.state.lock().unwrap();
        state.tx_count = state.tx_count.wrapping_add(1);
        B256::with_last_byte(state.tx_count)
    }
}

#[async_trait::async_trait]
impl EthereumProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let state = self.state.lock().unwrap();
        ensure!(!state.wallet_rejects, "User rejected the request.");
        Ok(state.wallet.clone())
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        let (to, from, data) = unpack(&request)?;
        let output = if to == self.bank {
            self.bank_call(from, &data)?
        } else {
            self.token_call(to, &data)?
        };
        Ok(Bytes::from(output))
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionOutcome> {
        let (to, from, data) = unpack(&request)?;
        let success = if to == self.bank {
            self.bank_transact(from, &data)?
        } else {
            self.token_transact(to, from, &data)?
        };
        Ok(TransactionOutcome {
            tx_hash: self.next_hash(),
            success,
        })
    }

    fn endpoint_name(&self) -> String {
        "mock://chain".to_string()
    }
}

fn unpack(request: &TransactionRequest) -> Result<(Address, Address, Vec<u8>)> {
    let to = match request.to {
        Some(TxKind::Call(to)) => to,
        _ => bail!("missing call target"),
    };
    let from = request.from.ok_or_else(|| anyhow!("missing sender"))?;
    let data = request
        .input
        .input()
        .map(|bytes| bytes.to_vec())
        .unwrap_or_default();
    Ok((to, from, data))
}

fn resolve<'a>(abi: &'a JsonAbi, data: &[u8]) -> Result<(&'a Function, Vec<DynSolValue>)> {
    ensure!(data.len() >= 4, "calldata too short");
    let func = abi
        .functions()
        .find(|f| f.selector().as_slice() == &data[..4])
        .ok_or_else(|| anyhow!("unknown selector 0x{}", hex::encode(&data[..4])))?;
    let args = func.abi_decode_input(&data[4..])?;
    Ok((func, args))
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

fn arg_uint(args: &[DynSolValue], index: usize) -> Result<U256> {
    match args.get(index) {
        Some(DynSolValue::Uint(v, _)) => Ok(*v),
        _ => bail!("argument {} is not a uint", index),
    }
}

fn arg_address(args: &[DynSolValue], index: usize) -> Result<Address> {
    match args.get(index) {
        Some(DynSolValue::Address(a)) => Ok(*a),
        _ => bail!("argument {} is not an address", index),
    }
}

fn arg_string(args: &[DynSolValue], index: usize) -> Result<String> {
    match args.get(index) {
        Some(DynSolValue::String(s)) => Ok(s.clone()),
        _ => bail!("argument {} is not a string", index),
    }
}

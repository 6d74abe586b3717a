//! Ethereum provider abstraction and Alloy implementations
//!
//! The bridge never signs: transactions are submitted with `eth_sendTransaction`
//! and the node's wallet (or an injected signer behind the endpoint) signs them
//! for the authorized sender.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::json_rpc::RpcError;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{TransportError, TransportResult};
use anyhow::{Context, Result};
use tracing::debug;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Result of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub tx_hash: B256,
    /// Receipt status: false when the transaction reverted
    pub success: bool,
}

/// Abstract Ethereum provider trait
///
/// The four operations the bridge needs, abstracting over the Alloy
/// transport so handlers can run against any endpoint (or an in-memory chain
/// in tests).
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync + 'static {
    /// Ask the wallet to authorize this session and list its accounts
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Execute a read-only call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Submit a transaction and wait for its receipt
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionOutcome>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

// Type alias for the filled provider; identical for every transport
type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores the concrete type for each transport
pub enum AlloyProvider {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc_path = path.to_string_lossy().to_string();
            let ipc = IpcConnect::new(ipc_path);
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            let display = path.display().to_string();
            Ok(Box::new(AlloyProvider::Ipc {
                provider,
                endpoint: display,
            }))
        }
    }
}

impl AlloyProvider {
    fn inner(&self) -> &FilledProvider {
        match self {
            AlloyProvider::Http { provider, .. } => provider,
            AlloyProvider::WebSocket { provider, .. } => provider,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider,
        }
    }
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let provider = self.inner();
        let requested: TransportResult<Vec<Address>> = provider
            .raw_request("eth_requestAccounts".into(), ())
            .await;

        match requested {
            Ok(accounts) => Ok(accounts),
            // Plain nodes (anvil, geth --dev) only know eth_accounts
            Err(err) if method_unavailable(&err) => {
                debug!(error = %err, "eth_requestAccounts unavailable, falling back to eth_accounts");
                Ok(provider.get_accounts().await?)
            }
            Err(err) => Err(err).context("Wallet refused eth_requestAccounts"),
        }
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        Ok(self.inner().call(request).await?)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionOutcome> {
        let pending = self
            .inner()
            .send_transaction(request)
            .await
            .context("Transaction rejected")?;
        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to fetch transaction receipt")?;

        Ok(TransactionOutcome {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
        })
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}

/// JSON-RPC error codes for a method the endpoint does not implement
const METHOD_NOT_FOUND: i64 = -32601;
const METHOD_NOT_SUPPORTED: i64 = -32004;

/// True only when the endpoint lacks the method; a user rejection (4001) or
/// any other failure is not.
fn method_unavailable(err: &TransportError) -> bool {
    match err.as_error_resp() {
        Some(payload) => matches!(payload.code, METHOD_NOT_FOUND | METHOD_NOT_SUPPORTED),
        None => matches!(err, RpcError::UnsupportedFeature(_)),
    }
}

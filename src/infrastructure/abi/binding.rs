//! Dynamic contract bindings built from a JSON ABI

use std::sync::Arc;

use alloy::rpc::types::TransactionRequest;
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::infrastructure::ethereum::{EthereumProvider, TransactionOutcome};

/// A JSON ABI bound to a deployment address.
///
/// Functions are looked up by name and argument count, so overloaded entry
/// points resolve to the one matching the call site.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    name: String,
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractBinding {
    pub fn new(name: impl Into<String>, address: Address, abi: Arc<JsonAbi>) -> Self {
        Self {
            name: name.into(),
            address,
            abi,
        }
    }

    /// The same ABI bound to another deployment.
    pub fn at(&self, address: Address) -> Self {
        Self {
            name: self.name.clone(),
            address,
            abi: Arc::clone(&self.abi),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn function(&self, name: &str, arity: usize) -> BridgeResult<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| BridgeError::MissingFunction {
                contract: self.name.clone(),
                function: name.to_string(),
                arity,
            })
    }

    /// Selector-prefixed calldata for `function(args..)`.
    pub fn encode_call(&self, function: &str, args: &[DynSolValue]) -> BridgeResult<Bytes> {
        let func = self.function(function, args.len())?;
        encode_with(func, args)
    }

    /// Run `function` as an `eth_call` from `from` and decode its outputs.
    pub async fn call(
        &self,
        provider: &dyn EthereumProvider,
        from: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> BridgeResult<Vec<DynSolValue>> {
        let func = self.function(function, args.len())?;
        let request = self.request(from, encode_with(func, args)?);

        let output = provider.call(request).await.map_err(BridgeError::rpc)?;
        func.abi_decode_output(&output)
            .map_err(|err| BridgeError::decode(function, err.to_string()))
    }

    /// Submit `function` as a transaction from `from` and wait for its receipt.
    pub async fn transact(
        &self,
        provider: &dyn EthereumProvider,
        from: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> BridgeResult<TransactionOutcome> {
        let input = self.encode_call(function, args)?;
        let outcome = provider
            .send_transaction(self.request(from, input))
            .await
            .map_err(BridgeError::rpc)?;

        debug!(
            contract = %self.name,
            function,
            tx = %outcome.tx_hash,
            success = outcome.success,
            "transaction mined"
        );
        Ok(outcome)
    }

    fn request(&self, from: Address, input: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .from(from)
            .to(self.address)
            .input(input.into())
    }
}

fn encode_with(func: &Function, args: &[DynSolValue]) -> BridgeResult<Bytes> {
    func.abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|err| BridgeError::Encode {
            function: func.name.clone(),
            reason: err.to_string(),
        })
}

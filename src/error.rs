//! Bridge error taxonomy

use thiserror::Error;

/// Failures raised while initializing the session or relaying a port request.
///
/// None of these ever reach the frontend: mutating operations collapse them
/// into a `false` outcome and read operations only log them.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to fetch ABI descriptor from {location}: {reason}")]
    AbiFetch { location: String, reason: String },

    #[error("invalid ABI descriptor at {location}: {reason}")]
    AbiParse { location: String, reason: String },

    #[error("contract {contract} has no function `{function}` taking {arity} argument(s)")]
    MissingFunction {
        contract: String,
        function: String,
        arity: usize,
    },

    #[error("failed to encode call to `{function}`: {reason}")]
    Encode { function: String, reason: String },

    #[error("unexpected output from `{function}`: {reason}")]
    Decode { function: String, reason: String },

    #[error("wallet authorization rejected: {0}")]
    WalletRejected(String),

    #[error("provider connection failed: {0}")]
    Connect(String),

    #[error("rpc error: {0}")]
    Rpc(String),
}

impl BridgeError {
    pub(crate) fn rpc(err: anyhow::Error) -> Self {
        BridgeError::Rpc(format!("{:#}", err))
    }

    pub(crate) fn decode(function: &str, reason: impl Into<String>) -> Self {
        BridgeError::Decode {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

//! ABI descriptor loading over HTTP or from disk

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use alloy_json_abi::JsonAbi;
use serde_json::Value;
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};

/// Where an ABI descriptor lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    /// HTTP(S) URL serving the descriptor
    Url(String),
    /// Local JSON file
    File(PathBuf),
    /// Descriptor text held in memory
    Inline(String),
}

impl AbiSource {
    /// Interpret a configured location: URLs are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            AbiSource::Url(trimmed.to_string())
        } else {
            AbiSource::File(PathBuf::from(trimmed))
        }
    }

    /// `<base>/<file>` under an ABI base URL or directory.
    pub fn under(base: &str, file: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        AbiSource::parse(&format!("{}/{}", base, file))
    }
}

impl fmt::Display for AbiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiSource::Url(url) => write!(f, "{}", url),
            AbiSource::File(path) => write!(f, "{}", path.display()),
            AbiSource::Inline(_) => write!(f, "<inline>"),
        }
    }
}

/// Fetches and parses ABI descriptors.
pub struct AbiLoader {
    http: reqwest::Client,
}

impl AbiLoader {
    pub fn new(timeout: Duration) -> BridgeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BridgeError::Connect(format!("HTTP client: {}", err)))?;
        Ok(Self { http })
    }

    pub async fn load(&self, source: &AbiSource) -> BridgeResult<JsonAbi> {
        let location = source.to_string();
        let text = match source {
            AbiSource::Url(url) => self.fetch(url).await?,
            AbiSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|err| BridgeError::AbiFetch {
                        location: location.clone(),
                        reason: err.to_string(),
                    })?
            }
            AbiSource::Inline(text) => text.clone(),
        };

        let abi = parse_abi(&location, &text)?;
        debug!(
            location = %location,
            functions = abi.functions().count(),
            "loaded ABI descriptor"
        );
        Ok(abi)
    }

    async fn fetch(&self, url: &str) -> BridgeResult<String> {
        let fetch_err = |reason: String| BridgeError::AbiFetch {
            location: url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| fetch_err(err.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|err| fetch_err(err.to_string()))
    }
}

/// Parse either a bare ABI array or a build artifact carrying an `abi` field.
pub fn parse_abi(location: &str, text: &str) -> BridgeResult<JsonAbi> {
    let parse_err = |reason: String| BridgeError::AbiParse {
        location: location.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(text).map_err(|err| parse_err(err.to_string()))?;
    let abi_value = match value {
        Value::Array(_) => value,
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| parse_err("object without an `abi` field".to_string()))?,
        _ => return Err(parse_err("expected an array or an artifact object".to_string())),
    };

    serde_json::from_value(abi_value).map_err(|err| parse_err(err.to_string()))
}

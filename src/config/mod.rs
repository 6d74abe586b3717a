use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::infrastructure::abi::AbiSource;
use crate::infrastructure::{ProviderConfig, SessionSettings};

/// Bank deployment used when nothing else is configured.
pub const DEFAULT_BANK_ADDRESS: &str = "0xdF65d56a30Bc2d84a03e929eC1Fc3924824429a8";
pub const DEFAULT_RPC: &str = "http://127.0.0.1:8545";
pub const DEFAULT_ABI_BASE_URL: &str = "http://127.0.0.1:8000/abi";
pub const BANK_ABI_FILE: &str = "HardcoreBank.json";
pub const TOKEN_ABI_FILE: &str = "ERC777.json";
const DEFAULT_ABI_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// HTTP JSON-RPC endpoint
    pub rpc: Option<String>,
    /// WebSocket endpoint, preferred over `rpc`
    pub ws: Option<String>,
    /// IPC socket path, preferred over both
    pub ipc: Option<String>,

    pub bank_address: Option<String>,

    /// Directory or URL holding both ABI descriptors
    pub abi_base_url: Option<String>,
    /// Full location of the bank ABI, overrides `abi_base_url`
    pub bank_abi: Option<String>,
    /// Full location of the token ABI, overrides `abi_base_url`
    pub token_abi: Option<String>,

    pub abi_timeout_secs: Option<u64>,
}

impl Config {
    /// JSON-RPC endpoint, in order of preference: IPC, WebSocket, HTTP.
    pub fn endpoint(&self) -> ProviderConfig {
        if let Some(ipc) = self.ipc_endpoint() {
            return ipc;
        }
        if let Some(url) = non_empty(&self.ws) {
            return ProviderConfig::WebSocket(url.to_string());
        }
        let url = non_empty(&self.rpc).unwrap_or(DEFAULT_RPC);
        ProviderConfig::Http(url.to_string())
    }

    #[cfg(unix)]
    fn ipc_endpoint(&self) -> Option<ProviderConfig> {
        non_empty(&self.ipc).map(|path| ProviderConfig::Ipc(PathBuf::from(path)))
    }

    #[cfg(not(unix))]
    fn ipc_endpoint(&self) -> Option<ProviderConfig> {
        None
    }

    pub fn session_settings(&self) -> Result<SessionSettings> {
        let bank_address = parse_address(non_empty(&self.bank_address).unwrap_or(DEFAULT_BANK_ADDRESS))
            .context("Invalid bank_address")?;
        let base = non_empty(&self.abi_base_url).unwrap_or(DEFAULT_ABI_BASE_URL);

        let bank_abi = non_empty(&self.bank_abi)
            .map(AbiSource::parse)
            .unwrap_or_else(|| AbiSource::under(base, BANK_ABI_FILE));
        let token_abi = non_empty(&self.token_abi)
            .map(AbiSource::parse)
            .unwrap_or_else(|| AbiSource::under(base, TOKEN_ABI_FILE));

        Ok(SessionSettings {
            bank_address,
            bank_abi,
            token_abi,
            abi_timeout: Duration::from_secs(
                self.abi_timeout_secs.unwrap_or(DEFAULT_ABI_TIMEOUT_SECS),
            ),
        })
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match parse(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring invalid config file");
            Config::default()
        }
    }
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("HARDCORE_BRIDGE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("hardcore-bridge").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("hardcore-bridge").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "hardcore", "hardcore-bridge")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Parse a hex address regardless of case or checksum.
pub fn parse_address(address: &str) -> Result<Address> {
    let normalized = normalize_address(address);
    normalized
        .parse::<Address>()
        .with_context(|| format!("not an address: {}", address.trim()))
}

fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

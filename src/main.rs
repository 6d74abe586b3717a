use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hardcore_bridge::config::{self, Config};
use hardcore_bridge::domain::InboundPort;
use hardcore_bridge::infrastructure::{RuntimeBridge, RuntimeCommand};

#[derive(Debug, Parser)]
#[command(
    name = "hardcore-bridge",
    version,
    about = "Relays HardcoreBank port messages (JSON lines on stdin/stdout) to an Ethereum node"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// HardcoreBank deployment address
    #[arg(long)]
    bank_address: Option<String>,

    /// URL or directory serving HardcoreBank.json and ERC777.json
    #[arg(long)]
    abi_base_url: Option<String>,

    /// Bank ABI location (URL or file), overrides --abi-base-url
    #[arg(long)]
    bank_abi: Option<String>,

    /// Token ABI location (URL or file), overrides --abi-base-url
    #[arg(long)]
    token_abi: Option<String>,
}

impl Args {
    /// CLI arguments take precedence over the config file
    fn apply(self, config: &mut Config) {
        if let Some(ipc) = self.ipc {
            config.ipc = Some(ipc.to_string_lossy().to_string());
            config.ws = None;
        } else if let Some(ws) = self.ws {
            config.ipc = None;
            config.ws = Some(ws);
        } else if let Some(rpc) = self.rpc {
            config.ipc = None;
            config.ws = None;
            config.rpc = Some(rpc);
        }
        if self.bank_address.is_some() {
            config.bank_address = self.bank_address;
        }
        if self.abi_base_url.is_some() {
            config.abi_base_url = self.abi_base_url;
        }
        if self.bank_abi.is_some() {
            config.bank_abi = self.bank_abi;
        }
        if self.token_abi.is_some() {
            config.token_abi = self.token_abi;
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the outbound ports only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = config::load();
    args.apply(&mut config);

    let endpoint = config.endpoint();
    let settings = config.session_settings()?;
    info!(
        endpoint = %endpoint.display(),
        bank = %settings.bank_address,
        bank_abi = %settings.bank_abi,
        token_abi = %settings.token_abi,
        "starting bridge"
    );

    let mut bridge = RuntimeBridge::new(endpoint, settings)?;

    // Spawn inbound port reader
    let commands = bridge.sender();
    thread::Builder::new()
        .name("port-reader".to_string())
        .spawn(move || read_inbound(io::stdin().lock(), commands))
        .context("Failed to spawn port reader")?;

    let stdout = io::stdout();
    while let Some(event) = bridge.recv_blocking() {
        let line = event.to_json()?;
        let mut out = stdout.lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
    }

    bridge.shutdown()
}

/// Forward every well-formed inbound message; shut the worker down on EOF.
fn read_inbound(input: impl BufRead, commands: UnboundedSender<RuntimeCommand>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match InboundPort::from_json(&line) {
            Ok(port) => {
                if commands.send(RuntimeCommand::Port(port)).is_err() {
                    return;
                }
            }
            Err(err) => warn!(error = %err, "ignoring malformed port message"),
        }
    }

    let _ = commands.send(RuntimeCommand::Shutdown);
}

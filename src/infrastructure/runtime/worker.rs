//! Async worker - runs in Tokio runtime and relays port requests

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::domain::OutboundPort;
use crate::infrastructure::ethereum::{create_provider, EthereumProvider, ProviderConfig};
use crate::infrastructure::runtime::bridge::RuntimeCommand;
use crate::infrastructure::runtime::relay::PortRelay;
use crate::infrastructure::runtime::session::SessionSettings;

/// Connect to `endpoint` and run the relay loop.
pub async fn run_async_worker(
    endpoint: ProviderConfig,
    settings: SessionSettings,
    cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: UnboundedSender<OutboundPort>,
) -> Result<()> {
    let provider = create_provider(endpoint.clone())
        .await
        .with_context(|| format!("Connection failed ({})", endpoint.display()))?;

    run_relay(Arc::from(provider), settings, cmd_rx, evt_tx).await
}

/// Initialize the session, then relay commands until shutdown.
///
/// Commands sent before the session is ready stay queued in the channel.
/// Each request runs as its own task; on shutdown in-flight requests are
/// allowed to finish.
pub async fn run_relay(
    provider: Arc<dyn EthereumProvider>,
    settings: SessionSettings,
    mut cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: UnboundedSender<OutboundPort>,
) -> Result<()> {
    let relay = Arc::new(PortRelay::new(provider, settings, evt_tx)?);

    if let Err(err) = relay.initialize().await {
        error!(error = %err, "initialization failed, bridge will not become ready");
        return Err(err.into());
    }

    let mut tasks = JoinSet::new();

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            RuntimeCommand::Shutdown => break,
            RuntimeCommand::Port(port) => {
                let relay = Arc::clone(&relay);
                tasks.spawn(async move { relay.handle(port).await });
            }
        }

        while let Some(finished) = tasks.try_join_next() {
            if let Err(err) = finished {
                error!(error = %err, "relay task failed");
            }
        }
    }

    let in_flight = tasks.len();
    if in_flight > 0 {
        info!(in_flight, "waiting for in-flight requests");
    }
    while let Some(finished) = tasks.join_next().await {
        if let Err(err) = finished {
            error!(error = %err, "relay task failed");
        }
    }

    info!("worker stopped");
    Ok(())
}

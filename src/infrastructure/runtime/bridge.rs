//! Runtime bridge - connects a synchronous frontend with the async Tokio runtime
//!
//! The frontend pushes inbound port messages as commands and drains outbound
//! port messages as events; all RPC work happens on a dedicated worker thread
//! that owns its own runtime.

use std::future::Future;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::{InboundPort, OutboundPort};
use crate::infrastructure::ethereum::{EthereumProvider, ProviderConfig};
use crate::infrastructure::runtime::session::SessionSettings;
use crate::infrastructure::runtime::worker::{run_async_worker, run_relay};

/// Commands sent from the frontend to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// An inbound port message
    Port(InboundPort),
    /// Stop reading commands and finish in-flight requests
    Shutdown,
}

/// Bridge between the sync frontend thread and the async worker
pub struct RuntimeBridge {
    cmd_tx: UnboundedSender<RuntimeCommand>,
    evt_rx: UnboundedReceiver<OutboundPort>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl RuntimeBridge {
    /// Connect to `endpoint` on a new worker thread
    pub fn new(endpoint: ProviderConfig, settings: SessionSettings) -> Result<Self> {
        Self::spawn(move |cmd_rx, evt_tx| run_async_worker(endpoint, settings, cmd_rx, evt_tx))
    }

    /// Run against an already constructed provider
    pub fn with_provider(
        provider: Arc<dyn EthereumProvider>,
        settings: SessionSettings,
    ) -> Result<Self> {
        Self::spawn(move |cmd_rx, evt_tx| run_relay(provider, settings, cmd_rx, evt_tx))
    }

    fn spawn<F, Fut>(worker: F) -> Result<Self>
    where
        F: FnOnce(UnboundedReceiver<RuntimeCommand>, UnboundedSender<OutboundPort>) -> Fut
            + Send
            + 'static,
        Fut: Future<Output = Result<()>>,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::unbounded_channel::<OutboundPort>();

        let handle = thread::Builder::new()
            .name("bridge-worker".to_string())
            .spawn(move || -> Result<()> {
                let rt = Runtime::new()?;
                rt.block_on(worker(cmd_rx, evt_tx))
            })?;

        Ok(Self {
            cmd_tx,
            evt_rx,
            worker: Some(handle),
        })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow!("Worker channel closed"))
    }

    /// Send an inbound port message
    pub fn submit(&self, port: InboundPort) -> Result<()> {
        self.send(RuntimeCommand::Port(port))
    }

    /// A command handle usable from other threads
    pub fn sender(&self) -> UnboundedSender<RuntimeCommand> {
        self.cmd_tx.clone()
    }

    /// Wait for the next event. `None` once the worker has exited.
    ///
    /// Must not be called from inside an async context.
    pub fn recv_blocking(&mut self) -> Option<OutboundPort> {
        self.evt_rx.blocking_recv()
    }

    /// Stop the worker and wait for it, returning its exit status
    pub fn shutdown(mut self) -> Result<()> {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("Worker thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

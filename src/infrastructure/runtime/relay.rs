//! Port relay - turns inbound port requests into contract calls

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::domain::{InboundPort, OutboundPort};
use crate::error::BridgeResult;
use crate::infrastructure::abi::AbiLoader;
use crate::infrastructure::ethereum::{EthereumProvider, TransactionOutcome};
use crate::infrastructure::runtime::session::{Session, SessionSettings};

/// Owns the session cell and the outbound port.
///
/// The session is created at most once; the initial account list is published
/// only by the initialization that created it.
pub struct PortRelay {
    provider: Arc<dyn EthereumProvider>,
    settings: SessionSettings,
    loader: AbiLoader,
    session: OnceCell<Arc<Session>>,
    outbound: UnboundedSender<OutboundPort>,
}

impl PortRelay {
    pub fn new(
        provider: Arc<dyn EthereumProvider>,
        settings: SessionSettings,
        outbound: UnboundedSender<OutboundPort>,
    ) -> BridgeResult<Self> {
        let loader = AbiLoader::new(settings.abi_timeout)?;
        Ok(Self {
            provider,
            settings,
            loader,
            session: OnceCell::new(),
            outbound,
        })
    }

    /// Initialize the session, or return the existing one.
    pub async fn initialize(&self) -> BridgeResult<Arc<Session>> {
        let session = self.session.get_or_try_init(|| self.open_session()).await?;
        Ok(Arc::clone(session))
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.get().cloned()
    }

    async fn open_session(&self) -> BridgeResult<Arc<Session>> {
        let session = Session::initialize(Arc::clone(&self.provider), &self.settings, &self.loader)
            .await
            .map(Arc::new)?;
        self.publish_accounts(&session).await;
        Ok(session)
    }

    /// Relay one request. Requests arriving before the session is ready wait
    /// for initialization.
    pub async fn handle(&self, port: InboundPort) {
        let name = port.name();
        let session = match self.initialize().await {
            Ok(session) => session,
            Err(err) => {
                error!(port = name, error = %err, "session unavailable, request dropped");
                return;
            }
        };
        debug!(port = name, "relaying request");

        match port {
            InboundPort::CreateAccount(request) => {
                let ok = succeeded(name, session.create_account(&request).await);
                self.publish(OutboundPort::Created(ok));
            }
            InboundPort::GetAccounts => self.publish_accounts(&session).await,
            InboundPort::GetTokenBalance(token) => match session.token_balance(token).await {
                Ok(balance) => self.publish(OutboundPort::GotTokenBalance(balance)),
                Err(err) => error!(port = name, token = %token, error = %err, "balance lookup failed"),
            },
            InboundPort::Deposit(request) => {
                let ok = succeeded(name, session.deposit(&request).await);
                self.publish(OutboundPort::DepositDone(ok));
            }
            InboundPort::Withdraw(id) => {
                let ok = succeeded(name, session.withdraw(id).await);
                self.publish(OutboundPort::WithdrawDone(ok));
            }
        }
    }

    async fn publish_accounts(&self, session: &Session) {
        match session.list_accounts().await {
            Ok(accounts) => {
                info!(count = accounts.len(), "publishing accounts");
                self.publish(OutboundPort::GotAccounts(accounts));
            }
            Err(err) => error!(error = %err, "account listing failed"),
        }
    }

    fn publish(&self, port: OutboundPort) {
        let name = port.name();
        if self.outbound.send(port).is_err() {
            warn!(port = name, "frontend disconnected, reply dropped");
        }
    }
}

/// Collapse a transaction result into the frontend's boolean signal.
fn succeeded(port: &str, result: BridgeResult<TransactionOutcome>) -> bool {
    match result {
        Ok(outcome) if outcome.success => {
            info!(port, tx = %outcome.tx_hash, "transaction succeeded");
            true
        }
        Ok(outcome) => {
            warn!(port, tx = %outcome.tx_hash, "transaction reverted");
            false
        }
        Err(err) => {
            warn!(port, error = %err, "transaction rejected");
            false
        }
    }
}

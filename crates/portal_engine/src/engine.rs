use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use portal_logging::{portal_debug, portal_error, portal_info, portal_warn};

use crate::program::PortalLedger;
use crate::wallet::{ConnectOptions, WalletError, WalletProvider};
use crate::{EngineEvent, LedgerError, RequestId};

enum EngineCommand {
    AutoConnect,
    Connect,
    Submit { request_id: RequestId, link: String },
    Initialize { request_id: RequestId },
    Refresh { request_id: RequestId },
}

/// Collaborators the engine works against for one session.
#[derive(Clone)]
pub struct EngineSession {
    /// `None` when no wallet provider is present.
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub ledger: Arc<dyn PortalLedger>,
}

/// Handle for issuing commands; events come back through [`EngineEvents`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts the engine thread with its own async runtime.
    ///
    /// Every command runs as an independent task; nothing is retried and a
    /// command cannot be cancelled once issued.
    pub fn spawn(session: EngineSession) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    portal_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let session = session.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(&session, command).await;
                    let _ = event_tx.send(event);
                });
            }
            portal_debug!("Engine command channel closed");
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn auto_connect(&self) {
        self.send(EngineCommand::AutoConnect);
    }

    pub fn connect(&self) {
        self.send(EngineCommand::Connect);
    }

    pub fn submit(&self, request_id: RequestId, link: impl Into<String>) {
        self.send(EngineCommand::Submit {
            request_id,
            link: link.into(),
        });
    }

    pub fn initialize(&self, request_id: RequestId) {
        self.send(EngineCommand::Initialize { request_id });
    }

    pub fn refresh(&self, request_id: RequestId) {
        self.send(EngineCommand::Refresh { request_id });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            portal_error!("Engine is not running; command dropped");
        }
    }
}

impl EngineEvents {
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(session: &EngineSession, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::AutoConnect => {
            let Some(wallet) = session.wallet.as_deref() else {
                return EngineEvent::ProviderMissing;
            };
            if !wallet.is_recognized() {
                portal_info!("Wallet provider {} is not recognized", wallet.name());
                return EngineEvent::ProviderUnrecognized {
                    name: wallet.name().to_string(),
                };
            }
            connect(wallet, false).await
        }
        EngineCommand::Connect => match session.wallet.as_deref() {
            Some(wallet) => connect(wallet, true).await,
            None => EngineEvent::ProviderMissing,
        },
        EngineCommand::Submit { request_id, link } => {
            let result = match session.wallet.as_deref() {
                Some(wallet) => session.ledger.append_entry(wallet, &link).await,
                None => Err(LedgerError::Wallet(WalletError::NotConnected)),
            };
            if let Err(err) = &result {
                portal_warn!("Submission #{} failed: {}", request_id, err);
            }
            EngineEvent::SubmitCompleted { request_id, result }
        }
        EngineCommand::Initialize { request_id } => {
            let result = match session.wallet.as_deref() {
                Some(wallet) => session.ledger.initialize_list(wallet).await,
                None => Err(LedgerError::Wallet(WalletError::NotConnected)),
            };
            EngineEvent::InitializeCompleted { request_id, result }
        }
        EngineCommand::Refresh { request_id } => EngineEvent::ListFetched {
            request_id,
            result: session.ledger.fetch_list().await,
        },
    }
}

async fn connect(wallet: &dyn WalletProvider, explicit: bool) -> EngineEvent {
    let options = ConnectOptions {
        only_if_trusted: !explicit,
    };
    match wallet.connect(options).await {
        Ok(address) => EngineEvent::Connected { address },
        Err(error) => EngineEvent::ConnectFailed { explicit, error },
    }
}

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use portal_logging::{portal_debug, portal_info};
use thiserror::Error;

use crate::keypair::{read_keypair_file, Keypair, KeypairError};
use crate::{Address, Signature};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only succeed if the wallet already trusts this app; never prompt.
    pub only_if_trusted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet has not approved this app yet")]
    NotTrusted,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("user rejected the request")]
    Rejected,
    #[error("wallet error: {0}")]
    Other(String),
}

/// Agent holding the user's keys and authorizing transactions on request.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider carries the marker of a supported wallet.
    fn is_recognized(&self) -> bool;

    async fn connect(&self, options: ConnectOptions) -> Result<Address, WalletError>;

    fn connected_address(&self) -> Option<Address>;

    /// Signs a serialized transaction message with the connected key.
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}

/// Wallet backed by a local keypair file.
///
/// `trusted` stands in for the extension's list of approved sites: while it is
/// false, trusted-only connections are declined. An explicit connection
/// approves the app for the rest of the session.
pub struct KeypairWallet {
    keypair: Keypair,
    trusted: AtomicBool,
    connected: AtomicBool,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair, trusted: bool) -> Self {
        Self {
            keypair,
            trusted: AtomicBool::new(trusted),
            connected: AtomicBool::new(false),
        }
    }

    pub fn load(path: &Path, trusted: bool) -> Result<Self, KeypairError> {
        Ok(Self::new(read_keypair_file(path)?, trusted))
    }
}

#[async_trait::async_trait]
impl WalletProvider for KeypairWallet {
    fn name(&self) -> &str {
        "keypair"
    }

    fn is_recognized(&self) -> bool {
        true
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Address, WalletError> {
        if options.only_if_trusted && !self.trusted.load(Ordering::Acquire) {
            return Err(WalletError::NotTrusted);
        }
        self.trusted.store(true, Ordering::Release);
        self.connected.store(true, Ordering::Release);
        Ok(self.keypair.address())
    }

    fn connected_address(&self) -> Option<Address> {
        self.connected
            .load(Ordering::Acquire)
            .then(|| self.keypair.address())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(WalletError::NotConnected);
        }
        Ok(self.keypair.sign(message))
    }
}

/// Looks for the wallet keypair. A missing file means no provider is present.
pub fn detect_wallet(
    path: &Path,
    trusted: bool,
) -> Result<Option<Arc<dyn WalletProvider>>, KeypairError> {
    if !path.exists() {
        portal_debug!("No wallet keypair at {}", path.display());
        return Ok(None);
    }
    let wallet = KeypairWallet::load(path, trusted)?;
    portal_info!("Wallet provider found at {}", path.display());
    Ok(Some(Arc::new(wallet)))
}

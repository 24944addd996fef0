use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::codec::ListAccount;
use crate::wallet::WalletError;

pub type RequestId = u64;

/// 32-byte ed25519 public key identifying an account or program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

/// Owner of freshly created accounts; all zero bytes.
pub const SYSTEM_PROGRAM_ID: Address = Address([0u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

/// 64-byte ed25519 signature. The first signature of a transaction is its id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<64>(s).map(Self)
    }
}

/// Recent blockhash a message is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid base58: {0}")]
    Base58(String),
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let bytes = bs58::decode(s.trim())
        .into_vec()
        .map_err(|err| ParseError::Base58(err.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ParseError::Length { expected: N, actual })
}

#[derive(Debug)]
pub enum EngineEvent {
    /// No wallet provider is available at all.
    ProviderMissing,
    /// A provider exists but does not carry the recognized marker.
    ProviderUnrecognized { name: String },
    Connected {
        address: Address,
    },
    ConnectFailed {
        explicit: bool,
        error: WalletError,
    },
    SubmitCompleted {
        request_id: RequestId,
        result: Result<Signature, LedgerError>,
    },
    InitializeCompleted {
        request_id: RequestId,
        result: Result<Signature, LedgerError>,
    },
    ListFetched {
        request_id: RequestId,
        result: Result<ListAccount, LedgerError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid rpc endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("rpc transport error: {0}")]
    Transport(String),
    #[error("rpc request timed out")]
    Timeout,
    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        logs: Vec<String>,
    },
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),
    #[error("account {0} not found")]
    AccountNotFound(Address),
    #[error("account {address} is owned by {owner}, expected {expected}")]
    WrongOwner {
        address: Address,
        owner: Address,
        expected: Address,
    },
    #[error("account data invalid: {0}")]
    InvalidAccountData(String),
    #[error("instruction encoding failed: {0}")]
    Encoding(String),
    #[error("list account {0} already exists")]
    AccountAlreadyExists(Address),
    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },
    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(Signature),
    #[error("no signer available for {0}")]
    MissingSigner(Address),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl LedgerError {
    /// True when the ledger reports that the account to create is already in use.
    pub fn is_already_in_use(&self) -> bool {
        const MARKER: &str = "already in use";
        match self {
            LedgerError::AccountAlreadyExists(_) => true,
            LedgerError::Rpc { message, logs, .. } => {
                message.contains(MARKER) || logs.iter().any(|line| line.contains(MARKER))
            }
            // System program error 0 is `AccountAlreadyInUse`.
            LedgerError::TransactionFailed { reason, .. } => reason.contains("{\"Custom\":0}"),
            _ => false,
        }
    }
}

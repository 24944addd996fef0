use crate::{Entry, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front end finished starting up.
    PageLoaded,
    /// The wallet provider could not be found.
    WalletMissing,
    /// User clicked Connect.
    ConnectClicked,
    /// Wallet approved a connection.
    WalletConnected { address: String },
    /// Wallet refused or failed a connection request.
    ConnectFailed { explicit: bool, reason: String },
    /// User edited the link input box.
    InputChanged(String),
    /// User submitted the current draft.
    SubmitClicked,
    /// Engine finished a submission; `Ok` carries the transaction signature.
    SubmitCompleted {
        request_id: RequestId,
        result: Result<String, String>,
    },
    /// User clicked the one-time initialization button.
    InitializeClicked,
    /// Engine finished account initialization.
    InitializeCompleted {
        request_id: RequestId,
        result: Result<String, String>,
    },
    /// Engine finished reading the list account.
    ListFetched {
        request_id: RequestId,
        result: Result<Vec<Entry>, ListFetchFailure>,
        fetched_at: Option<String>,
    },
    /// UI/render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Why a list read did not produce entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFetchFailure {
    /// The list account has not been created yet.
    AccountMissing,
    /// Anything else: transport, decoding, wrong owner.
    Other(String),
}

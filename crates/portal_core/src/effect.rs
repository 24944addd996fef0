use crate::RequestId;

/// Work the runtime must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Probe for a wallet provider and request a trusted-only connection.
    AutoConnect,
    /// User-initiated wallet connection.
    Connect,
    /// Append one link to the list account and await confirmation.
    SubmitEntry { request_id: RequestId, link: String },
    /// Create and initialize the list account.
    InitializeAccount { request_id: RequestId },
    /// Read the list account back from the ledger.
    RefreshList { request_id: RequestId },
}

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use portal_logging::{portal_debug, portal_trace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{Address, Blockhash, LedgerError, Signature};

/// Confirmation-finality tier at which effects are considered visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Fastest acknowledgement, least final.
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network endpoint the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
    Custom(String),
}

impl Cluster {
    pub fn url(&self) -> &str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
            Cluster::Custom(url) => url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcSettings {
    pub commitment: Commitment,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound on waiting for a sent transaction to reach `commitment`.
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            commitment: Commitment::Processed,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Status entry returned by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub owner: Address,
    pub data: Vec<u8>,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Deserialize)]
struct RawAccount {
    owner: String,
    data: (String, String),
}

/// Minimal JSON-RPC 2.0 client for the ledger's HTTP endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    settings: RpcSettings,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: &str, settings: RpcSettings) -> Result<Self, LedgerError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| LedgerError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(LedgerError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                endpoint.scheme()
            )));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| LedgerError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            settings,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn commitment(&self) -> Commitment {
        self.settings.commitment
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        portal_trace!("rpc -> {} #{}", method, id);

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!("http status {status}")));
        }
        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|err| LedgerError::MalformedResponse(format!("{method}: {err}")))?;

        if let Some(error) = parsed.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
                logs: error.data.as_ref().map(simulation_logs).unwrap_or_default(),
            });
        }
        parsed
            .result
            .ok_or_else(|| LedgerError::MalformedResponse(format!("{method}: missing result")))
    }

    pub async fn get_latest_blockhash(&self) -> Result<Blockhash, LedgerError> {
        let response: WithContext<BlockhashValue> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.settings.commitment }]),
            )
            .await?;
        response
            .value
            .blockhash
            .parse()
            .map_err(|err| LedgerError::MalformedResponse(format!("blockhash: {err}")))
    }

    /// Submits a signed wire transaction and returns the signature the node reports.
    pub async fn send_transaction(&self, wire: &[u8]) -> Result<String, LedgerError> {
        self.call(
            "sendTransaction",
            json!([
                BASE64.encode(wire),
                {
                    "encoding": "base64",
                    "preflightCommitment": self.settings.commitment,
                }
            ]),
        )
        .await
    }

    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(response.value.into_iter().next().flatten())
    }

    /// Polls until `signature` reaches the configured commitment, fails, or
    /// the confirmation timeout elapses.
    pub async fn confirm_transaction(&self, signature: &Signature) -> Result<(), LedgerError> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(status) = self.get_signature_status(signature).await? {
                if let Some(err) = status.err {
                    return Err(LedgerError::TransactionFailed {
                        signature: *signature,
                        reason: err.to_string(),
                    });
                }
                if status
                    .confirmation_status
                    .is_some_and(|reached| reached >= self.settings.commitment)
                {
                    portal_debug!(
                        "Transaction {} reached {} at slot {}",
                        signature,
                        self.settings.commitment,
                        status.slot
                    );
                    return Ok(());
                }
            }
            if started.elapsed() >= self.settings.confirm_timeout {
                return Err(LedgerError::ConfirmationTimeout(*signature));
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Fetches an account; `None` when it does not exist.
    pub async fn get_account_info(
        &self,
        address: &Address,
    ) -> Result<Option<AccountInfo>, LedgerError> {
        let response: WithContext<Option<RawAccount>> = self
            .call(
                "getAccountInfo",
                json!([
                    address.to_string(),
                    { "encoding": "base64", "commitment": self.settings.commitment }
                ]),
            )
            .await?;
        let Some(raw) = response.value else {
            return Ok(None);
        };

        let (encoded, encoding) = raw.data;
        if encoding != "base64" {
            return Err(LedgerError::MalformedResponse(format!(
                "unexpected account encoding {encoding}"
            )));
        }
        let data = BASE64
            .decode(encoded.as_bytes())
            .map_err(|err| LedgerError::MalformedResponse(format!("account data: {err}")))?;
        let owner = raw
            .owner
            .parse()
            .map_err(|err| LedgerError::MalformedResponse(format!("account owner: {err}")))?;
        Ok(Some(AccountInfo { owner, data }))
    }
}

fn simulation_logs(data: &Value) -> Vec<String> {
    data.get("logs")
        .and_then(Value::as_array)
        .map(|logs| {
            logs.iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn map_reqwest_error(err: reqwest::Error) -> LedgerError {
    if err.is_timeout() {
        return LedgerError::Timeout;
    }
    LedgerError::Transport(err.to_string())
}

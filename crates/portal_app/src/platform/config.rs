use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use portal_engine::{
    detect_wallet, program_id_from_idl, read_keypair_file, Address, AtomicFileWriter, Cluster,
    Commitment, EngineSession, IdlError, KeypairError, LedgerError, ParseError, PersistError,
    RpcClient, RpcPortalLedger, RpcSettings,
};
use portal_logging::{portal_info, portal_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "portal.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("failed to write config: {0}")]
    Persist(#[from] PersistError),
    #[error("program id: {0}")]
    ProgramId(#[from] ParseError),
    #[error("program IDL: {0}")]
    Idl(#[from] IdlError),
    #[error("keypair: {0}")]
    Keypair(#[from] KeypairError),
    #[error("rpc endpoint: {0}")]
    Endpoint(#[from] LedgerError),
}

/// Where the deployed program id comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramSource {
    /// Base58 program id.
    Id(String),
    /// IDL document carrying `metadata.address`.
    Idl(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcTimeouts {
    pub request_timeout_ms: u64,
    pub confirm_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        let settings = RpcSettings::default();
        Self {
            request_timeout_ms: millis(settings.request_timeout),
            confirm_timeout_ms: millis(settings.confirm_timeout),
            poll_interval_ms: millis(settings.poll_interval),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub cluster: Cluster,
    pub commitment: Commitment,
    pub program: ProgramSource,
    /// Keypair of the shared list account.
    pub list_account_keypair: PathBuf,
    /// Keypair standing in for the wallet provider; absent file means no provider.
    pub wallet_keypair: PathBuf,
    /// Whether the wallet has already approved this front end.
    pub wallet_trusted: bool,
    pub rpc: RpcTimeouts,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            commitment: Commitment::Processed,
            program: ProgramSource::Idl(PathBuf::from("idl.json")),
            list_account_keypair: PathBuf::from("keypair.json"),
            wallet_keypair: PathBuf::from("wallet.json"),
            wallet_trusted: false,
            rpc: RpcTimeouts::default(),
        }
    }
}

impl PortalConfig {
    pub fn rpc_settings(&self) -> RpcSettings {
        RpcSettings {
            commitment: self.commitment,
            request_timeout: Duration::from_millis(self.rpc.request_timeout_ms),
            confirm_timeout: Duration::from_millis(self.rpc.confirm_timeout_ms),
            poll_interval: Duration::from_millis(self.rpc.poll_interval_ms),
            ..RpcSettings::default()
        }
    }

    pub fn program_id(&self) -> Result<Address, ConfigError> {
        match &self.program {
            ProgramSource::Id(id) => Ok(id.parse()?),
            ProgramSource::Idl(path) => Ok(program_id_from_idl(path)?),
        }
    }

    /// Makes relative paths relative to `base` instead of the working directory.
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.list_account_keypair);
        resolve(&mut self.wallet_keypair);
        if let ProgramSource::Idl(path) = &mut self.program {
            resolve(path);
        }
    }
}

/// Loads the config at `path`; a missing file yields defaults.
pub fn load_config(path: &Path) -> Result<PortalConfig, ConfigError> {
    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut config = match fs::read_to_string(path) {
        Ok(text) => ron::from_str::<PortalConfig>(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            portal_warn!("No config at {:?}; using defaults", path);
            PortalConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    config.resolve_paths(&base);
    portal_info!("Loaded config for cluster {}", config.cluster.url());
    Ok(config)
}

pub fn save_config(path: &Path, config: &PortalConfig, overwrite: bool) -> Result<PathBuf, ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)
        .map_err(|err| ConfigError::Serialize(err.to_string()))?;
    let mut writer = AtomicFileWriter::new(path);
    if !overwrite {
        writer = writer.no_overwrite();
    }
    Ok(writer.write(content.as_bytes())?)
}

/// Wires the RPC client, list program and wallet described by `config`.
pub fn build_session(config: &PortalConfig) -> Result<EngineSession, ConfigError> {
    let rpc = RpcClient::new(config.cluster.url(), config.rpc_settings())?;
    let program_id = config.program_id()?;
    let list_account = read_keypair_file(&config.list_account_keypair)?;
    portal_info!(
        "Program {} with list account {}",
        program_id,
        list_account.address()
    );
    let wallet = detect_wallet(&config.wallet_keypair, config.wallet_trusted)?;
    Ok(EngineSession {
        wallet,
        ledger: Arc::new(RpcPortalLedger::new(rpc, program_id, list_account)),
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde::Deserialize;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::{Address, Signature};

const KEYPAIR_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum KeypairError {
    #[error("failed to read keypair file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("unrecognized keypair file format: {0}")]
    Format(String),
    #[error("invalid keypair bytes: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Ed25519 signing keypair.
pub struct Keypair(SigningKey);

impl Keypair {
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Builds a keypair from 64 bytes: 32 secret bytes followed by the public key.
    /// The public half must match the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let bytes: &[u8; KEYPAIR_LEN] = bytes.try_into().map_err(|_| {
            KeypairError::InvalidKey(format!("expected {KEYPAIR_LEN} bytes, got {}", bytes.len()))
        })?;
        SigningKey::from_keypair_bytes(bytes)
            .map(Self)
            .map_err(|err| KeypairError::InvalidKey(err.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; KEYPAIR_LEN] {
        self.0.to_keypair_bytes()
    }

    pub fn address(&self) -> Address {
        Address::new(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.0.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.address()).finish()
    }
}

/// On-disk shapes: the CLI's plain byte array, or the web3 object form with
/// index-keyed byte maps.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeypairFile {
    Bytes(Vec<u8>),
    Web3 {
        #[serde(rename = "_keypair")]
        keypair: Web3Keypair,
    },
}

#[derive(Deserialize)]
struct Web3Keypair {
    #[serde(rename = "secretKey")]
    secret_key: BTreeMap<String, u8>,
    #[serde(rename = "publicKey", default)]
    public_key: Option<BTreeMap<String, u8>>,
}

pub fn read_keypair_file(path: &Path) -> Result<Keypair, KeypairError> {
    let raw = fs::read_to_string(path).map_err(|source| KeypairError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_keypair(&raw)
}

pub fn parse_keypair(raw: &str) -> Result<Keypair, KeypairError> {
    let file: KeypairFile =
        serde_json::from_str(raw).map_err(|err| KeypairError::Format(err.to_string()))?;
    match file {
        KeypairFile::Bytes(bytes) => Keypair::from_bytes(&bytes),
        KeypairFile::Web3 { keypair } => {
            let secret = indexed_bytes(keypair.secret_key)?;
            let parsed = Keypair::from_bytes(&secret)?;
            if let Some(public) = keypair.public_key {
                let public = indexed_bytes(public)?;
                if public.as_slice() != parsed.address().as_bytes() {
                    return Err(KeypairError::InvalidKey(
                        "publicKey does not match secretKey".to_string(),
                    ));
                }
            }
            Ok(parsed)
        }
    }
}

/// Writes the keypair as a JSON byte array, readable by standard tooling.
pub fn write_keypair_file(
    path: &Path,
    keypair: &Keypair,
    overwrite: bool,
) -> Result<PathBuf, KeypairError> {
    let encoded = serde_json::to_string(&keypair.to_bytes().to_vec())
        .map_err(|err| KeypairError::Format(err.to_string()))?;
    let mut writer = AtomicFileWriter::new(path).private();
    if !overwrite {
        writer = writer.no_overwrite();
    }
    Ok(writer.write(encoded.as_bytes())?)
}

fn indexed_bytes(map: BTreeMap<String, u8>) -> Result<Vec<u8>, KeypairError> {
    let mut indexed = map
        .into_iter()
        .map(|(key, value)| {
            key.parse::<usize>()
                .map(|index| (index, value))
                .map_err(|_| KeypairError::Format(format!("non-numeric key {key:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(index, _)| *index);
    if indexed
        .iter()
        .enumerate()
        .any(|(position, (index, _))| position != *index)
    {
        return Err(KeypairError::Format("byte indices are not contiguous".into()));
    }
    Ok(indexed.into_iter().map(|(_, value)| value).collect())
}

use std::fs;
use std::path::{Path, PathBuf};

use portal_logging::{portal_debug, portal_info, portal_warn};
use serde::Deserialize;
use thiserror::Error;

use crate::codec::{self, ListAccount};
use crate::keypair::Keypair;
use crate::rpc::RpcClient;
use crate::transaction::{AccountMeta, Instruction, Message, Transaction};
use crate::wallet::{WalletError, WalletProvider};
use crate::{Address, LedgerError, Signature, SYSTEM_PROGRAM_ID};

/// Operations of the list program, as seen from the client.
#[async_trait::async_trait]
pub trait PortalLedger: Send + Sync {
    /// Address of the single shared list account.
    fn list_address(&self) -> Address;

    /// Creates and initializes the list account, paid for by `wallet`.
    async fn initialize_list(&self, wallet: &dyn WalletProvider) -> Result<Signature, LedgerError>;

    /// Appends `link` and waits until the transaction is confirmed.
    async fn append_entry(
        &self,
        wallet: &dyn WalletProvider,
        link: &str,
    ) -> Result<Signature, LedgerError>;

    async fn fetch_list(&self) -> Result<ListAccount, LedgerError>;
}

/// List program client over JSON-RPC.
///
/// The list account keypair is injected here and used both as the account's
/// address and as the new-account signer during initialization.
pub struct RpcPortalLedger {
    rpc: RpcClient,
    program_id: Address,
    list_account: Keypair,
}

impl RpcPortalLedger {
    pub fn new(rpc: RpcClient, program_id: Address, list_account: Keypair) -> Self {
        Self {
            rpc,
            program_id,
            list_account,
        }
    }

    pub fn program_id(&self) -> Address {
        self.program_id
    }

    pub fn initialize_instruction(&self, user: Address) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::writable(self.list_account.address(), true),
                AccountMeta::writable(user, true),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            ],
            data: codec::encode_initialize(),
        }
    }

    pub fn append_instruction(&self, user: Address, link: &str) -> Result<Instruction, LedgerError> {
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::writable(self.list_account.address(), false),
                AccountMeta::writable(user, true),
            ],
            data: codec::encode_append(link)?,
        })
    }

    /// Builds, signs, sends and confirms one transaction paid by the wallet.
    async fn send(
        &self,
        wallet: &dyn WalletProvider,
        instruction: Instruction,
    ) -> Result<Signature, LedgerError> {
        let payer = wallet
            .connected_address()
            .ok_or(LedgerError::Wallet(WalletError::NotConnected))?;
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let message = Message::new(&[instruction], payer, blockhash);
        let bytes = message.serialize();

        let mut signatures = Vec::with_capacity(message.signer_keys().len());
        for key in message.signer_keys() {
            if *key == payer {
                signatures.push(wallet.sign_message(&bytes).await?);
            } else if *key == self.list_account.address() {
                signatures.push(self.list_account.sign(&bytes));
            } else {
                return Err(LedgerError::MissingSigner(*key));
            }
        }

        let transaction = Transaction {
            signatures,
            message,
        };
        let signature = transaction
            .id()
            .ok_or(LedgerError::MissingSigner(payer))?;
        let reported = self.rpc.send_transaction(&transaction.serialize()).await?;
        if reported != signature.to_string() {
            portal_warn!(
                "Node reported signature {} for transaction {}",
                reported,
                signature
            );
        }
        portal_debug!("Sent transaction {}, awaiting {}", signature, self.rpc.commitment());
        self.rpc.confirm_transaction(&signature).await?;
        Ok(signature)
    }
}

#[async_trait::async_trait]
impl PortalLedger for RpcPortalLedger {
    fn list_address(&self) -> Address {
        self.list_account.address()
    }

    async fn initialize_list(&self, wallet: &dyn WalletProvider) -> Result<Signature, LedgerError> {
        let user = wallet
            .connected_address()
            .ok_or(LedgerError::Wallet(WalletError::NotConnected))?;
        let list = self.list_account.address();
        let result = self.send(wallet, self.initialize_instruction(user)).await;
        match result {
            Ok(signature) => {
                portal_info!("Created list account {}", list);
                Ok(signature)
            }
            Err(err) if err.is_already_in_use() => Err(LedgerError::AccountAlreadyExists(list)),
            Err(err) => Err(err),
        }
    }

    async fn append_entry(
        &self,
        wallet: &dyn WalletProvider,
        link: &str,
    ) -> Result<Signature, LedgerError> {
        let user = wallet
            .connected_address()
            .ok_or(LedgerError::Wallet(WalletError::NotConnected))?;
        let instruction = self.append_instruction(user, link)?;
        self.send(wallet, instruction).await
    }

    async fn fetch_list(&self) -> Result<ListAccount, LedgerError> {
        let address = self.list_account.address();
        let account = self
            .rpc
            .get_account_info(&address)
            .await?
            .ok_or(LedgerError::AccountNotFound(address))?;
        if account.owner != self.program_id {
            return Err(LedgerError::WrongOwner {
                address,
                owner: account.owner,
                expected: self.program_id,
            });
        }
        codec::decode_list_account(&account.data)
    }
}

#[derive(Debug, Error)]
pub enum IdlError {
    #[error("failed to read IDL {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse IDL: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IDL has no metadata.address")]
    MissingAddress,
    #[error("IDL address is invalid: {0}")]
    InvalidAddress(#[from] crate::ParseError),
}

#[derive(Deserialize)]
struct IdlDocument {
    #[serde(default)]
    metadata: Option<IdlMetadata>,
    /// Newer IDLs carry the address at the top level.
    #[serde(default)]
    address: Option<String>,
}

#[derive(Deserialize)]
struct IdlMetadata {
    #[serde(default)]
    address: Option<String>,
}

/// Reads the deployed program id out of an interface-description document.
pub fn program_id_from_idl(path: &Path) -> Result<Address, IdlError> {
    let raw = fs::read_to_string(path).map_err(|source| IdlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let idl: IdlDocument = serde_json::from_str(&raw)?;
    let address = idl
        .metadata
        .and_then(|meta| meta.address)
        .or(idl.address)
        .ok_or(IdlError::MissingAddress)?;
    Ok(address.parse()?)
}

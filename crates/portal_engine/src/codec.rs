//! Instruction and account layouts of the list program.
//!
//! The program routes instructions and tags account types with an 8-byte
//! discriminator: the first bytes of `sha256("<namespace>:<name>")`. Arguments
//! and account bodies are borsh encoded after it.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::{Address, LedgerError};

pub const INITIALIZE_INSTRUCTION: &str = "start_stuff_off";
pub const APPEND_INSTRUCTION: &str = "add_gif";
pub const LIST_ACCOUNT_TYPE: &str = "BaseAccount";

const DISCRIMINATOR_LEN: usize = 8;

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", name)
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", name)
}

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// One stored link and the wallet that added it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifEntry {
    pub link: String,
    pub submitter: Address,
}

/// Decoded contents of the list account, in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListAccount {
    /// Counter kept by the program; normally equal to `entries.len()`.
    pub total: u64,
    pub entries: Vec<GifEntry>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StoredItem {
    gif_link: String,
    user_address: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StoredList {
    total_gifs: u64,
    gif_list: Vec<StoredItem>,
}

pub fn encode_initialize() -> Vec<u8> {
    instruction_discriminator(INITIALIZE_INSTRUCTION).to_vec()
}

pub fn encode_append(link: &str) -> Result<Vec<u8>, LedgerError> {
    let mut data = instruction_discriminator(APPEND_INSTRUCTION).to_vec();
    BorshSerialize::serialize(link, &mut data)
        .map_err(|err| LedgerError::Encoding(err.to_string()))?;
    Ok(data)
}

/// Decodes list account data. Bytes past the encoded list are ignored, since
/// the account is allocated with spare room.
pub fn decode_list_account(data: &[u8]) -> Result<ListAccount, LedgerError> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(LedgerError::InvalidAccountData(format!(
            "account data too short: {} bytes",
            data.len()
        )));
    }
    let (tag, mut body) = data.split_at(DISCRIMINATOR_LEN);
    if tag != account_discriminator(LIST_ACCOUNT_TYPE) {
        return Err(LedgerError::InvalidAccountData(
            "account discriminator mismatch".to_string(),
        ));
    }

    let stored = StoredList::deserialize(&mut body)
        .map_err(|err| LedgerError::InvalidAccountData(err.to_string()))?;
    Ok(ListAccount {
        total: stored.total_gifs,
        entries: stored
            .gif_list
            .into_iter()
            .map(|item| GifEntry {
                link: item.gif_link,
                submitter: Address::new(item.user_address),
            })
            .collect(),
    })
}

/// Encodes a list account the way the program stores it.
pub fn encode_list_account(account: &ListAccount) -> Result<Vec<u8>, LedgerError> {
    let stored = StoredList {
        total_gifs: account.total,
        gif_list: account
            .entries
            .iter()
            .map(|entry| StoredItem {
                gif_link: entry.link.clone(),
                user_address: entry.submitter.to_bytes(),
            })
            .collect(),
    };
    let mut data = account_discriminator(LIST_ACCOUNT_TYPE).to_vec();
    stored
        .serialize(&mut data)
        .map_err(|err| LedgerError::Encoding(err.to_string()))?;
    Ok(data)
}

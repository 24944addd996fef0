//! Legacy transaction wire format.
//!
//! Layout: `[sig count][signatures][message]`, where the message is
//! `[header][account keys][recent blockhash][instructions]` and every list is
//! prefixed with a compact-u16 length.

use crate::{Address, Blockhash, Signature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compiles instructions into a message paid for by `payer`.
    ///
    /// Keys are ordered writable signers, readonly signers, writable
    /// non-signers, readonly non-signers, with the payer always first.
    /// Messages are limited to 256 distinct keys.
    pub fn new(instructions: &[Instruction], payer: Address, recent_blockhash: Blockhash) -> Self {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::writable(payer, true)];
        let mut merge = |meta: AccountMeta| {
            if let Some(existing) = metas.iter_mut().find(|m| m.address == meta.address) {
                existing.is_signer |= meta.is_signer;
                existing.is_writable |= meta.is_writable;
            } else {
                metas.push(meta);
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                merge(meta.clone());
            }
            merge(AccountMeta::readonly(ix.program_id, false));
        }

        // Stable sort keeps first-seen order inside each class, payer included.
        metas.sort_by_key(|meta| match (meta.is_signer, meta.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        let count = |signer: bool, writable: bool| {
            metas
                .iter()
                .filter(|m| m.is_signer == signer && m.is_writable == writable)
                .count() as u8
        };
        let header = MessageHeader {
            num_required_signatures: metas.iter().filter(|m| m.is_signer).count() as u8,
            num_readonly_signed: count(true, false),
            num_readonly_unsigned: count(false, false),
        };
        let account_keys: Vec<Address> = metas.iter().map(|m| m.address).collect();
        let index_of = |address: &Address| {
            account_keys
                .iter()
                .position(|key| key == address)
                .unwrap_or_default() as u8
        };

        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.address)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        }
    }

    /// Keys whose signatures the transaction must carry, in signature order.
    pub fn signer_keys(&self) -> &[Address] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed);
        out.push(self.header.num_readonly_unsigned);

        append_shortvec(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        append_shortvec(&mut out, self.instructions.len());
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            append_shortvec(&mut out, ix.accounts.len());
            out.extend_from_slice(&ix.accounts);
            append_shortvec(&mut out, ix.data.len());
            out.extend_from_slice(&ix.data);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// The transaction id: its first signature.
    pub fn id(&self) -> Option<Signature> {
        self.signatures.first().copied()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut out = Vec::with_capacity(1 + self.signatures.len() * 64 + message.len());
        append_shortvec(&mut out, self.signatures.len());
        for signature in &self.signatures {
            out.extend_from_slice(signature.as_bytes());
        }
        out.extend_from_slice(&message);
        out
    }
}

/// Append a compact-u16 encoded value.
fn append_shortvec(buf: &mut Vec<u8>, mut value: usize) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

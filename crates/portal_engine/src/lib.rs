//! Portal engine: wallet, transaction and ledger plumbing plus effect execution.
mod codec;
mod engine;
mod keypair;
mod persist;
mod program;
mod rpc;
mod transaction;
mod types;
mod wallet;

pub use codec::{
    account_discriminator, decode_list_account, encode_list_account, instruction_discriminator,
    GifEntry, ListAccount, APPEND_INSTRUCTION, INITIALIZE_INSTRUCTION, LIST_ACCOUNT_TYPE,
};
pub use engine::{EngineEvents, EngineHandle, EngineSession};
pub use keypair::{parse_keypair, read_keypair_file, write_keypair_file, Keypair, KeypairError};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use program::{program_id_from_idl, IdlError, PortalLedger, RpcPortalLedger};
pub use rpc::{AccountInfo, Cluster, Commitment, RpcClient, RpcSettings, SignatureStatus};
pub use transaction::{AccountMeta, CompiledInstruction, Instruction, Message, MessageHeader, Transaction};
pub use types::{
    Address, Blockhash, EngineEvent, LedgerError, ParseError, RequestId, Signature,
    SYSTEM_PROGRAM_ID,
};
pub use wallet::{detect_wallet, ConnectOptions, KeypairWallet, WalletError, WalletProvider};

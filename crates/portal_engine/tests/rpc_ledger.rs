use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use portal_engine::{
    encode_list_account, instruction_discriminator, Address, ConnectOptions, GifEntry, Keypair,
    KeypairWallet, LedgerError, ListAccount, PortalLedger, RpcClient, RpcPortalLedger,
    RpcSettings, WalletProvider, INITIALIZE_INSTRUCTION,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROGRAM: Address = Address::new([3u8; 32]);

fn settings() -> RpcSettings {
    RpcSettings {
        confirm_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        ..RpcSettings::default()
    }
}

fn ledger(server: &MockServer) -> RpcPortalLedger {
    let rpc = RpcClient::new(&server.uri(), settings()).expect("rpc client");
    RpcPortalLedger::new(rpc, PROGRAM, Keypair::generate())
}

async fn connected_wallet() -> KeypairWallet {
    let wallet = KeypairWallet::new(Keypair::generate(), true);
    wallet
        .connect(ConnectOptions::default())
        .await
        .expect("connect");
    wallet
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn rpc_error(code: i64, message: &str, logs: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message, "data": { "logs": logs } }
    }))
}

async fn mount(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_account(server: &MockServer, owner: Address, data: &[u8]) {
    mount(
        server,
        "getAccountInfo",
        rpc_result(json!({
            "context": { "slot": 10 },
            "value": {
                "lamports": 1_000_000,
                "owner": owner.to_string(),
                "executable": false,
                "rentEpoch": 18446744073709551615u64,
                "data": [BASE64.encode(data), "base64"]
            }
        })),
    )
    .await;
}

async fn mount_send_path(server: &MockServer, status: Value) {
    mount(
        server,
        "getLatestBlockhash",
        rpc_result(json!({
            "context": { "slot": 10 },
            "value": {
                "blockhash": Address::new([7u8; 32]).to_string(),
                "lastValidBlockHeight": 200
            }
        })),
    )
    .await;
    mount(
        server,
        "sendTransaction",
        rpc_result(json!("5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW")),
    )
    .await;
    mount(
        server,
        "getSignatureStatuses",
        rpc_result(json!({ "context": { "slot": 11 }, "value": [status] })),
    )
    .await;
}

#[tokio::test]
async fn missing_account_is_reported_as_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        "getAccountInfo",
        rpc_result(json!({ "context": { "slot": 10 }, "value": null })),
    )
    .await;
    let ledger = ledger(&server);

    let err = ledger.fetch_list().await.unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(ledger.list_address()));
}

#[tokio::test]
async fn stored_entries_come_back_in_insertion_order() {
    let server = MockServer::start().await;
    let submitter = Address::new([1u8; 32]);
    let stored = ListAccount {
        total: 3,
        entries: ["b", "c", "a"]
            .iter()
            .map(|name| GifEntry {
                link: format!("https://x/{name}.gif"),
                submitter,
            })
            .collect(),
    };
    let mut data = encode_list_account(&stored).unwrap();
    data.resize(9000, 0);
    mount_account(&server, PROGRAM, &data).await;

    let fetched = ledger(&server).fetch_list().await.expect("fetch ok");
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn account_owned_by_another_program_is_rejected() {
    let server = MockServer::start().await;
    let data = encode_list_account(&ListAccount::default()).unwrap();
    mount_account(&server, Address::new([9u8; 32]), &data).await;

    let err = ledger(&server).fetch_list().await.unwrap_err();
    assert!(matches!(err, LedgerError::WrongOwner { .. }), "{err:?}");
}

#[tokio::test]
async fn append_sends_signed_transaction_and_waits_for_confirmation() {
    let server = MockServer::start().await;
    mount_send_path(
        &server,
        json!({ "slot": 11, "confirmations": 0, "err": null, "confirmationStatus": "processed" }),
    )
    .await;
    let ledger = ledger(&server);
    let wallet = connected_wallet().await;

    let signature = ledger
        .append_entry(&wallet, "https://x/a.gif")
        .await
        .expect("append ok");

    let requests = server.received_requests().await.expect("recording enabled");
    let bodies: Vec<Value> = requests
        .iter()
        .map(|req| req.body_json::<Value>().expect("json body"))
        .collect();
    let methods: Vec<&str> = bodies
        .iter()
        .map(|body| body["method"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        methods,
        vec!["getLatestBlockhash", "sendTransaction", "getSignatureStatuses"]
    );

    let send = &bodies[1];
    assert_eq!(send["params"][1]["preflightCommitment"], json!("processed"));
    let wire = BASE64
        .decode(send["params"][0].as_str().unwrap())
        .expect("base64 transaction");
    // One signature from the wallet, then the message.
    assert_eq!(wire[0], 1);
    assert_eq!(&wire[1..65], signature.as_bytes());
    assert_signed_by(
        wallet.connected_address().expect("connected"),
        &wire[1..65],
        &wire[65..],
    );
    assert!(wire
        .windows(b"https://x/a.gif".len())
        .any(|window| window == b"https://x/a.gif"));
    assert_eq!(
        bodies[2]["params"][0][0],
        json!(signature.to_string())
    );
}

#[tokio::test]
async fn failed_transaction_status_is_reported() {
    let server = MockServer::start().await;
    mount_send_path(
        &server,
        json!({
            "slot": 11,
            "confirmations": 0,
            "err": { "InstructionError": [0, { "Custom": 6000 }] },
            "confirmationStatus": "processed"
        }),
    )
    .await;
    let wallet = connected_wallet().await;

    let err = ledger(&server)
        .append_entry(&wallet, "https://x/a.gif")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::TransactionFailed { .. }), "{err:?}");
}

#[tokio::test]
async fn unconfirmed_transaction_times_out() {
    let server = MockServer::start().await;
    mount_send_path(&server, Value::Null).await;
    let wallet = connected_wallet().await;

    let err = ledger(&server)
        .append_entry(&wallet, "https://x/a.gif")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConfirmationTimeout(_)), "{err:?}");
}

/// Base64 transaction bytes from the recorded `sendTransaction` call.
async fn sent_transaction(server: &MockServer) -> Vec<u8> {
    let requests = server.received_requests().await.expect("recording enabled");
    let send = requests
        .iter()
        .map(|req| req.body_json::<Value>().expect("json body"))
        .find(|body| body["method"] == json!("sendTransaction"))
        .expect("sendTransaction request");
    BASE64
        .decode(send["params"][0].as_str().unwrap())
        .expect("base64 transaction")
}

fn assert_signed_by(signer: Address, signature: &[u8], message: &[u8]) {
    let key = VerifyingKey::from_bytes(signer.as_bytes()).expect("valid public key");
    let signature = Ed25519Signature::from_slice(signature).expect("64-byte signature");
    key.verify(message, &signature)
        .unwrap_or_else(|err| panic!("signature of {signer} does not verify: {err}"));
}

#[tokio::test]
async fn initialization_is_signed_by_payer_and_list_account() {
    let server = MockServer::start().await;
    mount_send_path(
        &server,
        json!({ "slot": 11, "confirmations": 0, "err": null, "confirmationStatus": "processed" }),
    )
    .await;
    let ledger = ledger(&server);
    let wallet = connected_wallet().await;
    let payer = wallet.connected_address().expect("connected");

    let signature = ledger.initialize_list(&wallet).await.expect("init ok");

    let wire = sent_transaction(&server).await;
    assert_eq!(wire[0], 2);
    let (signatures, message) = wire[1..].split_at(2 * 64);
    assert_eq!(&signatures[..64], signature.as_bytes());

    // Two signers, no read-only signers, system program and program read-only.
    assert_eq!(&message[..3], &[2, 0, 2]);
    assert_eq!(message[3], 4);
    assert_eq!(&message[4..36], payer.as_bytes());
    assert_eq!(&message[36..68], ledger.list_address().as_bytes());
    assert!(message.ends_with(&instruction_discriminator(INITIALIZE_INSTRUCTION)));

    assert_signed_by(payer, &signatures[..64], message);
    assert_signed_by(ledger.list_address(), &signatures[64..], message);
}

#[tokio::test]
async fn second_initialization_reports_already_exists() {
    let server = MockServer::start().await;
    mount(
        &server,
        "getLatestBlockhash",
        rpc_result(json!({
            "context": { "slot": 10 },
            "value": { "blockhash": Address::new([7u8; 32]).to_string(), "lastValidBlockHeight": 200 }
        })),
    )
    .await;
    mount(
        &server,
        "sendTransaction",
        rpc_error(
            -32002,
            "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x0",
            &[
                "Program 11111111111111111111111111111111 invoke [2]",
                "Allocate: account Address { address: 4Nd1m, base: None } already in use",
                "Program 11111111111111111111111111111111 failed: custom program error: 0x0",
            ],
        ),
    )
    .await;
    let ledger = ledger(&server);
    let wallet = connected_wallet().await;

    let err = ledger.initialize_list(&wallet).await.unwrap_err();
    assert_eq!(err, LedgerError::AccountAlreadyExists(ledger.list_address()));
}

#[tokio::test]
async fn disconnected_wallet_cannot_submit() {
    let server = MockServer::start().await;
    let wallet = KeypairWallet::new(Keypair::generate(), true);

    let err = ledger(&server)
        .append_entry(&wallet, "https://x/a.gif")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Wallet(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn http_failure_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = ledger(&server).fetch_list().await.unwrap_err();
    assert!(matches!(err, LedgerError::Transport(_)), "{err:?}");
}

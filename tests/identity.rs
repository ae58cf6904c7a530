#![cfg(not(target_arch = "wasm32"))]
use eosers::{
    middleware::schema::{IDENTITY_ACCOUNT, IDENTITY_ACTION},
    prelude::*,
    utils::{signing_digest, signing_hash},
};
use serde_json::json;

#[track_caller]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn identity_request(alice: PermissionLevel) -> Transaction<serde_json::Value> {
    Transaction::new(vec![Action::new(
        IDENTITY_ACCOUNT,
        IDENTITY_ACTION,
        vec![alice],
        json!({ "permission": { "actor": "alice", "permission": "active" } }),
    )])
    .expiration(TimePointSec::from_secs(1_600_000_000))
    .ref_block(0, 0)
}

#[tokio::test]
async fn identity_proof_is_signed_without_network() {
    init_tracing();
    let (provider, mock) = Provider::mocked();
    let wallet: LocalWallet = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3".parse().unwrap();
    let chain_id: ChainId =
        "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906".parse().unwrap();
    let client = SignerMiddleware::new(provider, chain_id, vec![wallet.clone()]);

    let alice = PermissionLevel::new(name!("alice"), name!("active"));
    let signed = client.sign_transaction(identity_request(alice)).await.unwrap();

    assert_eq!(mock.pending_requests(), 0);
    let hash = signing_hash(&signing_digest(&chain_id, &signed.serialized_transaction));
    let signature = signed.transaction.signatures[0];
    assert_eq!(signature.recover(&hash).unwrap(), wallet.public_key());
    assert!(signature.to_string().starts_with("SIG_K1_"));

    // signing an already signed proof again adds nothing
    let again = client.sign_encoded_transaction(signed.transaction.clone()).await.unwrap();
    assert_eq!(again.transaction.signatures, signed.transaction.signatures);
    assert!(again.signed_by.is_empty());
}

#[tokio::test]
async fn identity_proof_round_trips() {
    init_tracing();
    let (provider, mock) = Provider::mocked();
    let client = SignerMiddleware::new(
        provider,
        ChainId::from([7u8; 32]),
        vec![LocalWallet::new(&mut eosers::core::rand::thread_rng())],
    );
    let alice = PermissionLevel::new(name!("alice"), name!("active"));
    let request = identity_request(alice);

    let signed = client.sign_transaction(request.clone()).await.unwrap();
    let unpacked = Transaction::<Bytes>::unpack(&signed.serialized_transaction).unwrap();
    let mut unsigned = signed.transaction.clone();
    unsigned.signatures.clear();
    assert_eq!(unpacked, unsigned);

    let decoded = client.deserialize_transaction(&signed.serialized_transaction).await.unwrap();
    assert_eq!(decoded.actions, request.actions);
    assert_eq!(mock.pending_requests(), 0);
}

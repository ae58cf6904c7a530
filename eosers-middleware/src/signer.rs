use crate::{
    codec::{ActionCodec, CodecError},
    schema::SchemaResolver,
};
use eosers_core::{
    abi::AbiError,
    types::{Bytes, ChainId, Name, PublicKey, Transaction, TransactionError},
    utils::{signing_digest, signing_hash},
};
use eosers_providers::{Middleware, MiddlewareError, PushTransactionArgs, PushTransactionResponse};
use eosers_signers::Signer;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
/// Middleware used for locally signing transactions, compatible with any
/// implementer of the [`Signer`] trait.
///
/// Every transaction goes through the same steps: missing header fields are
/// filled from the chain head, action data is encoded with the contracts'
/// ABIs, and each configured key whose signature is not already attached
/// signs the chain-bound digest of the packed transaction.
///
/// # Example
///
/// ```no_run
/// use eosers_core::types::{Action, PermissionLevel, Transaction};
/// use eosers_middleware::SignerMiddleware;
/// use eosers_providers::{Http, Provider};
/// use eosers_signers::LocalWallet;
/// use serde_json::json;
/// use std::convert::TryFrom;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::<Http>::try_from("http://localhost:8888")?;
/// let wallet: LocalWallet = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3".parse()?;
/// let chain_id = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906".parse()?;
///
/// let client = SignerMiddleware::new(provider, chain_id, vec![wallet]);
///
/// let tx = Transaction::new(vec![Action::new(
///     "eosio.token".parse()?,
///     "transfer".parse()?,
///     vec![PermissionLevel::new("alice".parse()?, "active".parse()?)],
///     json!({ "from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": "" }),
/// )]);
///
/// // sign only, e.g. to hand the transaction to another party
/// let signed = client.sign_transaction(tx.clone()).await?;
/// println!("signed by {:?}", signed.signed_by);
///
/// // or sign and broadcast in one go
/// let receipt = client.send_transaction(tx).await?;
/// println!("{}", receipt.transaction_id);
/// # Ok(())
/// # }
/// ```
pub struct SignerMiddleware<M, S> {
    pub(crate) inner: M,
    pub(crate) chain_id: ChainId,
    pub(crate) signers: Vec<S>,
    pub(crate) codec: ActionCodec,
}

#[derive(Error, Debug)]
/// Error thrown when the client interacts with the blockchain
pub enum SignerMiddlewareError<M: Middleware, S: Signer> {
    #[error("{0}")]
    /// Thrown when the internal call to the signer fails
    SignerError(S::Error),

    #[error("{0}")]
    /// Thrown when an internal middleware errors
    MiddlewareError(M::Error),

    /// Thrown when an account an action is addressed to has no ABI
    #[error("no abi is available for account `{0}`")]
    SchemaUnavailable(Name),

    /// Thrown when an account's ABI cannot be parsed
    #[error("abi of account `{account}` is invalid: {source}")]
    InvalidAbi { account: Name, source: AbiError },

    /// Thrown when action data does not fit the contract's ABI
    #[error("data of action `{account}::{action}` does not match its abi: {source}")]
    MalformedPayload { account: Name, action: Name, source: AbiError },

    /// Thrown when the transaction cannot be packed or unpacked
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl<M: Middleware, S: Signer> MiddlewareError for SignerMiddlewareError<M, S> {
    type Inner = M::Error;

    fn from_err(src: M::Error) -> Self {
        SignerMiddlewareError::MiddlewareError(src)
    }

    fn as_inner(&self) -> Option<&Self::Inner> {
        match self {
            SignerMiddlewareError::MiddlewareError(e) => Some(e),
            _ => None,
        }
    }
}

impl<M: Middleware, S: Signer> From<CodecError<M::Error>> for SignerMiddlewareError<M, S> {
    fn from(err: CodecError<M::Error>) -> Self {
        match err {
            CodecError::MiddlewareError(e) => SignerMiddlewareError::MiddlewareError(e),
            CodecError::SchemaUnavailable(account) => {
                SignerMiddlewareError::SchemaUnavailable(account)
            }
            CodecError::InvalidAbi { account, source } => {
                SignerMiddlewareError::InvalidAbi { account, source }
            }
            CodecError::MalformedPayload { account, action, source } => {
                SignerMiddlewareError::MalformedPayload { account, action, source }
            }
        }
    }
}

/// A transaction carrying its signatures, next to the exact bytes they sign
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The transaction with its complete signature list
    pub transaction: Transaction<Bytes>,
    /// The packed transaction the signatures commit to
    pub serialized_transaction: Bytes,
    /// Keys that signed during this call, in signing order. Keys whose
    /// signature was already attached are not listed.
    pub signed_by: Vec<PublicKey>,
}

impl SignedTransaction {
    /// The request body handed to `push_transaction`
    pub fn push_args(&self) -> PushTransactionArgs {
        PushTransactionArgs {
            signatures: self.transaction.signatures.clone(),
            serialized_transaction: self.serialized_transaction.clone(),
        }
    }
}

// Helper functions for locally signing transactions
impl<M, S> SignerMiddleware<M, S>
where
    M: Middleware,
    S: Signer,
{
    /// Creates a new client from the provider, the id of the chain the
    /// transactions are meant for, and the signing keys.
    ///
    /// The keys are treated as a set: a signer whose public key was already
    /// given is dropped. The order of the remaining signers is the order in
    /// which they sign.
    pub fn new(inner: M, chain_id: ChainId, signers: impl IntoIterator<Item = S>) -> Self {
        let mut unique: Vec<S> = Vec::new();
        for signer in signers {
            let key = signer.public_key();
            if unique.iter().any(|s| s.public_key() == key) {
                debug!(%key, "dropping duplicate signing key");
                continue
            }
            unique.push(signer);
        }
        SignerMiddleware { inner, chain_id, signers: unique, codec: ActionCodec::default() }
    }

    /// Replaces the ABI resolver, e.g. to share its cache between clients
    #[must_use]
    pub fn with_resolver(mut self, resolver: SchemaResolver) -> Self {
        self.codec = ActionCodec::new(resolver);
        self
    }

    /// Returns the chain id signatures are bound to
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns a reference to the client's signers
    pub fn signers(&self) -> &[S] {
        &self.signers
    }

    /// Returns the public keys of the client's signers, in signing order
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.signers.iter().map(Signer::public_key).collect()
    }

    /// Returns the ABI resolver used to encode action data
    pub fn resolver(&self) -> &SchemaResolver {
        self.codec.resolver()
    }

    /// Completes the header, encodes the action data and signs the
    /// transaction with every configured key not already represented in its
    /// signatures.
    pub async fn sign_transaction(
        &self,
        mut tx: Transaction<Value>,
    ) -> Result<SignedTransaction, SignerMiddlewareError<M, S>> {
        self.inner.fill_transaction(&mut tx).await.map_err(SignerMiddlewareError::MiddlewareError)?;
        let tx = self.codec.serialize_transaction(&self.inner, tx).await?;
        self.sign_encoded_transaction(tx).await
    }

    /// Signs a transaction whose action data is already encoded. Missing
    /// header fields are filled in first.
    pub async fn sign_encoded_transaction(
        &self,
        mut tx: Transaction<Bytes>,
    ) -> Result<SignedTransaction, SignerMiddlewareError<M, S>> {
        self.inner.fill_transaction(&mut tx).await.map_err(SignerMiddlewareError::MiddlewareError)?;

        let serialized_transaction = tx.packed()?;
        let digest = signing_digest(&self.chain_id, &serialized_transaction);
        let hash = signing_hash(&digest);

        // keys already represented must not sign again; the configured set
        // itself stays untouched
        let mut pending: Vec<&S> = self.signers.iter().collect();
        for signature in &tx.signatures {
            match signature.recover(&hash) {
                Ok(key) => pending.retain(|signer| signer.public_key() != key),
                Err(err) => {
                    warn!(%signature, %err, "could not recover the signer of an existing signature")
                }
            }
        }

        let mut signed_by = Vec::with_capacity(pending.len());
        for signer in pending {
            let signature =
                signer.sign_digest(&digest).await.map_err(SignerMiddlewareError::SignerError)?;
            tx.signatures.push(signature);
            signed_by.push(signer.public_key());
        }
        debug!(
            signatures = tx.signatures.len(),
            new = signed_by.len(),
            "signed transaction"
        );

        Ok(SignedTransaction { transaction: tx, serialized_transaction, signed_by })
    }

    /// Hands the signed transaction to the node. Rejections are returned as
    /// the node reported them.
    pub async fn broadcast_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<PushTransactionResponse, SignerMiddlewareError<M, S>> {
        self.inner
            .push_transaction(signed.push_args())
            .await
            .map_err(SignerMiddlewareError::MiddlewareError)
    }

    /// Signs and broadcasts the transaction
    pub async fn send_transaction(
        &self,
        tx: Transaction<Value>,
    ) -> Result<PushTransactionResponse, SignerMiddlewareError<M, S>> {
        let signed = self.sign_transaction(tx).await?;
        self.broadcast_transaction(&signed).await
    }

    /// Unpacks a serialized transaction and decodes its action data
    pub async fn deserialize_transaction(
        &self,
        serialized_transaction: &[u8],
    ) -> Result<Transaction<Value>, SignerMiddlewareError<M, S>> {
        let tx = Transaction::<Bytes>::unpack(serialized_transaction)?;
        Ok(self.codec.deserialize_transaction(&self.inner, tx).await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<M, S> Middleware for SignerMiddleware<M, S>
where
    M: Middleware,
    S: Signer,
{
    type Error = SignerMiddlewareError<M, S>;
    type Provider = M::Provider;
    type Inner = M;

    fn inner(&self) -> &M {
        &self.inner
    }
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::schema::{IDENTITY_ACCOUNT, IDENTITY_ACTION};
    use eosers_core::{
        k256::ecdsa::SigningKey,
        name,
        types::{Action, Checksum256, KeyType, PermissionLevel, Signature, TimePointSec},
    };
    use eosers_providers::{MockProvider, Provider};
    use eosers_signers::LocalWallet;
    use serde_json::json;

    const CHAIN_ID: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";

    fn key(n: u8) -> LocalWallet {
        let mut secret = [0u8; 32];
        secret[31] = n;
        SigningKey::from_slice(&secret).unwrap().into()
    }

    fn mocked_client(
        signers: Vec<LocalWallet>,
    ) -> (SignerMiddleware<Provider<MockProvider>, LocalWallet>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (SignerMiddleware::new(provider, CHAIN_ID.parse().unwrap(), signers), mock)
    }

    /// A header-complete transaction with already encoded data
    fn encoded_tx() -> Transaction<Bytes> {
        Transaction::new(vec![Action::new(
            name!("eosio"),
            name!("noop"),
            vec![PermissionLevel::new(name!("alice"), name!("active"))],
            Bytes::from([0x01, 0x02]),
        )])
        .expiration(TimePointSec::from_secs(1_600_000_000))
        .ref_block(0xe240, 0xb7c8_a3b5)
    }

    fn hash_of(signed: &SignedTransaction) -> Checksum256 {
        signing_hash(&signing_digest(&CHAIN_ID.parse().unwrap(), &signed.serialized_transaction))
    }

    #[tokio::test]
    async fn signs_with_every_key_in_order() {
        let (client, mock) = mocked_client(vec![key(1), key(2)]);

        let signed = client.sign_encoded_transaction(encoded_tx()).await.unwrap();

        assert_eq!(mock.pending_requests(), 0);
        assert_eq!(signed.serialized_transaction, encoded_tx().packed().unwrap());
        assert_eq!(signed.signed_by, vec![key(1).public_key(), key(2).public_key()]);
        let hash = hash_of(&signed);
        let recovered: Vec<_> =
            signed.transaction.signatures.iter().map(|sig| sig.recover(&hash).unwrap()).collect();
        assert_eq!(recovered, signed.signed_by);
        assert!(signed.transaction.signatures.iter().all(Signature::is_canonical));
    }

    #[tokio::test]
    async fn existing_signers_do_not_sign_again() {
        let (first, _) = mocked_client(vec![key(1)]);
        let signed = first.sign_encoded_transaction(encoded_tx()).await.unwrap();
        let existing = signed.transaction.signatures[0];

        let (client, _) = mocked_client(vec![key(1), key(2)]);
        let resigned = client.sign_encoded_transaction(signed.transaction).await.unwrap();

        let signatures = &resigned.transaction.signatures;
        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0], existing);
        assert_eq!(signatures[1].recover(&hash_of(&resigned)).unwrap(), key(2).public_key());
        assert_eq!(resigned.signed_by, vec![key(2).public_key()]);
        // the configured set is left alone
        assert_eq!(client.public_keys(), vec![key(1).public_key(), key(2).public_key()]);
    }

    #[tokio::test]
    async fn key_set_is_reused_across_calls() {
        let (client, _) = mocked_client(vec![key(1)]);

        let first = client.sign_encoded_transaction(encoded_tx()).await.unwrap();
        let mut other = encoded_tx();
        other.delay_sec = 5;
        let second = client.sign_encoded_transaction(other).await.unwrap();

        assert_eq!(first.signed_by, vec![key(1).public_key()]);
        assert_eq!(second.signed_by, vec![key(1).public_key()]);
    }

    #[tokio::test]
    async fn unrelated_and_unrecoverable_signatures_are_kept() {
        let (third, _) = mocked_client(vec![key(3)]);
        let foreign = third.sign_encoded_transaction(encoded_tx()).await.unwrap().transaction;
        let garbage = Signature::from_raw(KeyType::K1, [0u8; 65]);

        let mut tx = foreign;
        tx.signatures.push(garbage);
        let (client, _) = mocked_client(vec![key(1)]);
        let signed = client.sign_encoded_transaction(tx).await.unwrap();

        assert_eq!(signed.transaction.signatures.len(), 3);
        assert_eq!(signed.transaction.signatures[1], garbage);
        assert_eq!(signed.signed_by, vec![key(1).public_key()]);
    }

    #[tokio::test]
    async fn serialization_is_deterministic() {
        let (client, _) = mocked_client(vec![key(1)]);

        let a = client.sign_encoded_transaction(encoded_tx()).await.unwrap();
        let b = client.sign_encoded_transaction(encoded_tx()).await.unwrap();
        assert_eq!(a.serialized_transaction, b.serialized_transaction);
        assert_eq!(a.transaction.id().unwrap(), b.transaction.id().unwrap());
    }

    #[test]
    fn duplicate_keys_are_dropped() {
        let (client, _) = mocked_client(vec![key(1), key(2), key(1)]);
        assert_eq!(client.public_keys(), vec![key(1).public_key(), key(2).public_key()]);
    }

    #[tokio::test]
    async fn identity_proofs_are_signed_offline() {
        let (client, mock) = mocked_client(vec![key(1)]);
        let tx = Transaction::new(vec![Action::new(
            IDENTITY_ACCOUNT,
            IDENTITY_ACTION,
            vec![PermissionLevel::new(name!("alice"), name!("active"))],
            json!({ "permission": { "actor": "alice", "permission": "active" } }),
        )])
        .expiration(TimePointSec::from_secs(1_600_000_000))
        .ref_block(1, 2);

        let signed = client.sign_transaction(tx.clone()).await.unwrap();

        assert_eq!(mock.pending_requests(), 0);
        assert_eq!(signed.transaction.signatures.len(), 1);
        let decoded =
            client.deserialize_transaction(&signed.serialized_transaction).await.unwrap();
        assert_eq!(decoded.actions, tx.actions);
    }

    #[tokio::test]
    async fn broadcasts_signatures_and_packed_bytes() {
        let (client, mock) = mocked_client(vec![key(1)]);
        let signed = client.sign_encoded_transaction(encoded_tx()).await.unwrap();
        let id = signed.transaction.id().unwrap();
        mock.push::<Value, _>(json!({ "transaction_id": id, "processed": {} })).unwrap();

        let receipt = client.broadcast_transaction(&signed).await.unwrap();

        assert_eq!(receipt.transaction_id, id);
        mock.assert_request(
            "push_transaction",
            json!({
                "signatures": signed.transaction.signatures,
                "compression": 0,
                "packed_context_free_data": "",
                "packed_trx": signed.serialized_transaction,
            }),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn missing_abi_is_reported() {
        let (client, mock) = mocked_client(vec![key(1)]);
        mock.push::<Value, _>(json!({ "account_name": "alice", "abi": "" })).unwrap();
        let tx = Transaction::new(vec![Action::new(name!("alice"), name!("hi"), vec![], json!({}))])
            .expiration(TimePointSec::from_secs(1_600_000_000))
            .ref_block(1, 2);

        let err = client.sign_transaction(tx).await.unwrap_err();
        assert!(matches!(
            err,
            SignerMiddlewareError::SchemaUnavailable(account) if account == name!("alice")
        ));
    }

    #[tokio::test]
    async fn header_fetch_failures_surface() {
        let (client, _mock) = mocked_client(vec![key(1)]);
        let tx = Transaction::new(vec![]);

        let err = client.sign_transaction(tx).await.unwrap_err();
        assert!(err.as_provider_error().is_some());
    }
}

//! Loading K1 private keys from their text encodings
use super::Wallet;

use eosers_core::{
    k256::{
        ecdsa::{self, SigningKey},
        SecretKey as K256SecretKey,
    },
    rand::{CryptoRng, Rng},
    types::PublicKey,
    utils::key_string::{self, KeyStringError},
};
use std::str::FromStr;
use thiserror::Error;

/// Prefix of K1 private keys in the current text format
pub(crate) const PRIVATE_KEY_K1_PREFIX: &str = "PVT_K1_";

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum WalletError {
    /// The private key string could not be decoded
    #[error(transparent)]
    KeyString(#[from] KeyStringError),
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Only K1 keys can be held by a local wallet
    #[error("unsupported private key type in `{0}`")]
    UnsupportedKeyType(String),
    /// No canonical signature was found within the attempt budget
    #[error("no canonical signature after {0} attempts")]
    NonCanonical(usize),
}

impl Wallet<SigningKey> {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        SigningKey::random(rng).into()
    }

    /// The private key in the `PVT_K1_` text format
    pub fn to_private_key_string(&self) -> String {
        key_string::encode_with_suffix(PRIVATE_KEY_K1_PREFIX, &self.signer.to_bytes(), "K1")
    }

    /// The private key in the legacy wallet import format
    pub fn to_wif(&self) -> String {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&self.signer.to_bytes());
        key_string::encode_wif(&secret)
    }
}

impl PartialEq for Wallet<SigningKey> {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes()) && self.public_key == other.public_key
    }
}

impl From<SigningKey> for Wallet<SigningKey> {
    fn from(signer: SigningKey) -> Self {
        let public_key = PublicKey::from(signer.verifying_key());
        Self { signer, public_key }
    }
}

impl From<K256SecretKey> for Wallet<SigningKey> {
    fn from(key: K256SecretKey) -> Self {
        SigningKey::from(key).into()
    }
}

impl FromStr for Wallet<SigningKey> {
    type Err = WalletError;

    /// Parses a `PVT_K1_` or legacy WIF private key
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let secret = if let Some(body) = src.strip_prefix(PRIVATE_KEY_K1_PREFIX) {
            key_string::decode_with_suffix(body, "K1", 32)?
        } else if src.starts_with("PVT_") {
            return Err(WalletError::UnsupportedKeyType(src.to_owned()))
        } else {
            key_string::decode_wif(src)?.to_vec()
        };
        Ok(SigningKey::from_slice(&secret)?.into())
    }
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::Signer;
    use eosers_core::utils::{signing_digest, signing_hash};

    const DEV_WIF: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
    const DEV_PVT: &str = "PVT_K1_2bfGi9rYsXQSXXTvJbDAPhHLQUojjaNLomdm3cEJ1XTzMqUt3V";
    const DEV_PUB: &str = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV";

    #[test]
    fn parses_both_private_key_formats() {
        let wif: Wallet<SigningKey> = DEV_WIF.parse().unwrap();
        let pvt: Wallet<SigningKey> = DEV_PVT.parse().unwrap();
        assert_eq!(wif, pvt);
        assert_eq!(wif.public_key(), DEV_PUB.parse().unwrap());
        assert_eq!(
            hex::encode(wif.signer().to_bytes()),
            "d2653ff7cbb2d8ff129ac27ef5781ce68b2558c41a74af1f2ddca635cbeef07d"
        );
        assert_eq!(wif.to_wif(), DEV_WIF);
        assert_eq!(wif.to_private_key_string(), DEV_PVT);
    }

    #[test]
    fn key_to_public_key() {
        let wallet: Wallet<SigningKey> =
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf".parse().unwrap();
        assert_eq!(
            wallet.public_key().to_legacy_string().unwrap(),
            "EOS5p78kHbL33Rn3JWkTWRE2B9uz6gy4r1KbfAKLNQGE3ovMBS5bu"
        );

        let wallet: Wallet<SigningKey> =
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAvUcVfH".parse().unwrap();
        assert_eq!(
            wallet.public_key().to_legacy_string().unwrap(),
            "EOS6PhSs6H49U1Lb6vz9GDtUF9RjtpFpkS6Rxm94LumQrnD1YqfSG"
        );
    }

    #[test]
    fn rejects_bad_keys() {
        // last character altered
        let err = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD4"
            .parse::<Wallet<SigningKey>>()
            .unwrap_err();
        assert!(matches!(err, WalletError::KeyString(KeyStringError::ChecksumMismatch)));

        let err = "PVT_R1_2bfGi9rYsXQSXXTvJbDAPhHLQUojjaNLomdm3cEJ1XTzMqUt3V"
            .parse::<Wallet<SigningKey>>()
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedKeyType(_)));
    }

    #[tokio::test]
    async fn signs_digest() {
        let wallet: Wallet<SigningKey> = DEV_WIF.parse().unwrap();
        let chain_id =
            "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906".parse().unwrap();
        let digest = signing_digest(&chain_id, b"some packed transaction");

        let signature = wallet.sign_digest(&digest).await.unwrap();

        assert!(signature.is_canonical());
        let hash = signing_hash(&digest);
        signature.verify(&hash, &wallet.public_key()).unwrap();
        // the deterministic nonce makes repeated signatures identical
        assert_eq!(wallet.sign_digest(&digest).await.unwrap(), signature);
    }

    #[tokio::test]
    async fn canonical_retries_are_deterministic() {
        let wallet: Wallet<SigningKey> = DEV_WIF.parse().unwrap();
        for i in 0u32..64 {
            let hash = signing_hash(&i.to_le_bytes());
            let first = wallet.sign_hash(hash).await.unwrap();
            assert_eq!(wallet.sign_hash(hash).await.unwrap(), first, "message {i}");
        }
    }

    #[tokio::test]
    async fn signatures_are_always_canonical() {
        let wallet = Wallet::<SigningKey>::new(&mut rand::thread_rng());
        for i in 0u32..32 {
            let hash = signing_hash(&i.to_le_bytes());
            let signature = wallet.sign_hash(hash).await.unwrap();
            assert!(signature.is_canonical(), "non-canonical signature for message {i}");
            assert_eq!(signature.recover(&hash).unwrap(), wallet.public_key());
        }
    }
}

//! Provides a unified interface for locally signing transaction digests.
//!
//! You can implement the `Signer` trait to extend functionality to other
//! signers such as Hardware Security Modules, KMS etc.
//!
//! The exposed interfaces return recoverable signatures in the chain's
//! canonical form. To attach them to a transaction, look at the signing
//! middleware.
//!
//! ```no_run
//! # use eosers_signers::{LocalWallet, Signer};
//! # use eosers_core::utils::signing_digest;
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! // instantiate the wallet from a WIF or PVT_K1 private key
//! let wallet = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3".parse::<LocalWallet>()?;
//!
//! // sign the digest of a serialized transaction
//! let digest = signing_digest(&"aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906".parse()?, b"packed");
//! let signature = wallet.sign_digest(&digest).await?;
//! println!("{signature}");
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{Wallet, WalletError, MAX_CANONICAL_ATTEMPTS};

/// A wallet instantiated with a locally stored private key
pub type LocalWallet = Wallet<eosers_core::k256::ecdsa::SigningKey>;

use async_trait::async_trait;
use eosers_core::{
    types::{Checksum256, PublicKey, Signature},
    utils::signing_hash,
};
use std::error::Error;

/// Trait for signing transaction digests
///
/// Implement this trait to support different signing modes, e.g. hardware,
/// hosted etc.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Signs the SHA-256 of the provided signing digest
    async fn sign_digest(&self, digest: &[u8]) -> Result<Signature, Self::Error> {
        self.sign_hash(signing_hash(digest)).await
    }

    /// Signs a 32-byte hash as is
    async fn sign_hash(&self, hash: Checksum256) -> Result<Signature, Self::Error>;

    /// Returns the signer's public key
    fn public_key(&self) -> PublicKey;
}

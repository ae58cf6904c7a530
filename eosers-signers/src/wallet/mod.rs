mod private_key;
pub use private_key::WalletError;

use crate::Signer;
use eosers_core::{
    k256::ecdsa::{
        signature::hazmat::RandomizedPrehashSigner, RecoveryId, Signature as K256Signature,
        SigningKey,
    },
    types::{Checksum256, PublicKey, Signature},
    utils::sha256,
};

use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;
use tracing::trace;

/// How many nonces are tried before giving up on a canonical signature
pub const MAX_CANONICAL_ATTEMPTS: usize = 64;

/// A private-public key pair which can be used for signing transactions.
///
/// # Examples
///
/// ```
/// use eosers_core::{rand::thread_rng, utils::signing_hash};
/// use eosers_signers::{LocalWallet, Signer};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = LocalWallet::new(&mut thread_rng());
///
/// let digest = b"chain id, packed transaction and zero padding";
/// let signature = wallet.sign_digest(digest).await?;
/// assert!(signature.is_canonical());
/// assert_eq!(signature.recover(&signing_hash(digest))?, wallet.public_key());
/// # Ok(())
/// # }
/// ```
pub struct Wallet<D> {
    /// The Wallet's private Key
    pub(crate) signer: D,
    /// The wallet's public key
    pub(crate) public_key: PublicKey,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Signer for Wallet<SigningKey> {
    type Error = WalletError;

    async fn sign_hash(&self, hash: Checksum256) -> Result<Signature, Self::Error> {
        self.sign_hash_canonical(&hash)
    }

    fn public_key(&self) -> PublicKey {
        self.public_key
    }
}

impl Wallet<SigningKey> {
    /// Signs `hash`, retrying with fresh nonces until the chain's canonical
    /// form is reached. The first attempt is the plain RFC 6979 nonce, each
    /// retry mixes `sha256(hash || attempt)` into it as extra entropy, so the
    /// same key and hash always give the same signature.
    pub fn sign_hash_canonical(&self, hash: &Checksum256) -> Result<Signature, WalletError> {
        let prehash = hash.as_bytes();
        let (sig, recovery_id) = self.signer.sign_prehash_recoverable(prehash)?;
        let signature = Signature::from_k256(&sig, recovery_id);
        if signature.is_canonical() {
            return Ok(signature)
        }

        for attempt in 1..MAX_CANONICAL_ATTEMPTS {
            trace!(attempt, "signature not canonical, retrying with the next nonce");
            let mut seed = prehash.to_vec();
            seed.extend_from_slice(&(attempt as u32).to_le_bytes());
            let mut rng = StdRng::from_seed(sha256(seed));
            let sig: K256Signature = self.signer.sign_prehash_with_rng(&mut rng, prehash)?;
            let recovery_id =
                RecoveryId::trial_recovery_from_prehash(self.signer.verifying_key(), prehash, &sig)?;
            let signature = Signature::from_k256(&sig, recovery_id);
            if signature.is_canonical() {
                return Ok(signature)
            }
        }
        Err(WalletError::NonCanonical(MAX_CANONICAL_ATTEMPTS))
    }
}

impl<D> Wallet<D> {
    /// Gets the wallet's signer
    pub fn signer(&self) -> &D {
        &self.signer
    }

    /// Returns the wallet's public key
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }
}

// do not log the signer
impl<D> fmt::Debug for Wallet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("public_key", &self.public_key).finish()
    }
}

impl<D: Clone> Clone for Wallet<D> {
    fn clone(&self) -> Self {
        Self { signer: self.signer.clone(), public_key: self.public_key }
    }
}

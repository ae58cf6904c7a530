//! Various utilities for manipulating EOSIO related data
use crate::types::{ChainId, Checksum256};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Size of the context-free-data digest slot trailing every signing digest
pub const CONTEXT_FREE_DATA_DIGEST_LEN: usize = 32;

/// Computes the SHA-256 of the provided data
pub fn sha256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    Sha256::digest(bytes.as_ref()).into()
}

/// Computes the RIPEMD-160 of the provided data
pub fn ripemd160<T: AsRef<[u8]>>(bytes: T) -> [u8; 20] {
    Ripemd160::digest(bytes.as_ref()).into()
}

/// Builds the byte string handed to the signing primitive:
/// `chain_id || serialized_transaction || [0u8; 32]`.
///
/// The trailing block is the context-free-data digest slot, always zero since
/// context-free data is never hashed separately.
pub fn signing_digest(chain_id: &ChainId, serialized_transaction: &[u8]) -> Vec<u8> {
    let mut digest = Vec::with_capacity(
        chain_id.as_bytes().len() + serialized_transaction.len() + CONTEXT_FREE_DATA_DIGEST_LEN,
    );
    digest.extend_from_slice(chain_id.as_bytes());
    digest.extend_from_slice(serialized_transaction);
    digest.extend_from_slice(&[0u8; CONTEXT_FREE_DATA_DIGEST_LEN]);
    digest
}

/// The hash a signature over `digest` commits to
pub fn signing_hash(digest: &[u8]) -> Checksum256 {
    Checksum256::from(sha256(digest))
}

mod hash;
pub use hash::{
    ripemd160, sha256, signing_digest, signing_hash, CONTEXT_FREE_DATA_DIGEST_LEN,
};

/// Base58 key and signature string helpers
pub mod key_string;

/// The number of seconds a completed transaction header stays valid
pub const DEFAULT_EXPIRE_SECONDS: u32 = 600;

mod keys;
pub use keys::{KeyType, PublicKey, PublicKeyError, LEGACY_PUBLIC_KEY_PREFIX};

mod signature;
pub use signature::{Signature, SignatureError, COMPACT_RECOVERY_OFFSET};

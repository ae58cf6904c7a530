use super::keys::{KeyType, PublicKey};
use crate::{
    codec::{take_array, DecodeError, Decodable, Encodable},
    types::Checksum256,
    utils::key_string::{self, KeyStringError},
};
use bytes::BufMut;
use k256::ecdsa::{
    Error as K256SignatureError, RecoveryId, Signature as K256Signature, VerifyingKey,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Offset added to the recovery id in the leading signature byte: 27, plus 4
/// to flag a compressed public key.
pub const COMPACT_RECOVERY_OFFSET: u8 = 27 + 4;

/// An error involving a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error(transparent)]
    KeyString(#[from] KeyStringError),
    /// Internal error during signature recovery
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
    /// Error in recovering public key from signature
    #[error("public key recovery error")]
    RecoveryError,
    #[error("unsupported signature type {0}")]
    UnsupportedKeyType(KeyType),
    /// Thrown when the recovered key differs from the expected one
    #[error("signature verification failed, expected {0}, got {1}")]
    VerificationError(PublicKey, PublicKey),
}

/// A compact recoverable ECDSA signature: `[recovery byte, r, s]`.
///
/// Embeds enough information to recover the signer's public key from the
/// signed hash, so keys never travel next to signatures.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    key_type: KeyType,
    data: [u8; 65],
}

impl Signature {
    /// Builds a K1 signature from a k256 signature and its recovery id
    pub fn from_k256(signature: &K256Signature, recovery_id: RecoveryId) -> Self {
        let mut data = [0u8; 65];
        data[0] = recovery_id.to_byte() + COMPACT_RECOVERY_OFFSET;
        data[1..].copy_from_slice(&signature.to_bytes());
        Self { key_type: KeyType::K1, data }
    }

    pub fn from_raw(key_type: KeyType, data: [u8; 65]) -> Self {
        Self { key_type, data }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.data
    }

    /// Whether both `r` and `s` are exactly 32 significant bytes with a clear
    /// high bit, the only form accepted by the chain's K1 verifier.
    pub fn is_canonical(&self) -> bool {
        let d = &self.data;
        d[1] & 0x80 == 0 &&
            !(d[1] == 0 && d[2] & 0x80 == 0) &&
            d[33] & 0x80 == 0 &&
            !(d[33] == 0 && d[34] & 0x80 == 0)
    }

    /// Recovers the public key which produced this signature over `hash`
    pub fn recover(&self, hash: &Checksum256) -> Result<PublicKey, SignatureError> {
        if self.key_type != KeyType::K1 {
            return Err(SignatureError::UnsupportedKeyType(self.key_type))
        }
        let recovery_byte =
            self.data[0].checked_sub(27).ok_or(SignatureError::RecoveryError)? & 3;
        let recovery_id =
            RecoveryId::from_byte(recovery_byte).ok_or(SignatureError::RecoveryError)?;
        let signature = K256Signature::from_slice(&self.data[1..])?;
        let verifying_key =
            VerifyingKey::recover_from_prehash(hash.as_bytes(), &signature, recovery_id)?;
        Ok(PublicKey::from(&verifying_key))
    }

    /// Verifies that this signature over `hash` was produced by `key`
    pub fn verify(&self, hash: &Checksum256, key: &PublicKey) -> Result<(), SignatureError> {
        let recovered = self.recover(hash)?;
        if recovered != *key {
            return Err(SignatureError::VerificationError(*key, recovered))
        }
        Ok(())
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, body) = if let Some(body) = s.strip_prefix("SIG_K1_") {
            (KeyType::K1, body)
        } else if let Some(body) = s.strip_prefix("SIG_R1_") {
            (KeyType::R1, body)
        } else {
            return Err(KeyStringError::UnknownPrefix(s.to_owned()).into())
        };
        let raw = key_string::decode_with_suffix(body, key_type.as_str(), 65)?;
        let mut data = [0u8; 65];
        data.copy_from_slice(&raw);
        Ok(Self { key_type, data })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("SIG_{}_", self.key_type);
        f.write_str(&key_string::encode_with_suffix(&prefix, &self.data, self.key_type.as_str()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Encodable for Signature {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_u8(self.key_type.into());
        out.put_slice(&self.data);
    }
}

impl Decodable for Signature {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let tag = u8::decode(buf)?;
        let key_type = match KeyType::try_from(tag) {
            Ok(KeyType::WA) | Err(_) => return Err(DecodeError::UnknownKeyType(tag)),
            Ok(key_type) => key_type,
        };
        Ok(Self { key_type, data: take_array(buf)? })
    }
}

use crate::{
    codec::{take_array, DecodeError, Decodable, Encodable},
    utils::key_string::{self, KeyStringError},
};
use bytes::BufMut;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Prefix of public keys in the legacy text format
pub const LEGACY_PUBLIC_KEY_PREFIX: &str = "EOS";

/// Curve tag carried by keys and signatures on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum KeyType {
    /// secp256k1
    K1 = 0,
    /// secp256r1
    R1 = 1,
    /// WebAuthn, not supported by this crate
    WA = 2,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::K1 => "K1",
            KeyType::R1 => "R1",
            KeyType::WA => "WA",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublicKeyError {
    #[error(transparent)]
    KeyString(#[from] KeyStringError),
    #[error("point is not on the curve")]
    InvalidPoint,
    #[error("unsupported key type {0}")]
    UnsupportedKeyType(KeyType),
}

/// A compressed SEC1 public key tagged with its curve.
///
/// Equality is defined over the curve tag and the 33 compressed point bytes,
/// so a key parsed from either text format compares equal to the same key
/// derived from a private key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key_type: KeyType,
    data: [u8; 33],
}

impl PublicKey {
    /// Validates and wraps compressed point bytes
    pub fn from_compressed(key_type: KeyType, data: [u8; 33]) -> Result<Self, PublicKeyError> {
        match key_type {
            KeyType::K1 => {
                k256::PublicKey::from_sec1_bytes(&data)
                    .map_err(|_| PublicKeyError::InvalidPoint)?;
            }
            // r1 points are carried opaquely
            KeyType::R1 => {}
            KeyType::WA => return Err(PublicKeyError::UnsupportedKeyType(key_type)),
        }
        Ok(Self { key_type, data })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.data
    }

    /// `EOS...` rendering, only defined for K1 keys
    pub fn to_legacy_string(&self) -> Option<String> {
        if self.key_type != KeyType::K1 {
            return None
        }
        Some(key_string::encode_with_suffix(LEGACY_PUBLIC_KEY_PREFIX, &self.data, ""))
    }
}

impl From<&k256::PublicKey> for PublicKey {
    fn from(key: &k256::PublicKey) -> Self {
        let point = key.to_encoded_point(/* compress = */ true);
        let mut data = [0u8; 33];
        data.copy_from_slice(point.as_bytes());
        Self { key_type: KeyType::K1, data }
    }
}

impl From<&k256::ecdsa::VerifyingKey> for PublicKey {
    fn from(key: &k256::ecdsa::VerifyingKey) -> Self {
        Self::from(&k256::PublicKey::from(key))
    }
}

impl FromStr for PublicKey {
    type Err = PublicKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, data) = if let Some(body) = s.strip_prefix("PUB_K1_") {
            (KeyType::K1, key_string::decode_with_suffix(body, "K1", 33)?)
        } else if let Some(body) = s.strip_prefix("PUB_R1_") {
            (KeyType::R1, key_string::decode_with_suffix(body, "R1", 33)?)
        } else if let Some(body) = s.strip_prefix(LEGACY_PUBLIC_KEY_PREFIX) {
            (KeyType::K1, key_string::decode_legacy_public(body)?)
        } else {
            return Err(KeyStringError::UnknownPrefix(s.to_owned()).into())
        };
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&data);
        Self::from_compressed(key_type, bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("PUB_{}_", self.key_type);
        f.write_str(&key_string::encode_with_suffix(&prefix, &self.data, self.key_type.as_str()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Encodable for PublicKey {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_u8(self.key_type.into());
        out.put_slice(&self.data);
    }
}

impl Decodable for PublicKey {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let tag = u8::decode(buf)?;
        let key_type = KeyType::try_from(tag).map_err(|_| DecodeError::UnknownKeyType(tag))?;
        let data = take_array(buf)?;
        Self::from_compressed(key_type, data).map_err(|_| DecodeError::InvalidPublicKey)
    }
}

//! Text encodings for keys and signatures: base58 with a RIPEMD-160 (or, for
//! legacy WIF, double SHA-256) checksum.
use super::{ripemd160, sha256};
use thiserror::Error;

/// Failure to parse a key or signature string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStringError {
    #[error("unrecognized key prefix in `{0}`")]
    UnknownPrefix(String),
    #[error(transparent)]
    Base58(#[from] bs58::decode::Error),
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("invalid payload length {got}, expected {expected}")]
    InvalidLength { got: usize, expected: usize },
    #[error("invalid WIF version byte {0:#04x}")]
    InvalidVersion(u8),
}

const CHECKSUM_LEN: usize = 4;

/// Encodes `data` as `prefix + base58(data || ripemd160(data || suffix)[..4])`
pub fn encode_with_suffix(prefix: &str, data: &[u8], suffix: &str) -> String {
    let mut check_input = data.to_vec();
    check_input.extend_from_slice(suffix.as_bytes());
    let checksum = ripemd160(check_input);

    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    format!("{prefix}{}", bs58::encode(payload).into_string())
}

/// Inverse of [`encode_with_suffix`] with the prefix already stripped
pub fn decode_with_suffix(
    encoded: &str,
    suffix: &str,
    expected_len: usize,
) -> Result<Vec<u8>, KeyStringError> {
    let raw = bs58::decode(encoded).into_vec()?;
    let (data, checksum) = split_checksum(&raw, expected_len)?;

    let mut check_input = data.to_vec();
    check_input.extend_from_slice(suffix.as_bytes());
    if ripemd160(check_input)[..CHECKSUM_LEN] != *checksum {
        return Err(KeyStringError::ChecksumMismatch)
    }
    Ok(data.to_vec())
}

/// Legacy `EOS...` public key: checksum is ripemd160 over the key alone
pub fn decode_legacy_public(encoded: &str) -> Result<Vec<u8>, KeyStringError> {
    decode_with_suffix(encoded, "", 33)
}

/// Wallet import format: `base58(0x80 || key || sha256d(0x80 || key)[..4])`
pub fn encode_wif(secret: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(1 + 32 + CHECKSUM_LEN);
    payload.push(0x80);
    payload.extend_from_slice(secret);
    let checksum = sha256(sha256(&payload));
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(payload).into_string()
}

pub fn decode_wif(encoded: &str) -> Result<[u8; 32], KeyStringError> {
    let raw = bs58::decode(encoded).into_vec()?;
    let (data, checksum) = split_checksum(&raw, 33)?;
    if sha256(sha256(data))[..CHECKSUM_LEN] != *checksum {
        return Err(KeyStringError::ChecksumMismatch)
    }
    if data[0] != 0x80 {
        return Err(KeyStringError::InvalidVersion(data[0]))
    }
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&data[1..]);
    Ok(secret)
}

fn split_checksum(raw: &[u8], expected_len: usize) -> Result<(&[u8], &[u8]), KeyStringError> {
    if raw.len() != expected_len + CHECKSUM_LEN {
        return Err(KeyStringError::InvalidLength {
            got: raw.len().saturating_sub(CHECKSUM_LEN),
            expected: expected_len,
        })
    }
    Ok(raw.split_at(expected_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wif_roundtrip_and_checksum() {
        let secret = [7u8; 32];
        let wif = encode_wif(&secret);
        assert!(wif.starts_with('5'));
        assert_eq!(decode_wif(&wif).unwrap(), secret);

        let mut tampered = wif.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'1' { b'2' } else { b'1' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(decode_wif(&tampered).is_err());
    }

    #[test]
    fn suffix_checksum_is_bound_to_suffix() {
        let data = [3u8; 33];
        let encoded = encode_with_suffix("PUB_K1_", &data, "K1");
        let body = encoded.strip_prefix("PUB_K1_").unwrap();
        assert_eq!(decode_with_suffix(body, "K1", 33).unwrap(), data.to_vec());
        assert_eq!(decode_with_suffix(body, "R1", 33), Err(KeyStringError::ChecksumMismatch));
    }
}

use crate::codec::{DecodeError, Decodable, Encodable};
use bytes::BufMut;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// The maximum length of a name in characters
pub const MAX_NAME_LEN: usize = 13;

/// A base32-packed account, action, table or permission identifier.
///
/// Up to 12 characters from `.12345a-z` plus an optional 13th character from
/// `.12345a-j`, packed into a `u64`. The empty string is `Name(0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNameError {
    #[error("name `{0}` is longer than 13 characters")]
    TooLong(String),
    #[error("invalid character {1:?} in name `{0}`")]
    InvalidCharacter(String, char),
    #[error("13th character of name `{0}` must be one of `.12345abcdefghij`")]
    InvalidThirteenth(String),
}

impl Name {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl FromStr for Name {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.as_bytes();
        if raw.len() > MAX_NAME_LEN {
            return Err(ParseNameError::TooLong(s.to_owned()))
        }

        let mut value = 0u64;
        for (i, c) in raw.iter().enumerate() {
            let symbol = char_to_symbol(*c)
                .ok_or_else(|| ParseNameError::InvalidCharacter(s.to_owned(), *c as char))?;
            if i < 12 {
                value |= symbol << (64 - 5 * (i + 1));
            } else {
                if symbol > 0x0f {
                    return Err(ParseNameError::InvalidThirteenth(s.to_owned()))
                }
                value |= symbol;
            }
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[MAX_NAME_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let len = out.iter().rposition(|c| *c != b'.').map_or(0, |pos| pos + 1);
        // every byte comes from CHARMAP
        f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| fmt::Error)?)
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Encodable for Name {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out)
    }
}

impl Decodable for Name {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        u64::decode(buf).map(Self)
    }
}

/// Parses a name literal, panicking on invalid input. Meant for constants
/// and tests.
#[macro_export]
macro_rules! name {
    ($s:expr) => {
        $s.parse::<$crate::types::Name>().expect("invalid name literal")
    };
}

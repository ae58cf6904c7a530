use crate::codec::{DecodeError, Decodable, Encodable};
use bytes::BufMut;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Symbol codes are at most 7 uppercase letters
pub const MAX_SYMBOL_CODE_LEN: usize = 7;
/// Precision is bounded so that the amount still fits an `i64`
pub const MAX_PRECISION: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAssetError {
    #[error("invalid symbol code `{0}`")]
    InvalidSymbolCode(String),
    #[error("invalid symbol `{0}`, expected `precision,CODE`")]
    InvalidSymbol(String),
    #[error("invalid asset `{0}`, expected `amount CODE`")]
    InvalidAsset(String),
    #[error("asset amount `{0}` overflows")]
    AmountOverflow(String),
}

/// Up to 7 uppercase letters packed into the low bytes of a `u64`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymbolCode(u64);

impl SymbolCode {
    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for SymbolCode {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() ||
            s.len() > MAX_SYMBOL_CODE_LEN ||
            !s.bytes().all(|c| c.is_ascii_uppercase())
        {
            return Err(ParseAssetError::InvalidSymbolCode(s.to_owned()))
        }
        let raw = s.bytes().rev().fold(0u64, |acc, c| (acc << 8) | u64::from(c));
        Ok(Self(raw))
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = self.0;
        while raw & 0xff != 0 {
            write!(f, "{}", (raw & 0xff) as u8 as char)?;
            raw >>= 8;
        }
        Ok(())
    }
}

/// A token symbol: decimal precision plus code, e.g. `4,EOS`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Symbol(u64);

impl Symbol {
    pub fn new(precision: u8, code: SymbolCode) -> Self {
        Self(u64::from(precision) | (code.raw() << 8))
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub const fn code(&self) -> SymbolCode {
        SymbolCode(self.0 >> 8)
    }
}

impl FromStr for Symbol {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (precision, code) =
            s.split_once(',').ok_or_else(|| ParseAssetError::InvalidSymbol(s.to_owned()))?;
        let precision: u8 =
            precision.trim().parse().map_err(|_| ParseAssetError::InvalidSymbol(s.to_owned()))?;
        if precision > MAX_PRECISION {
            return Err(ParseAssetError::InvalidSymbol(s.to_owned()))
        }
        Ok(Self::new(precision, code.trim().parse()?))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

/// A quantity of a token, e.g. `1.0000 EOS`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl FromStr for Asset {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseAssetError::InvalidAsset(s.to_owned());
        let (amount, code) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let code: SymbolCode = code.trim().parse()?;

        let (negative, digits) = match amount.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, amount),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() ||
            !whole.bytes().all(|c| c.is_ascii_digit()) ||
            !fraction.bytes().all(|c| c.is_ascii_digit()) ||
            (digits.contains('.') && fraction.is_empty())
        {
            return Err(invalid())
        }
        let precision = u8::try_from(fraction.len()).map_err(|_| invalid())?;
        if precision > MAX_PRECISION {
            return Err(invalid())
        }

        let magnitude: i64 = format!("{whole}{fraction}")
            .parse()
            .map_err(|_| ParseAssetError::AmountOverflow(s.to_owned()))?;
        let amount = if negative { -magnitude } else { magnitude };
        Ok(Self { amount, symbol: Symbol::new(precision, code) })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = u32::from(self.symbol.precision());
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        if precision == 0 {
            return write!(f, "{sign}{magnitude} {}", self.symbol.code())
        }
        let scale = 10u64.pow(precision);
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            magnitude / scale,
            magnitude % scale,
            self.symbol.code(),
            width = precision as usize
        )
    }
}

macro_rules! impl_string_serde {
    ($($t:ty),*) => {
        $(
            impl Serialize for $t {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> Deserialize<'de> for $t {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(de::Error::custom)
                }
            }
        )*
    };
}

impl_string_serde!(SymbolCode, Symbol, Asset);

impl Encodable for SymbolCode {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out)
    }
}

impl Decodable for SymbolCode {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        u64::decode(buf).map(Self)
    }
}

impl Encodable for Symbol {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out)
    }
}

impl Decodable for Symbol {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        u64::decode(buf).map(Self)
    }
}

impl Encodable for Asset {
    fn encode(&self, out: &mut dyn BufMut) {
        self.amount.encode(out);
        self.symbol.encode(out);
    }
}

impl Decodable for Asset {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self { amount: i64::decode(buf)?, symbol: Symbol::decode(buf)? })
    }
}

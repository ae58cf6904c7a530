//! Binary encoding used by the chain's consensus-level serializer.
//!
//! Integers are little-endian, sequences and byte strings are prefixed with a
//! LEB128 `varuint32` length.
use bytes::BufMut;
use thiserror::Error;

/// Error while decoding a binary payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer ended before the value was complete
    #[error("unexpected end of input, needed {needed} more bytes")]
    UnexpectedEof { needed: usize },
    /// A varuint32 did not terminate within 5 bytes or exceeded `u32::MAX`
    #[error("varuint32 overflow")]
    VarUintOverflow,
    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("unknown key type {0}")]
    UnknownKeyType(u8),
    #[error("invalid public key bytes")]
    InvalidPublicKey,
    /// Bytes were left over after decoding a top-level value
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("{0}")]
    Custom(&'static str),
}

/// A type that can be written in the chain's binary format
pub trait Encodable {
    /// Appends the encoding of `self` to `out`
    fn encode(&self, out: &mut dyn BufMut);

    /// Returns the encoding of `self` as a fresh buffer
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// A type that can be read from the chain's binary format
pub trait Decodable: Sized {
    /// Decodes a value from the front of `buf`, advancing it past the consumed bytes
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError>;

    /// Decodes a value that must span the entire input
    fn decode_exact(mut buf: &[u8]) -> Result<Self, DecodeError> {
        let value = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(DecodeError::TrailingBytes(buf.len()))
        }
        Ok(value)
    }
}

/// Splits `n` bytes off the front of `buf`
pub fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if buf.len() < n {
        return Err(DecodeError::UnexpectedEof { needed: n - buf.len() })
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

/// Reads a fixed-size array off the front of `buf`
pub fn take_array<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N], DecodeError> {
    let mut arr = [0u8; N];
    arr.copy_from_slice(take(buf, N)?);
    Ok(arr)
}

pub fn write_varuint32(out: &mut dyn BufMut, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.put_u8(byte);
            return
        }
        out.put_u8(byte | 0x80);
    }
}

pub fn read_varuint32(buf: &mut &[u8]) -> Result<u32, DecodeError> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = take(buf, 1)?[0];
        result |= u64::from(byte & 0x7f) << shift;
        if result > u64::from(u32::MAX) {
            return Err(DecodeError::VarUintOverflow)
        }
        if byte & 0x80 == 0 {
            return Ok(result as u32)
        }
        shift += 7;
        if shift >= 35 {
            return Err(DecodeError::VarUintOverflow)
        }
    }
}

/// Zigzag-encoded signed varint
pub fn write_varint32(out: &mut dyn BufMut, value: i32) {
    write_varuint32(out, ((value << 1) ^ (value >> 31)) as u32)
}

pub fn read_varint32(buf: &mut &[u8]) -> Result<i32, DecodeError> {
    let raw = read_varuint32(buf)?;
    Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
}

macro_rules! impl_int {
    ($($t:ty => $put:ident),*) => {
        $(
            impl Encodable for $t {
                fn encode(&self, out: &mut dyn BufMut) {
                    out.$put(*self);
                }
            }

            impl Decodable for $t {
                fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
                    Ok(<$t>::from_le_bytes(take_array(buf)?))
                }
            }
        )*
    };
}

impl_int!(
    u16 => put_u16_le, u32 => put_u32_le, u64 => put_u64_le,
    i16 => put_i16_le, i32 => put_i32_le, i64 => put_i64_le
);

impl Encodable for u8 {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_u8(*self);
    }
}

impl Decodable for u8 {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(take(buf, 1)?[0])
    }
}

impl Encodable for bool {
    fn encode(&self, out: &mut dyn BufMut) {
        out.put_u8(u8::from(*self));
    }
}

impl Decodable for bool {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        match u8::decode(buf)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }
}

impl Encodable for str {
    fn encode(&self, out: &mut dyn BufMut) {
        write_varuint32(out, self.len() as u32);
        out.put_slice(self.as_bytes());
    }
}

impl Encodable for String {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_str().encode(out)
    }
}

impl Decodable for String {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = read_varuint32(buf)? as usize;
        let raw = take(buf, len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_slice().encode(out)
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode(&self, out: &mut dyn BufMut) {
        write_varuint32(out, self.len() as u32);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = read_varuint32(buf)? as usize;
        // every element takes at least one byte, so cap the preallocation
        let mut items = Vec::with_capacity(len.min(buf.len()));
        for _ in 0..len {
            items.push(T::decode(buf)?);
        }
        Ok(items)
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Some(value) => {
                out.put_u8(1);
                value.encode(out);
            }
            None => out.put_u8(0),
        }
    }
}

impl<T: Decodable> Decodable for Option<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        if bool::decode(buf)? {
            Ok(Some(T::decode(buf)?))
        } else {
            Ok(None)
        }
    }
}

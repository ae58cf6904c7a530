//! Types every ABI understands without declaring them.
use super::AbiError;
use crate::{
    codec::{
        read_varint32, read_varuint32, take, take_array, write_varint32, write_varuint32,
        Decodable, Encodable,
    },
    types::{
        Asset, BlockTimestamp, Bytes, Name, PublicKey, Signature, Symbol, SymbolCode, TimePoint,
        TimePointSec,
    },
};
use bytes::BufMut;
use serde_json::{json, Map, Value};
use std::{fmt::Display, str::FromStr};

pub const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "int8",
    "uint8",
    "int16",
    "uint16",
    "int32",
    "uint32",
    "int64",
    "uint64",
    "int128",
    "uint128",
    "varint32",
    "varuint32",
    "float32",
    "float64",
    "float128",
    "time_point",
    "time_point_sec",
    "block_timestamp_type",
    "name",
    "bytes",
    "string",
    "checksum160",
    "checksum256",
    "checksum512",
    "public_key",
    "signature",
    "symbol",
    "symbol_code",
    "asset",
    "extended_asset",
];

pub(crate) fn is_builtin(ty: &str) -> bool {
    BUILTIN_TYPES.contains(&ty)
}

/// Reads an integer given either as a JSON number or a decimal string
fn int<T>(ty: &str, value: &Value) -> Result<T, AbiError>
where
    T: TryFrom<i128> + FromStr,
    T::Err: Display,
{
    match value {
        Value::String(s) => s.trim().parse().map_err(|e| AbiError::invalid(ty, e)),
        Value::Number(n) => {
            let wide = n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .ok_or_else(|| AbiError::invalid(ty, format!("{n} is not an integer")))?;
            T::try_from(wide).map_err(|_| AbiError::invalid(ty, format!("{n} is out of range")))
        }
        other => Err(AbiError::invalid(ty, format!("expected an integer, got {other}"))),
    }
}

fn float(ty: &str, value: &Value) -> Result<f64, AbiError> {
    match value {
        Value::Number(n) => {
            n.as_f64().ok_or_else(|| AbiError::invalid(ty, format!("{n} is not a number")))
        }
        Value::String(s) => s.trim().parse().map_err(|e| AbiError::invalid(ty, e)),
        other => Err(AbiError::invalid(ty, format!("expected a number, got {other}"))),
    }
}

fn string<'a>(ty: &str, value: &'a Value) -> Result<&'a str, AbiError> {
    value.as_str().ok_or_else(|| AbiError::invalid(ty, format!("expected a string, got {value}")))
}

fn parsed<T>(ty: &str, value: &Value) -> Result<T, AbiError>
where
    T: FromStr,
    T::Err: Display,
{
    string(ty, value)?.parse().map_err(|e| AbiError::invalid(ty, e))
}

fn fixed_hex<const N: usize>(ty: &str, value: &Value) -> Result<[u8; N], AbiError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(string(ty, value)?, &mut out).map_err(|e| AbiError::invalid(ty, e))?;
    Ok(out)
}

fn extended_asset_fields<'a>(value: &'a Value) -> Result<(&'a Value, &'a Value), AbiError> {
    const TY: &str = "extended_asset";
    let obj = value
        .as_object()
        .ok_or_else(|| AbiError::invalid(TY, format!("expected an object, got {value}")))?;
    if let Some(extra) = obj.keys().find(|k| *k != "quantity" && *k != "contract") {
        return Err(AbiError::UnexpectedField { strukt: TY.to_owned(), field: extra.clone() })
    }
    let field = move |name: &str| {
        obj.get(name).ok_or_else(|| AbiError::MissingField {
            strukt: TY.to_owned(),
            field: name.to_owned(),
        })
    };
    Ok((field("quantity")?, field("contract")?))
}

/// Writes a builtin value. Returns `UnknownType` if `ty` is not builtin.
pub(crate) fn encode(ty: &str, value: &Value, out: &mut dyn BufMut) -> Result<(), AbiError> {
    match ty {
        "bool" => {
            let b = value
                .as_bool()
                .ok_or_else(|| AbiError::invalid(ty, format!("expected a bool, got {value}")))?;
            b.encode(out)
        }
        "int8" => out.put_i8(int(ty, value)?),
        "uint8" => out.put_u8(int(ty, value)?),
        "int16" => out.put_i16_le(int(ty, value)?),
        "uint16" => out.put_u16_le(int(ty, value)?),
        "int32" => out.put_i32_le(int(ty, value)?),
        "uint32" => out.put_u32_le(int(ty, value)?),
        "int64" => out.put_i64_le(int(ty, value)?),
        "uint64" => out.put_u64_le(int(ty, value)?),
        "int128" => out.put_i128_le(int(ty, value)?),
        "uint128" => out.put_u128_le(int(ty, value)?),
        "varint32" => write_varint32(out, int(ty, value)?),
        "varuint32" => write_varuint32(out, int(ty, value)?),
        "float32" => out.put_f32_le(float(ty, value)? as f32),
        "float64" => out.put_f64_le(float(ty, value)?),
        "float128" => out.put_slice(&fixed_hex::<16>(ty, value)?),
        "time_point" => parsed::<TimePoint>(ty, value)?.encode(out),
        "time_point_sec" => parsed::<TimePointSec>(ty, value)?.encode(out),
        "block_timestamp_type" => parsed::<BlockTimestamp>(ty, value)?.encode(out),
        "name" => parsed::<Name>(ty, value)?.encode(out),
        "bytes" => parsed::<Bytes>(ty, value)?.encode(out),
        "string" => string(ty, value)?.encode(out),
        "checksum160" => out.put_slice(&fixed_hex::<20>(ty, value)?),
        "checksum256" => out.put_slice(&fixed_hex::<32>(ty, value)?),
        "checksum512" => out.put_slice(&fixed_hex::<64>(ty, value)?),
        "public_key" => parsed::<PublicKey>(ty, value)?.encode(out),
        "signature" => parsed::<Signature>(ty, value)?.encode(out),
        "symbol" => parsed::<Symbol>(ty, value)?.encode(out),
        "symbol_code" => parsed::<SymbolCode>(ty, value)?.encode(out),
        "asset" => parsed::<Asset>(ty, value)?.encode(out),
        "extended_asset" => {
            let (quantity, contract) = extended_asset_fields(value)?;
            parsed::<Asset>("asset", quantity)?.encode(out);
            parsed::<Name>("name", contract)?.encode(out);
        }
        _ => return Err(AbiError::UnknownType(ty.to_owned())),
    }
    Ok(())
}

/// Reads a builtin value. 64-bit and wider integers come back as strings so
/// they survive JSON consumers limited to doubles.
pub(crate) fn decode(ty: &str, buf: &mut &[u8]) -> Result<Value, AbiError> {
    let value = match ty {
        "bool" => json!(bool::decode(buf)?),
        "int8" => json!(u8::decode(buf)? as i8),
        "uint8" => json!(u8::decode(buf)?),
        "int16" => json!(i16::decode(buf)?),
        "uint16" => json!(u16::decode(buf)?),
        "int32" => json!(i32::decode(buf)?),
        "uint32" => json!(u32::decode(buf)?),
        "int64" => json!(i64::decode(buf)?.to_string()),
        "uint64" => json!(u64::decode(buf)?.to_string()),
        "int128" => json!(i128::from_le_bytes(take_array(buf)?).to_string()),
        "uint128" => json!(u128::from_le_bytes(take_array(buf)?).to_string()),
        "varint32" => json!(read_varint32(buf)?),
        "varuint32" => json!(read_varuint32(buf)?),
        "float32" => json!(f32::from_le_bytes(take_array(buf)?)),
        "float64" => json!(f64::from_le_bytes(take_array(buf)?)),
        "float128" => json!(hex::encode(take(buf, 16)?)),
        "time_point" => json!(TimePoint::decode(buf)?.to_string()),
        "time_point_sec" => json!(TimePointSec::decode(buf)?.to_string()),
        "block_timestamp_type" => json!(BlockTimestamp::decode(buf)?.to_string()),
        "name" => json!(Name::decode(buf)?.to_string()),
        "bytes" => json!(Bytes::decode(buf)?.to_string()),
        "string" => json!(String::decode(buf)?),
        "checksum160" => json!(hex::encode(take(buf, 20)?)),
        "checksum256" => json!(hex::encode(take(buf, 32)?)),
        "checksum512" => json!(hex::encode(take(buf, 64)?)),
        "public_key" => json!(PublicKey::decode(buf)?.to_string()),
        "signature" => json!(Signature::decode(buf)?.to_string()),
        "symbol" => json!(Symbol::decode(buf)?.to_string()),
        "symbol_code" => json!(SymbolCode::decode(buf)?.to_string()),
        "asset" => json!(Asset::decode(buf)?.to_string()),
        "extended_asset" => {
            let mut obj = Map::new();
            obj.insert("quantity".into(), json!(Asset::decode(buf)?.to_string()));
            obj.insert("contract".into(), json!(Name::decode(buf)?.to_string()));
            Value::Object(obj)
        }
        _ => return Err(AbiError::UnknownType(ty.to_owned())),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(ty: &str, value: Value) -> String {
        let mut out = Vec::new();
        encode(ty, &value, &mut out).unwrap();
        hex::encode(out)
    }

    #[test]
    fn integers_accept_numbers_and_strings() {
        assert_eq!(encoded("uint16", json!(0x1234)), "3412");
        assert_eq!(encoded("int32", json!(-1)), "ffffffff");
        assert_eq!(encoded("uint64", json!("18446744073709551615")), "ffffffffffffffff");
        assert_eq!(encoded("varuint32", json!(300)), "ac02");
        assert_eq!(encoded("varint32", json!(-1)), "01");
    }

    #[test]
    fn integers_are_range_checked() {
        let mut out = Vec::new();
        assert!(matches!(
            encode("uint8", &json!(256), &mut out),
            Err(AbiError::InvalidValue { .. })
        ));
        assert!(matches!(
            encode("uint32", &json!(-1), &mut out),
            Err(AbiError::InvalidValue { .. })
        ));
        assert!(matches!(
            encode("int16", &json!(1.5), &mut out),
            Err(AbiError::InvalidValue { .. })
        ));
    }

    #[test]
    fn wide_integers_decode_as_strings() {
        let raw = hex::decode("ffffffffffffffff").unwrap();
        assert_eq!(decode("uint64", &mut raw.as_slice()).unwrap(), json!("18446744073709551615"));
        assert_eq!(decode("int64", &mut raw.as_slice()).unwrap(), json!("-1"));
        assert_eq!(decode("uint32", &mut &raw[..4]).unwrap(), json!(4294967295u32));
    }

    #[test]
    fn chain_types() {
        assert_eq!(encoded("name", json!("eosio")), "0000000000ea3055");
        assert_eq!(encoded("asset", json!("1.0000 EOS")), "102700000000000004454f5300000000");
        assert_eq!(encoded("symbol", json!("4,EOS")), "04454f5300000000");
        assert_eq!(encoded("bytes", json!("beef")), "02beef");
        assert_eq!(encoded("string", json!("hi")), "026869");
        assert_eq!(
            encoded(
                "extended_asset",
                json!({ "quantity": "1.0000 EOS", "contract": "eosio" })
            ),
            "102700000000000004454f53000000000000000000ea3055"
        );
    }

    #[test]
    fn extended_asset_rejects_unknown_fields() {
        let mut out = Vec::new();
        let err = encode(
            "extended_asset",
            &json!({ "quantity": "1.0000 EOS", "contract": "eosio", "memo": "" }),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, AbiError::UnexpectedField { .. }));
    }

    #[test]
    fn unknown_type() {
        let mut out = Vec::new();
        assert_eq!(
            encode("uint7", &json!(1), &mut out).unwrap_err(),
            AbiError::UnknownType("uint7".into())
        );
        assert!(!is_builtin("uint7"));
        assert!(is_builtin("checksum256"));
    }
}

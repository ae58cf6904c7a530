use super::{builtin, AbiDef, AbiError, StructDef, VariantDef};
use crate::{
    codec::{read_varuint32, write_varuint32, Decodable},
    types::{Bytes, Name},
};
use bytes::BufMut;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Nesting depth past which a type is treated as self-referential
pub const MAX_TYPE_DEPTH: usize = 32;

/// An ABI indexed for converting between JSON values and their binary form.
///
/// Type names may carry one suffix per level: `T[]` is a length-prefixed
/// sequence, `T?` a flag-prefixed optional and `T$` a binary extension which
/// may be absent at the end of a struct.
#[derive(Clone, Debug, Default)]
pub struct Abi {
    def: AbiDef,
    aliases: HashMap<String, String>,
    structs: HashMap<String, StructDef>,
    variants: HashMap<String, VariantDef>,
    actions: HashMap<Name, String>,
}

impl Abi {
    pub fn new(def: AbiDef) -> Self {
        let aliases =
            def.types.iter().map(|t| (t.new_type_name.clone(), t.ty.clone())).collect();
        let structs = def.structs.iter().map(|s| (s.name.clone(), s.clone())).collect();
        let variants = def.variants.iter().map(|v| (v.name.clone(), v.clone())).collect();
        let actions = def.actions.iter().map(|a| (a.name, a.ty.clone())).collect();
        Self { def, aliases, structs, variants, actions }
    }

    /// Parses the binary ABI document returned by `get_raw_abi`
    pub fn from_bytes(raw: &[u8]) -> Result<Self, AbiError> {
        Ok(Self::new(AbiDef::decode_exact(raw)?))
    }

    pub fn def(&self) -> &AbiDef {
        &self.def
    }

    /// Name of the struct carrying the data of `action`
    pub fn action_type(&self, action: Name) -> Option<&str> {
        self.actions.get(&action).map(String::as_str)
    }

    /// Encodes `value` as an instance of `ty`
    pub fn encode(&self, ty: &str, value: &Value) -> Result<Vec<u8>, AbiError> {
        let mut out = Vec::new();
        self.encode_value(ty, value, &mut out, 0)?;
        Ok(out)
    }

    /// Decodes an instance of `ty` which must span all of `data`
    pub fn decode(&self, ty: &str, mut data: &[u8]) -> Result<Value, AbiError> {
        let value = self.decode_value(ty, &mut data, 0)?;
        if !data.is_empty() {
            return Err(crate::codec::DecodeError::TrailingBytes(data.len()).into())
        }
        Ok(value)
    }

    pub fn encode_action_data(&self, action: Name, data: &Value) -> Result<Bytes, AbiError> {
        let ty = self.action_type(action).ok_or(AbiError::UnknownAction(action))?;
        self.encode(ty, data).map(Bytes::from)
    }

    pub fn decode_action_data(&self, action: Name, data: &[u8]) -> Result<Value, AbiError> {
        let ty = self.action_type(action).ok_or(AbiError::UnknownAction(action))?;
        self.decode(ty, data)
    }

    fn encode_value(
        &self,
        ty: &str,
        value: &Value,
        out: &mut dyn BufMut,
        depth: usize,
    ) -> Result<(), AbiError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::RecursionLimit(MAX_TYPE_DEPTH))
        }
        if let Some(inner) = ty.strip_suffix("[]") {
            let items = value
                .as_array()
                .ok_or_else(|| AbiError::invalid(ty, format!("expected an array, got {value}")))?;
            write_varuint32(out, items.len() as u32);
            for item in items {
                self.encode_value(inner, item, out, depth + 1)?;
            }
            return Ok(())
        }
        if let Some(inner) = ty.strip_suffix('?') {
            if value.is_null() {
                out.put_u8(0);
                return Ok(())
            }
            out.put_u8(1);
            return self.encode_value(inner, value, out, depth + 1)
        }
        if let Some(inner) = ty.strip_suffix('$') {
            return self.encode_value(inner, value, out, depth + 1)
        }
        if builtin::is_builtin(ty) {
            return builtin::encode(ty, value, out)
        }
        if let Some(target) = self.aliases.get(ty) {
            return self.encode_value(target, value, out, depth + 1)
        }
        if let Some(def) = self.structs.get(ty) {
            return self.encode_struct(def, value, out, depth)
        }
        if let Some(def) = self.variants.get(ty) {
            return self.encode_variant(def, value, out, depth)
        }
        Err(AbiError::UnknownType(ty.to_owned()))
    }

    fn encode_struct(
        &self,
        def: &StructDef,
        value: &Value,
        out: &mut dyn BufMut,
        depth: usize,
    ) -> Result<(), AbiError> {
        let obj = value.as_object().ok_or_else(|| {
            AbiError::invalid(&def.name, format!("expected an object, got {value}"))
        })?;
        let chain = self.struct_chain(def, depth)?;
        if let Some(extra) = obj
            .keys()
            .find(|key| !chain.iter().any(|s| s.fields.iter().any(|f| &f.name == *key)))
        {
            return Err(AbiError::UnexpectedField { strukt: def.name.clone(), field: extra.clone() })
        }

        // once an extension field is absent every later field must be too
        let mut absent_extension: Option<&str> = None;
        for strukt in chain {
            for field in &strukt.fields {
                match (obj.get(&field.name), absent_extension) {
                    (Some(_), Some(skipped)) => {
                        return Err(AbiError::invalid(
                            &def.name,
                            format!("`{}` is set but extension `{skipped}` is not", field.name),
                        ))
                    }
                    (Some(field_value), None) => {
                        self.encode_value(&field.ty, field_value, out, depth + 1)?
                    }
                    (None, _) if field.ty.ends_with('$') => absent_extension = Some(field.name.as_str()),
                    (None, _) => {
                        return Err(AbiError::MissingField {
                            strukt: strukt.name.clone(),
                            field: field.name.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_variant(
        &self,
        def: &VariantDef,
        value: &Value,
        out: &mut dyn BufMut,
        depth: usize,
    ) -> Result<(), AbiError> {
        let (case, inner) = match value.as_array().map(Vec::as_slice) {
            Some([Value::String(case), inner]) => (case, inner),
            _ => {
                return Err(AbiError::invalid(
                    &def.name,
                    format!("expected [\"type\", value], got {value}"),
                ))
            }
        };
        let index = def.types.iter().position(|t| t == case).ok_or_else(|| {
            AbiError::UnknownVariantCase { variant: def.name.clone(), case: case.clone() }
        })?;
        write_varuint32(out, index as u32);
        self.encode_value(case, inner, out, depth + 1)
    }

    fn decode_value(&self, ty: &str, buf: &mut &[u8], depth: usize) -> Result<Value, AbiError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::RecursionLimit(MAX_TYPE_DEPTH))
        }
        if let Some(inner) = ty.strip_suffix("[]") {
            let len = read_varuint32(buf)? as usize;
            let mut items = Vec::with_capacity(len.min(buf.len()));
            for _ in 0..len {
                items.push(self.decode_value(inner, buf, depth + 1)?);
            }
            return Ok(Value::Array(items))
        }
        if let Some(inner) = ty.strip_suffix('?') {
            return if bool::decode(buf)? {
                self.decode_value(inner, buf, depth + 1)
            } else {
                Ok(Value::Null)
            }
        }
        if let Some(inner) = ty.strip_suffix('$') {
            return self.decode_value(inner, buf, depth + 1)
        }
        if builtin::is_builtin(ty) {
            return builtin::decode(ty, buf)
        }
        if let Some(target) = self.aliases.get(ty) {
            return self.decode_value(target, buf, depth + 1)
        }
        if let Some(def) = self.structs.get(ty) {
            let mut obj = Map::new();
            for strukt in self.struct_chain(def, depth)? {
                for field in &strukt.fields {
                    if buf.is_empty() && field.ty.ends_with('$') {
                        return Ok(Value::Object(obj))
                    }
                    obj.insert(field.name.clone(), self.decode_value(&field.ty, buf, depth + 1)?);
                }
            }
            return Ok(Value::Object(obj))
        }
        if let Some(def) = self.variants.get(ty) {
            let index = read_varuint32(buf)?;
            let case = def.types.get(index as usize).ok_or_else(|| {
                AbiError::VariantIndexOutOfRange { variant: def.name.clone(), index }
            })?;
            let inner = self.decode_value(case, buf, depth + 1)?;
            return Ok(Value::Array(vec![Value::String(case.clone()), inner]))
        }
        Err(AbiError::UnknownType(ty.to_owned()))
    }

    /// `def` and its bases, outermost base first
    fn struct_chain<'a>(
        &'a self,
        def: &'a StructDef,
        depth: usize,
    ) -> Result<Vec<&'a StructDef>, AbiError> {
        let mut chain = vec![def];
        let mut current = def;
        while !current.base.is_empty() {
            if depth + chain.len() > MAX_TYPE_DEPTH {
                return Err(AbiError::RecursionLimit(MAX_TYPE_DEPTH))
            }
            current = self
                .resolve_struct(&current.base)
                .ok_or_else(|| AbiError::UnknownType(current.base.clone()))?;
            chain.push(current);
        }
        chain.reverse();
        Ok(chain)
    }

    fn resolve_struct<'a>(&'a self, mut ty: &'a str) -> Option<&'a StructDef> {
        for _ in 0..MAX_TYPE_DEPTH {
            match self.aliases.get(ty) {
                Some(target) => ty = target,
                None => return self.structs.get(ty),
            }
        }
        None
    }
}

impl From<AbiDef> for Abi {
    fn from(def: AbiDef) -> Self {
        Self::new(def)
    }
}

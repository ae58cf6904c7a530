//! The ABI definition document and its binary form.
use crate::{
    codec::{read_varuint32, DecodeError, Decodable, Encodable},
    types::{Bytes, Name},
};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// Version string written by current toolchains
pub const ABI_VERSION: &str = "eosio::abi/1.2";

macro_rules! abi_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty ),*
        }

        impl Encodable for $name {
            fn encode(&self, out: &mut dyn BufMut) {
                $( self.$field.encode(out); )*
            }
        }

        impl Decodable for $name {
            fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
                Ok(Self { $( $field: Decodable::decode(buf)? ),* })
            }
        }
    };
}

abi_struct! {
    /// `new_type_name` is an alias of `ty`
    pub struct TypeDef {
        pub new_type_name: String,
        #[serde(rename = "type")]
        pub ty: String,
    }
}

abi_struct! {
    pub struct FieldDef {
        pub name: String,
        #[serde(rename = "type")]
        pub ty: String,
    }
}

abi_struct! {
    /// A record type. Fields of `base` (if non-empty) come first on the wire.
    pub struct StructDef {
        pub name: String,
        #[serde(default)]
        pub base: String,
        pub fields: Vec<FieldDef>,
    }
}

abi_struct! {
    pub struct ActionDef {
        pub name: Name,
        #[serde(rename = "type")]
        pub ty: String,
        #[serde(default)]
        pub ricardian_contract: String,
    }
}

abi_struct! {
    pub struct TableDef {
        pub name: Name,
        #[serde(default)]
        pub index_type: String,
        #[serde(default)]
        pub key_names: Vec<String>,
        #[serde(default)]
        pub key_types: Vec<String>,
        #[serde(rename = "type")]
        pub ty: String,
    }
}

abi_struct! {
    pub struct ClausePair {
        pub id: String,
        pub body: String,
    }
}

abi_struct! {
    pub struct ErrorMessage {
        pub error_code: u64,
        pub error_msg: String,
    }
}

abi_struct! {
    pub struct AbiExtension {
        pub tag: u16,
        pub value: Bytes,
    }
}

abi_struct! {
    /// A tagged union; values are written as `["case_type", value]`
    pub struct VariantDef {
        pub name: String,
        pub types: Vec<String>,
    }
}

abi_struct! {
    pub struct ActionResultDef {
        pub name: Name,
        pub result_type: String,
    }
}

/// A contract's ABI document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDef {
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub ricardian_clauses: Vec<ClausePair>,
    #[serde(default)]
    pub error_messages: Vec<ErrorMessage>,
    #[serde(default)]
    pub abi_extensions: Vec<AbiExtension>,
    #[serde(default)]
    pub variants: Vec<VariantDef>,
    #[serde(default)]
    pub action_results: Vec<ActionResultDef>,
}

impl Encodable for AbiDef {
    fn encode(&self, out: &mut dyn BufMut) {
        self.version.encode(out);
        self.types.encode(out);
        self.structs.encode(out);
        self.actions.encode(out);
        self.tables.encode(out);
        self.ricardian_clauses.encode(out);
        self.error_messages.encode(out);
        self.abi_extensions.encode(out);
        self.variants.encode(out);
        self.action_results.encode(out);
    }
}

impl Decodable for AbiDef {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let mut abi = Self {
            version: String::decode(buf)?,
            types: Vec::decode(buf)?,
            structs: Vec::decode(buf)?,
            actions: Vec::decode(buf)?,
            tables: Vec::decode(buf)?,
            ricardian_clauses: Vec::decode(buf)?,
            error_messages: Vec::decode(buf)?,
            abi_extensions: Vec::decode(buf)?,
            ..Default::default()
        };
        // binary extensions: older documents simply end early
        if !buf.is_empty() {
            abi.variants = Vec::decode(buf)?;
        }
        if !buf.is_empty() {
            abi.action_results = Vec::decode(buf)?;
        }
        if !buf.is_empty() && read_varuint32(buf)? != 0 {
            return Err(DecodeError::Custom("kv_tables are not supported"))
        }
        Ok(abi)
    }
}

//! Contract ABIs: the document format and a JSON ⇄ binary serializer driven by it.

mod def;
pub use def::{
    AbiDef, AbiExtension, ActionDef, ActionResultDef, ClausePair, ErrorMessage, FieldDef,
    StructDef, TableDef, TypeDef, VariantDef, ABI_VERSION,
};

mod error;
pub use error::AbiError;

mod builtin;
pub use builtin::BUILTIN_TYPES;

mod serializer;
pub use serializer::{Abi, MAX_TYPE_DEPTH};

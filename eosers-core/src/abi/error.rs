use crate::{codec::DecodeError, types::Name};
use thiserror::Error;

/// Error produced while encoding or decoding data against an ABI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// The type is neither builtin nor declared by the ABI
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// The contract's ABI has no entry for the action
    #[error("unknown action `{0}`")]
    UnknownAction(Name),
    /// The value does not fit the type
    #[error("invalid value for `{ty}`: {reason}")]
    InvalidValue { ty: String, reason: String },
    #[error("missing field `{strukt}.{field}`")]
    MissingField { strukt: String, field: String },
    #[error("unexpected field `{strukt}.{field}`")]
    UnexpectedField { strukt: String, field: String },
    /// A variant value named a case the variant does not have
    #[error("variant `{variant}` has no case `{case}`")]
    UnknownVariantCase { variant: String, case: String },
    /// A decoded variant index is out of bounds
    #[error("variant `{variant}` has no case at index {index}")]
    VariantIndexOutOfRange { variant: String, index: u32 },
    /// Type definitions nest or alias each other too deeply
    #[error("type nesting exceeds {0} levels")]
    RecursionLimit(usize),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl AbiError {
    pub(crate) fn invalid(ty: &str, reason: impl ToString) -> Self {
        AbiError::InvalidValue { ty: ty.to_owned(), reason: reason.to_string() }
    }
}

use crate::ApiError;
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// Inspection of the errors a [`crate::EosioClient`] transport returns.
///
/// Transport errors are type-erased once they reach a [`ProviderError`], so
/// this trait is how callers get back at the node's error body or at a
/// response that failed to decode.
pub trait RpcError: Error + Debug + Send + Sync {
    /// The error body the node answered with, if it answered at all
    fn as_error_response(&self) -> Option<&ApiError>;

    /// The decoding failure of a response, if that is what went wrong
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// The chain exception code of a node rejection, e.g. `3040005` for an
    /// expired transaction
    fn chain_error_code(&self) -> Option<u64> {
        self.as_error_response().map(|err| err.error.code)
    }
}

/// Errors of a [`crate::Middleware`] layer.
///
/// Every layer wraps the error type of the layer below it, down to the
/// [`ProviderError`] at the bottom of the stack. The provided methods walk
/// that chain so a node rejection can be inspected from the top of any
/// stack.
pub trait MiddlewareError: Error + Sized + Send + Sync {
    /// The error type of the next layer down
    type Inner: MiddlewareError;

    /// Wraps an error raised by the next layer down
    fn from_err(e: Self::Inner) -> Self;

    /// Returns the wrapped error of the next layer down, or `None` when the
    /// error was raised by this layer
    fn as_inner(&self) -> Option<&Self::Inner>;

    /// Walks the stack down to the provider's error
    fn as_provider_error(&self) -> Option<&ProviderError> {
        self.as_inner()?.as_provider_error()
    }

    /// Lifts a provider error through the error types of every layer
    fn from_provider_err(p: ProviderError) -> Self {
        Self::from_err(Self::Inner::from_provider_err(p))
    }

    /// The node's error body, unchanged
    fn as_error_response(&self) -> Option<&ApiError> {
        RpcError::as_error_response(self.as_provider_error()?)
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        RpcError::as_serde_error(self.as_provider_error()?)
    }
}

#[derive(Debug, Error)]
/// An error thrown when making a call to the provider
pub enum ProviderError {
    /// The transport failed or the node rejected the request
    #[error("{0}")]
    EosioClientError(Box<dyn RpcError>),

    /// A response did not have the expected shape
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// A base64 field of a response could not be decoded
    #[error("invalid base64 in response: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The HTTP request could not be completed
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&ApiError> {
        match self {
            ProviderError::EosioClientError(err) => err.as_error_response(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::EosioClientError(err) => err.as_serde_error(),
            ProviderError::SerdeJson(err) => Some(err),
            _ => None,
        }
    }
}

// the stack ends here
impl MiddlewareError for ProviderError {
    type Inner = Self;

    fn from_err(e: Self::Inner) -> Self {
        e
    }

    fn as_inner(&self) -> Option<&Self::Inner> {
        None
    }

    fn as_provider_error(&self) -> Option<&ProviderError> {
        Some(self)
    }

    fn from_provider_err(p: ProviderError) -> Self {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiErrorInfo, MockError};

    fn expired() -> ApiError {
        ApiError {
            code: 500,
            message: "Internal Service Error".to_owned(),
            error: ApiErrorInfo {
                code: 3040005,
                name: "expired_tx_exception".to_owned(),
                what: "Expired Transaction".to_owned(),
                details: vec![],
            },
        }
    }

    #[test]
    fn node_rejection_is_reachable_through_the_box() {
        let err = ProviderError::from(MockError::ApiError(expired()));

        assert_eq!(RpcError::as_error_response(&err), Some(&expired()));
        assert_eq!(err.chain_error_code(), Some(3040005));
        assert_eq!(MiddlewareError::as_error_response(&err), Some(&expired()));
        assert!(RpcError::as_serde_error(&err).is_none());
    }

    #[test]
    fn decoding_failures_are_not_rejections() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ProviderError::from(serde_err);

        assert!(RpcError::as_serde_error(&err).is_some());
        assert_eq!(err.chain_error_code(), None);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The error body returned by a chain API node.
///
/// Ledger-side rejections (expired or duplicate transactions, exhausted
/// resources, failed authorization) arrive in this shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
pub struct ApiError {
    /// The HTTP status mirrored in the body
    pub code: u16,
    pub message: String,
    pub error: ApiErrorInfo,
}

/// The chain exception carried by an [`ApiError`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorInfo {
    /// The chain's numeric exception code
    pub code: u64,
    pub name: String,
    pub what: String,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub method: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}: {}", self.code, self.error.name, self.error.what)?;
        for detail in &self.error.details {
            write!(f, "; {}", detail.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deser_api_error() {
        let err: ApiError = serde_json::from_str(
            r#"{
                "code": 500,
                "message": "Internal Service Error",
                "error": {
                    "code": 3040005,
                    "name": "expired_tx_exception",
                    "what": "Expired Transaction",
                    "details": [{
                        "message": "expired transaction 1a2b",
                        "file": "producer_plugin.cpp",
                        "line_number": 378,
                        "method": "on_incoming_transaction_async"
                    }]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(err.error.code, 3040005);
        assert_eq!(
            err.to_string(),
            "(500) expired_tx_exception: Expired Transaction; expired transaction 1a2b"
        );
    }
}

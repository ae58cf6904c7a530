use crate::{ApiError, EosioClient, ProviderError, RpcError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    borrow::Borrow,
    collections::VecDeque,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};
use thiserror::Error;

/// A request as the mock saw it. Zero-sized params carry no body, matching
/// what the HTTP transport sends for them.
#[derive(Clone, Debug, PartialEq)]
struct RecordedRequest {
    endpoint: String,
    body: Option<Value>,
}

/// A canned answer for the [`MockProvider`]
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// A successful response body
    Value(Value),

    /// A node rejection
    Error(ApiError),
}

#[derive(Clone, Debug, Default)]
/// Mock transport used in test environments.
///
/// Responses are served in the order they were pushed, and requests are
/// asserted in the order they were made. Clones share both queues, so the
/// handle returned by [`crate::Provider::mocked`] sees what the provider did.
pub struct MockProvider {
    requests: Arc<Mutex<VecDeque<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

// a failed assertion must not poison the queues for the test's other handles
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn body_of<T: Serialize>(params: T) -> Result<Option<Value>, serde_json::Error> {
    if std::mem::size_of::<T>() == 0 {
        Ok(None)
    } else {
        serde_json::to_value(params).map(Some)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EosioClient for MockProvider {
    type Error = MockError;

    /// Records the request, then answers with the oldest pushed response
    async fn request<T, R>(&self, endpoint: &str, params: T) -> Result<R, MockError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let body = body_of(params)?;
        lock(&self.requests).push_back(RecordedRequest { endpoint: endpoint.to_owned(), body });
        match lock(&self.responses).pop_front().ok_or(MockError::EmptyResponses)? {
            MockResponse::Value(value) => Ok(serde_json::from_value(value)?),
            MockResponse::Error(error) => Err(MockError::ApiError(error)),
        }
    }
}

impl MockProvider {
    /// Instantiates a mock transport with empty queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that the oldest unchecked request went to `endpoint` with
    /// `params` as its body
    pub fn assert_request<T: Serialize>(&self, endpoint: &str, params: T) -> Result<(), MockError> {
        let expected = RecordedRequest { endpoint: endpoint.to_owned(), body: body_of(params)? };
        let actual = lock(&self.requests).pop_front().ok_or(MockError::EmptyRequests)?;
        if actual != expected {
            return Err(MockError::RequestMismatch {
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
            })
        }
        Ok(())
    }

    /// Number of requests made and not yet asserted
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Queues a successful response
    pub fn push<T: Serialize + Send + Sync, K: Borrow<T>>(&self, data: K) -> Result<(), MockError> {
        let value = serde_json::to_value(data.borrow())?;
        self.push_response(MockResponse::Value(value));
        Ok(())
    }

    /// Queues a response or a node rejection
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }
}

#[derive(Error, Debug)]
/// Errors for the `MockProvider`
pub enum MockError {
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// A request was asserted but none is left
    #[error("no request left to assert")]
    EmptyRequests,

    /// A request was made but no response is left
    #[error("no response left, push one before making the request")]
    EmptyResponses,

    /// The oldest request differs from the asserted one
    #[error("expected request {expected}, got {actual}")]
    RequestMismatch { expected: String, actual: String },

    /// A queued node rejection
    #[error("node rejected the request: {0}")]
    ApiError(ApiError),
}

impl RpcError for MockError {
    fn as_error_response(&self) -> Option<&ApiError> {
        match self {
            MockError::ApiError(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::EosioClientError(Box::new(src))
    }
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::{ApiErrorInfo, Middleware};
    use eosers_core::types::ChainInfo;
    use serde_json::json;

    fn info(head: u32) -> Value {
        json!({
            "chain_id": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
            "head_block_num": head
        })
    }

    #[tokio::test]
    async fn records_requests_and_serves_responses_in_order() {
        let mock = MockProvider::new();
        mock.push::<Value, _>(info(1)).unwrap();
        mock.push::<Value, _>(info(2)).unwrap();

        let first: ChainInfo = mock.request("get_info", ()).await.unwrap();
        let second: ChainInfo =
            mock.request("get_block", json!({ "block_num_or_id": 1 })).await.unwrap();

        assert_eq!((first.head_block_num, second.head_block_num), (1, 2));
        assert_eq!(mock.pending_requests(), 2);
        mock.assert_request("get_info", ()).unwrap();
        mock.assert_request("get_block", json!({ "block_num_or_id": 1 })).unwrap();
    }

    #[tokio::test]
    async fn mismatched_request_is_reported() {
        let mock = MockProvider::new();
        mock.push::<Value, _>(info(1)).unwrap();
        let _: ChainInfo = mock.request("get_info", ()).await.unwrap();

        let err = mock.assert_request("get_block", ()).unwrap_err();
        assert!(matches!(err, MockError::RequestMismatch { .. }));
    }

    #[tokio::test]
    async fn empty_queues() {
        let mock = MockProvider::new();
        let err = mock.request::<_, ChainInfo>("get_info", ()).await.unwrap_err();
        assert!(matches!(err, MockError::EmptyResponses));

        let mock = MockProvider::new();
        let err = mock.assert_request("get_info", ()).unwrap_err();
        assert!(matches!(err, MockError::EmptyRequests));
    }

    #[tokio::test]
    async fn serves_node_rejections() {
        let mock = MockProvider::new();
        let error = ApiError {
            code: 500,
            message: "Internal Service Error".to_string(),
            error: ApiErrorInfo {
                code: 3040005,
                name: "expired_tx_exception".to_string(),
                what: "Expired Transaction".to_string(),
                details: vec![],
            },
        };
        mock.push_response(MockResponse::Error(error.clone()));

        let err = mock.request::<_, ChainInfo>("get_info", ()).await.unwrap_err();
        assert_eq!(err.as_error_response(), Some(&error));
        assert_eq!(err.chain_error_code(), Some(3040005));
    }

    #[tokio::test]
    async fn composes_with_provider() {
        let (provider, mock) = crate::Provider::mocked();

        mock.push::<Value, _>(info(12)).unwrap();
        let info = provider.get_info().await.unwrap();
        assert_eq!(info.head_block_num, 12);
        mock.assert_request("get_info", ()).unwrap();
    }
}

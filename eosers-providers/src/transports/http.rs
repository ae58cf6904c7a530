use crate::{errors::ProviderError, ApiError, EosioClient, RpcError};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, str::FromStr};
use thiserror::Error;
use tracing::trace;
use url::Url;

/// A low-level client for the chain API over HTTP.
///
/// Every endpoint is a `POST` to `{url}/v1/chain/{endpoint}` with a JSON body.
///
/// # Example
///
/// ```no_run
/// use eosers_core::types::ChainInfo;
/// use eosers_providers::{EosioClient, Http};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Http::from_str("http://localhost:8888")?;
/// let info: ChainInfo = provider.request("get_info", ()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider {
    client: Client,
    url: Url,
}

#[derive(Error, Debug)]
/// Error thrown when sending an HTTP request
pub enum ClientError {
    /// The request could not be sent or its response not read
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// The node rejected the request
    #[error("node rejected the request: {0}")]
    ApiError(#[from] ApiError),

    /// The response body was not the expected JSON
    #[error("could not decode response: {err}. Response: {text}")]
    SerdeJson { err: serde_json::Error, text: String },
}

impl RpcError for ClientError {
    fn as_error_response(&self) -> Option<&ApiError> {
        match self {
            ClientError::ApiError(err) => Some(err),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ClientError::SerdeJson { err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for ProviderError {
    fn from(src: ClientError) -> Self {
        match src {
            ClientError::ReqwestError(err) => ProviderError::Http(err),
            other => ProviderError::EosioClientError(Box::new(other)),
        }
    }
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ClientError> {
    serde_json::from_slice(body).map_err(|err| ClientError::SerdeJson {
        err,
        text: String::from_utf8_lossy(body).into_owned(),
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EosioClient for Provider {
    type Error = ClientError;

    /// Posts the params as JSON. Zero-sized params send no body. Any non-2xx
    /// answer is decoded as the node's error body.
    async fn request<T, R>(&self, endpoint: &str, params: T) -> Result<R, ClientError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let mut req = self.client.post(self.endpoint_url(endpoint));
        if std::mem::size_of::<T>() != 0 {
            req = req.json(&params);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        trace!(endpoint, %status, len = body.len(), "received response");

        if status.is_success() {
            decode(&body)
        } else {
            Err(ClientError::ApiError(decode(&body)?))
        }
    }
}

impl Provider {
    /// Initializes a new HTTP Client
    ///
    /// # Example
    ///
    /// ```
    /// use eosers_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:8888").unwrap();
    /// let provider = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// Builds the transport on top of a preconfigured `reqwest` client, e.g.
    /// one with custom timeouts or headers
    pub fn new_with_client(url: impl Into<Url>, client: Client) -> Self {
        Self { client, url: url.into() }
    }

    /// The node's base URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/v1/chain/{endpoint}", self.url.as_str().trim_end_matches('/'))
    }
}

impl FromStr for Provider {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Ok(Provider::new(Url::parse(src)?))
    }
}

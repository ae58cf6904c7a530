use crate::{
    errors::ProviderError, EosioClient, GetBlockParams, GetRawAbiParams, Http as HttpProvider,
    Middleware, MockProvider, PackedTransaction, PushTransactionArgs, PushTransactionResponse,
    RawAbi,
};

use async_trait::async_trait;
use eosers_core::{
    types::{Block, BlockId, ChainInfo, Name, Transaction},
    utils::DEFAULT_EXPIRE_SECONDS,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, fmt::Debug};
use tracing::{debug, trace};
use tracing_futures::Instrument;
use url::{ParseError, Url};

/// An abstract provider for interacting with the chain API of a node. Must be
/// instantiated with a data transport which implements the
/// [`EosioClient`](trait@crate::EosioClient) trait (e.g. [HTTP](crate::Http)).
///
/// # Example
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use eosers_providers::{Middleware, Provider, Http};
/// use std::convert::TryFrom;
///
/// let provider = Provider::<Http>::try_from("http://localhost:8888")
///     .expect("could not instantiate HTTP Provider");
///
/// let info = provider.get_info().await?;
/// let block = provider.get_block(info.head_block_num).await?;
/// println!("Got block: {}", serde_json::to_string(&block)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
    expire_seconds: u32,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

impl<P: EosioClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self { inner: provider, expire_seconds: DEFAULT_EXPIRE_SECONDS }
    }

    /// Sets how long after the reference block filled-in transactions expire
    #[must_use]
    pub fn expire_seconds(mut self, secs: u32) -> Self {
        self.expire_seconds = secs;
        self
    }

    /// The expiration window applied by [`Middleware::fill_transaction`]
    pub fn get_expire_seconds(&self) -> u32 {
        self.expire_seconds
    }

    /// Make a chain API request via the internal connection, and return the result.
    pub async fn request<T, R>(&self, endpoint: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        let span = tracing::trace_span!(
            "rpc",
            endpoint = endpoint,
            params = ?serde_json::to_string(&params)?
        );
        let res = async move {
            trace!("tx");
            let res: R = self.inner.request(endpoint, params).await.map_err(Into::into)?;
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<P: EosioClient> Middleware for Provider<P> {
    type Error = ProviderError;
    type Provider = P;
    type Inner = Self;

    fn inner(&self) -> &Self::Inner {
        unreachable!("There is no inner provider here")
    }

    fn provider(&self) -> &Provider<Self::Provider> {
        self
    }

    fn convert_err(p: ProviderError) -> Self::Error {
        // no conversion necessary
        p
    }

    async fn get_info(&self) -> Result<ChainInfo, Self::Error> {
        self.request("get_info", ()).await
    }

    async fn get_block<T: Into<BlockId> + Send + Sync>(
        &self,
        block: T,
    ) -> Result<Block, Self::Error> {
        self.request("get_block", GetBlockParams { block_num_or_id: block.into() }).await
    }

    async fn get_raw_abi(&self, account: Name) -> Result<RawAbi, Self::Error> {
        self.request("get_raw_abi", GetRawAbiParams { account_name: account }).await
    }

    async fn fill_transaction<D: Send + Sync>(
        &self,
        tx: &mut Transaction<D>,
    ) -> Result<(), Self::Error> {
        if tx.has_complete_header() {
            return Ok(())
        }

        let info = self.get_info().await?;
        let block = self.get_block(info.head_block_num).await?;
        let tapos = block.tapos(self.expire_seconds);
        debug!(
            block_num = block.block_num,
            expiration = %tapos.expiration,
            "derived reference block header"
        );
        tx.merge_tapos(tapos);
        Ok(())
    }

    async fn push_transaction(
        &self,
        tx: PushTransactionArgs,
    ) -> Result<PushTransactionResponse, Self::Error> {
        self.request("push_transaction", PackedTransaction::from(tx)).await
    }
}

impl Provider<MockProvider> {
    /// Returns a provider backed by a [`MockProvider`], along with a handle to
    /// the mock for queueing responses and asserting requests.
    ///
    /// # Example
    ///
    /// ```
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// use eosers_providers::{Middleware, Provider};
    /// let (provider, mock) = Provider::mocked();
    /// mock.push::<serde_json::Value, _>(serde_json::json!({
    ///     "chain_id": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
    ///     "head_block_num": 12
    /// }))?;
    /// let info = provider.get_info().await?;
    /// assert_eq!(info.head_block_num, 12);
    /// mock.assert_request("get_info", ())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        (Self::new(mock.clone()), mock)
    }
}

impl TryFrom<&str> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(HttpProvider::new(Url::parse(src)?)))
    }
}

impl From<Url> for Provider<HttpProvider> {
    fn from(url: Url) -> Self {
        Provider::new(HttpProvider::new(url))
    }
}

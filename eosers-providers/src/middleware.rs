use async_trait::async_trait;
use auto_impl::auto_impl;
use eosers_core::types::{Block, BlockId, ChainInfo, Name, Transaction};
use std::fmt::Debug;

use crate::{
    EosioClient, MiddlewareError, Provider, ProviderError, PushTransactionArgs,
    PushTransactionResponse, RawAbi,
};

/// The chain API calls the signing pipeline needs, layered as an onion: each
/// middleware forwards what it does not handle to [`inner`](Middleware::inner)
/// and the [`Provider`] at the bottom talks to the node.
///
/// A layer points `inner` at the next layer, implements
/// [`MiddlewareError`](crate::MiddlewareError) on its error type and overrides
/// only the calls it changes.
///
/// ```
/// use async_trait::async_trait;
/// use eosers_providers::{
///     Middleware, MiddlewareError, PushTransactionArgs, PushTransactionResponse,
/// };
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use thiserror::Error;
///
/// /// Counts the transactions handed to the node
/// #[derive(Debug)]
/// struct PushCounter<M> {
///     inner: M,
///     pushed: AtomicUsize,
/// }
///
/// #[derive(Error, Debug)]
/// pub enum PushCounterError<M: Middleware> {
///     #[error("{0}")]
///     MiddlewareError(M::Error),
/// }
///
/// impl<M: Middleware> MiddlewareError for PushCounterError<M> {
///     type Inner = M::Error;
///
///     fn from_err(src: M::Error) -> Self {
///         PushCounterError::MiddlewareError(src)
///     }
///
///     fn as_inner(&self) -> Option<&Self::Inner> {
///         match self {
///             PushCounterError::MiddlewareError(e) => Some(e),
///         }
///     }
/// }
///
/// #[async_trait]
/// impl<M: Middleware> Middleware for PushCounter<M> {
///     type Error = PushCounterError<M>;
///     type Provider = M::Provider;
///     type Inner = M;
///
///     fn inner(&self) -> &M {
///         &self.inner
///     }
///
///     async fn push_transaction(
///         &self,
///         tx: PushTransactionArgs,
///     ) -> Result<PushTransactionResponse, Self::Error> {
///         self.pushed.fetch_add(1, Ordering::Relaxed);
///         self.inner().push_transaction(tx).await.map_err(MiddlewareError::from_err)
///     }
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[auto_impl(&, Box, Arc)]
pub trait Middleware: Sync + Send + Debug {
    /// Error type returned by most operations
    type Error: MiddlewareError<Inner = <<Self as Middleware>::Inner as Middleware>::Error>;
    /// The chain API client type at the bottom of the stack
    type Provider: EosioClient;
    /// The next-lower middleware in the middleware stack
    type Inner: Middleware<Provider = Self::Provider>;

    /// Get a reference to the next-lower middleware in the middleware stack
    fn inner(&self) -> &Self::Inner;

    /// Convert a provider error into the associated error type by successively
    /// converting it to every intermediate middleware error
    fn convert_err(p: ProviderError) -> Self::Error {
        Self::Error::from_provider_err(p)
    }

    /// The HTTP provider at the bottom of the stack.
    fn provider(&self) -> &Provider<Self::Provider> {
        self.inner().provider()
    }

    /// Returns the node's view of the chain head via `get_info`
    async fn get_info(&self) -> Result<ChainInfo, Self::Error> {
        self.inner().get_info().await.map_err(MiddlewareError::from_err)
    }

    /// Fetches a block by number or id
    async fn get_block<T: Into<BlockId> + Send + Sync>(
        &self,
        block: T,
    ) -> Result<Block, Self::Error> {
        self.inner().get_block(block).await.map_err(MiddlewareError::from_err)
    }

    /// Fetches the binary ABI deployed on `account`
    async fn get_raw_abi(&self, account: Name) -> Result<RawAbi, Self::Error> {
        self.inner().get_raw_abi(account).await.map_err(MiddlewareError::from_err)
    }

    /// Fills the transaction's missing reference-block header fields.
    ///
    /// This function is defined on providers to behave as follows:
    /// 1. if `expiration`, `ref_block_num` and `ref_block_prefix` are all set,
    /// return without making any request
    /// 2. otherwise fetch the head block number with `get_info` and that block
    /// with `get_block`
    /// 3. derive the header from the block and fill in only the fields the
    /// transaction does not already carry
    async fn fill_transaction<D: Send + Sync>(
        &self,
        tx: &mut Transaction<D>,
    ) -> Result<(), Self::Error> {
        self.inner().fill_transaction(tx).await.map_err(MiddlewareError::from_err)
    }

    /// Hands a signed, serialized transaction to the node. Rejections by the
    /// ledger are returned unchanged as the node reported them.
    async fn push_transaction(
        &self,
        tx: PushTransactionArgs,
    ) -> Result<PushTransactionResponse, Self::Error> {
        self.inner().push_transaction(tx).await.map_err(MiddlewareError::from_err)
    }
}

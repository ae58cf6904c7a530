#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::type_complexity)]
//! # Clients for interacting with EOSIO nodes
//!
//! This crate provides asynchronous clients for the `/v1/chain` API exposed by
//! EOSIO-family nodes.
//!
//! For the available calls, refer to the [`Middleware`](crate::Middleware)
//! trait, which [`Provider`](crate::Provider) implements at the bottom of a
//! middleware stack.
//!
//! # Examples
//!
//! ```no_run
//! use eosers_providers::{Provider, Http, Middleware};
//! use std::convert::TryFrom;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://localhost:8888")?;
//!
//! let info = provider.get_info().await?;
//! println!("Chain id: {}", info.chain_id);
//!
//! let abi = provider.get_raw_abi("eosio.token".parse()?).await?;
//! println!("Got abi for {}", abi.account_name);
//! # Ok(())
//! # }
//! ```
mod transports;
pub use transports::*;

mod provider;
pub use provider::Provider;

mod errors;
pub use errors::{MiddlewareError, ProviderError, RpcError};

mod middleware;
pub use middleware::Middleware;

mod types;
pub use types::*;

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{de::DeserializeOwned, Serialize};
use std::{error::Error, fmt::Debug};

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with the
/// chain API provider.
pub trait EosioClient: Debug + Send + Sync {
    /// A transport error
    type Error: Error + Into<ProviderError>;

    /// Sends a request to the named chain API endpoint with the parameters
    /// serialized as JSON
    async fn request<T, R>(&self, endpoint: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}

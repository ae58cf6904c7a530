#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # eosers
//!
//! A library for signing and broadcasting transactions on EOSIO-family
//! chains.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you.
//! Connect to a node by providing its URL to a [`Provider`], then wrap it in a
//! [`SignerMiddleware`] holding your keys.
//!
//! ```no_run
//! use eosers::prelude::*;
//! use serde_json::json;
//! use std::convert::TryFrom;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://localhost:8888")?;
//! let wallet: LocalWallet = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3".parse()?;
//! let chain_id = provider.get_info().await?.chain_id;
//! let client = SignerMiddleware::new(provider, chain_id, vec![wallet]);
//!
//! let transfer = Action::new(
//!     name!("eosio.token"),
//!     name!("transfer"),
//!     vec![PermissionLevel::new(name!("alice"), name!("active"))],
//!     json!({ "from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": "" }),
//! );
//! let receipt = client.send_transaction(Transaction::new(vec![transfer])).await?;
//! println!("included as {}", receipt.transaction_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`core`]: chain types, the binary and ABI codecs, transaction packing
//! and digests
//! - [`providers`]: the chain API client and the [`Middleware`] trait
//! - [`signers`]: local K1 keys implementing the [`Signer`] trait
//! - [`middleware`]: ABI resolution, action encoding and the signing client
//!
//! [`Provider`]: providers::Provider
//! [`Middleware`]: providers::Middleware
//! [`Signer`]: signers::Signer
//! [`SignerMiddleware`]: middleware::SignerMiddleware

#[doc(inline)]
pub use eosers_core as core;

#[doc(inline)]
pub use eosers_providers as providers;

#[doc(inline)]
pub use eosers_signers as signers;

#[doc(inline)]
pub use eosers_middleware as middleware;

pub use eosers_core::{abi, types, utils};

/// Easy imports of frequently used type definitions and traits
#[doc(hidden)]
pub mod prelude {
    pub use super::core::{name, types::*};

    pub use super::middleware::*;

    pub use super::providers::*;

    pub use super::signers::*;
}

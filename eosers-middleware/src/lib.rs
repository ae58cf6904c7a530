#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # eosers Middleware
//!
//! eosers uses a middleware-based architecture. You start the middleware
//! stack with a [`Provider`](eosers_providers::Provider), and wrap it with
//! the functionality you need.
//!
//! ## Available Middleware
//! - [`Signer`](crate::SignerMiddleware): completes, encodes and signs
//! transactions locally with one or more private keys, then broadcasts them
//!
//! Action data is encoded by an [`ActionCodec`](crate::codec::ActionCodec)
//! backed by a caching [`SchemaResolver`](crate::schema::SchemaResolver).
//! Identity proofs addressed to the empty account are encoded with an
//! embedded ABI and never trigger an ABI lookup.
//!
//! ## Example
//!
//! ```no_run
//! use eosers_middleware::{SignerConfig, SignerMiddleware};
//!
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let config: SignerConfig = serde_json::from_str(&std::fs::read_to_string("signer.json")?)?;
//! let client = SignerMiddleware::from_config(&config)?;
//! println!("signing for {}", client.chain_id());
//! # Ok(())
//! # }
//! ```

/// The [Signer](crate::SignerMiddleware) completes, encodes and signs
/// transactions with local keys
pub mod signer;
pub use signer::{SignedTransaction, SignerMiddleware, SignerMiddlewareError};

/// Conversion of action data between JSON and the binary form of the
/// contract's ABI
pub mod codec;
pub use codec::{ActionCodec, CodecError};

pub mod schema;
pub use schema::{SchemaResolver, SchemaSource};

mod config;
pub use config::SignerConfig;

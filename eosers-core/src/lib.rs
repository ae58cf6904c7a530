#![cfg_attr(docsrs, feature(doc_cfg))]
//! EOSIO types, binary encoding and cryptography.
//!
//! This library provides type definitions for the chain's main datatypes
//! (names, assets, keys, signatures, actions and transactions) together with
//! the binary serializer the chain uses for consensus data.
//!
//! ## Packing a transaction
//!
//! A transaction whose header is complete packs into the exact bytes the chain
//! hashes and signs:
//!
//! ```rust
//! use eosers_core::{
//!     name,
//!     types::{Action, Bytes, PermissionLevel, TimePointSec, Transaction},
//! };
//!
//! let transfer = Action::new(
//!     name!("eosio.token"),
//!     name!("transfer"),
//!     vec![PermissionLevel::new(name!("alice"), name!("active"))],
//!     Bytes::from(vec![0u8; 4]),
//! );
//! let tx = Transaction::new(vec![transfer])
//!     .expiration(TimePointSec::from_secs(1_527_854_488))
//!     .ref_block(0x1234, 0xdead_beef);
//!
//! let packed = tx.packed().unwrap();
//! assert_eq!(&packed[..4], &1_527_854_488u32.to_le_bytes());
//! ```
//!
//! # ABI Encoding and Decoding
//!
//! The `abi` module parses contract ABIs in their JSON and binary forms and
//! converts action data between JSON values and bytes. The crate also
//! re-exports [`k256`](https://docs.rs/k256) and [`rand`](https://docs.rs/rand)
//! for convenience.
pub mod types;

pub mod abi;

/// Binary encoding primitives
pub mod codec;

/// Hashing, digest and key-string utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;

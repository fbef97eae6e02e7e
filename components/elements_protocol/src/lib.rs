//! *A crate for Elements protocol constants and transaction types.*
//!
//! `elements_protocol` contains Rust structs, traits and functions that provide the
//! network constants for Liquid and other Elements chains, the script templates used to
//! lock coins, the explicit and confidential encodings of assets, values and nonces, and
//! the consensus encoding of transactions needed to compute their identifiers and
//! signature hashes.
//!
#![cfg_attr(feature = "std", doc = "## Feature flags")]
#![cfg_attr(feature = "std", doc = document_features::document_features!())]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod confidential;
pub mod consensus;
pub mod encoding;
pub mod script;
pub mod transaction;

mod txid;
pub use txid::TxId;

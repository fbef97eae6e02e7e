//! The Partially Signed Elements Transaction (PSET) format, and the roles that operate
//! on it.
//!
//! A PSET splits up the parts of creating an Elements transaction across distinct
//! entities. The entity roles match BIP 174 and BIP 370:
//! - Creator (single entity)
//!   - Creates the base PSET with no information about inputs or outputs.
//! - Constructor (anyone can contribute)
//!   - Adds inputs and outputs to the PSET.
//!   - Inputs may only be added if the Inputs Modifiable flag is set, and outputs may
//!     only be added if the Outputs Modifiable flag is set.
//! - Updater (anyone can contribute)
//!   - Adds information necessary for subsequent entities to proceed, such as previous
//!     outputs and scripts for the coins being spent.
//! - Signer (anyone can execute)
//!   - Admits a signature into an input, after checking that it is valid for the input
//!     and that every output it commits to can no longer change.
//!
//! Blinding, finalization and transaction extraction are performed by other tools; this
//! crate only models the state they leave behind (blinded outputs, finalized inputs).
//!
#![cfg_attr(feature = "std", doc = "## Feature flags")]
#![cfg_attr(feature = "std", doc = document_features::document_features!())]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

use getset::Getters;

pub mod confidential;
pub mod roles;
pub mod sighash;

mod common;
mod input;
mod output;
mod verify;

pub use common::Global;
pub use input::{Input, PartialSig, TapKeySig, TapScriptSig};
pub use output::Output;
pub use verify::{InputVerifyError, OutputVerifyError, VerifyError};

/// The transaction version written by the Creator.
const DEFAULT_TX_VERSION: u32 = 2;

/// A partially signed Elements transaction.
///
/// Cloning a `Pset` produces a fully independent deep copy; the Signer relies on this to
/// mutate a private copy and only publish it once it has been validated.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Pset {
    /// Global fields that are relevant to the transaction as a whole.
    pub(crate) global: Global,

    /// The inputs of the transaction, in order.
    pub(crate) inputs: Vec<Input>,

    /// The outputs of the transaction, in order.
    pub(crate) outputs: Vec<Output>,
}

impl Pset {
    /// Returns `true` if every input of this PSET has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.inputs.iter().all(|input| input.is_finalized())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for building PSETs in unit tests.

    use elements_protocol::{
        script::Script,
        transaction::{OutPoint, Transaction, TxIn, TxOut, SEQUENCE_FINAL},
        TxId,
    };

    use crate::{
        roles::{
            constructor::{Constructor, InputParams, OutputParams},
            creator::Creator,
        },
        sighash::SighashType,
        Pset,
    };

    pub(crate) const ASSET: [u8; 32] = [0xaa; 32];

    /// A previous transaction paying `value` to `script_pubkey` at output index 1.
    pub(crate) fn funding_tx(script_pubkey: Script, value: u64) -> Transaction {
        Transaction {
            version: 2,
            lock_time: 0,
            inputs: vec![TxIn {
                prevout: OutPoint::new(TxId::from_bytes([0x99; 32]), 3),
                script_sig: Script::default(),
                sequence: SEQUENCE_FINAL,
            }],
            outputs: vec![
                TxOut::explicit(ASSET, 1, Script::p2wpkh(&[0x01; 20])),
                TxOut::explicit(ASSET, value, script_pubkey),
            ],
        }
    }

    /// A PSET spending output 1 of each funding transaction, with a single explicit
    /// output and a fee output.
    pub(crate) fn pset_spending(funding: &[Transaction]) -> Pset {
        let mut constructor = Constructor::new(Creator::new().build());
        for tx in funding {
            constructor
                .add_input(InputParams::new(tx.txid(), 1))
                .expect("inputs are modifiable");
        }
        constructor
            .add_output(OutputParams::explicit(
                Script::p2wpkh(&[0x02; 20]),
                ASSET,
                90_000,
            ))
            .expect("outputs are modifiable");
        constructor
            .add_output(OutputParams::explicit(Script::default(), ASSET, 500))
            .expect("outputs are modifiable");
        constructor.finish()
    }

    /// Marks every input with the given sighash type.
    pub(crate) fn with_sighash_type(mut pset: Pset, sighash_type: SighashType) -> Pset {
        for input in &mut pset.inputs {
            input.sighash_type = Some(sighash_type);
        }
        pset
    }
}

use std::collections::BTreeMap;

use elements_protocol::{
    script::Script,
    transaction::{Transaction, TxOut, SEQUENCE_FINAL},
    TxId,
};
use getset::Getters;

use crate::sighash::SighashType;

/// Information about an input being spent by the transaction.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Input {
    //
    // Transaction effecting data.
    //
    // These are required fields that are part of the final transaction, and are filled in
    // by the Constructor when adding an input.
    //
    /// The ID of the previous transaction containing the coin being spent by this input.
    pub(crate) previous_txid: TxId,

    /// The index of the entry in the outputs of the previous transaction containing the
    /// coin being spent by this input.
    pub(crate) previous_output_index: u32,

    /// The sequence number of this input.
    ///
    /// - This is set by the Constructor.
    /// - If omitted, the sequence number is assumed to be the final sequence number
    ///   (`0xffffffff`).
    pub(crate) sequence: Option<u32>,

    /// The minimum Unix timstamp that this input requires to be set as the transaction's
    /// lock time.
    ///
    /// - This is set by the Constructor.
    /// - This must be greater than or equal to 500000000.
    pub(crate) required_time_lock_time: Option<u32>,

    /// The minimum block height that this input requires to be set as the transaction's
    /// lock time.
    ///
    /// - This is set by the Constructor.
    /// - This must be greater than 0 and less than 500000000.
    pub(crate) required_height_lock_time: Option<u32>,

    /// The sighash type to be used for this input.
    ///
    /// - Signers must use this sighash type to produce their signatures. Signers that
    ///   cannot produce signatures for this sighash type must not provide a signature.
    /// - The Signer refuses to admit any signature while this is unset.
    pub(crate) sighash_type: Option<SighashType>,

    /// The full previous transaction containing the coin being spent.
    ///
    /// This is dropped by the Signer once a `witness_utxo` has been derived from it for a
    /// segwit spend.
    pub(crate) non_witness_utxo: Option<Transaction>,

    /// The previous output being spent, for segwit and taproot spends.
    pub(crate) witness_utxo: Option<TxOut>,

    /// The script required to spend this coin, if it is P2SH.
    pub(crate) redeem_script: Option<Script>,

    /// The witness script required to spend this coin, if it is P2WSH or P2SH-P2WSH.
    pub(crate) witness_script: Option<Script>,

    /// A map from a pubkey to an ECDSA signature created by it.
    ///
    /// - Each signature has the sighash type appended to it as its last byte.
    /// - Each entry is set by a Signer after the signature has been verified.
    pub(crate) partial_signatures: BTreeMap<[u8; 33], Vec<u8>>,

    /// A Schnorr signature for a taproot key-path spend.
    pub(crate) tap_key_sig: Option<Vec<u8>>,

    /// Schnorr signatures for taproot script-path spends, in the order they were added.
    pub(crate) tap_script_sigs: Vec<TapScriptSig>,

    /// A fully constructed `script_sig`, set when the input is finalized.
    pub(crate) final_script_sig: Option<Script>,

    /// A fully constructed witness stack, set when the input is finalized.
    pub(crate) final_script_witness: Option<Vec<Vec<u8>>>,
}

impl Input {
    pub(crate) fn new(previous_txid: TxId, previous_output_index: u32) -> Self {
        Input {
            previous_txid,
            previous_output_index,
            sequence: None,
            required_time_lock_time: None,
            required_height_lock_time: None,
            sighash_type: None,
            non_witness_utxo: None,
            witness_utxo: None,
            redeem_script: None,
            witness_script: None,
            partial_signatures: BTreeMap::new(),
            tap_key_sig: None,
            tap_script_sigs: vec![],
            final_script_sig: None,
            final_script_witness: None,
        }
    }

    /// Returns `true` once the input carries its final `script_sig` or witness.
    ///
    /// A finalized input no longer accepts signatures.
    pub fn is_finalized(&self) -> bool {
        self.final_script_sig.is_some() || self.final_script_witness.is_some()
    }

    /// Returns the sequence number of this input, defaulting to final.
    pub fn sequence_or_final(&self) -> u32 {
        self.sequence.unwrap_or(SEQUENCE_FINAL)
    }

    /// Looks up the output being spent inside `non_witness_utxo`.
    pub fn non_witness_prevout(&self) -> Option<&TxOut> {
        self.non_witness_utxo
            .as_ref()
            .and_then(|tx| tx.output(self.previous_output_index))
    }

    /// Returns the output being spent, preferring `witness_utxo`.
    pub fn spent_output(&self) -> Option<&TxOut> {
        self.witness_utxo
            .as_ref()
            .or_else(|| self.non_witness_prevout())
    }

    /// Returns the `script_pubkey` of the output being spent, if known.
    pub fn spent_script(&self) -> Option<&Script> {
        self.spent_output().map(|txout| &txout.script_pubkey)
    }

    /// Returns `true` if this input spends a taproot output.
    ///
    /// This is decided by the shape of the spent script alone.
    pub fn is_taproot(&self) -> bool {
        self.spent_script().is_some_and(Script::is_p2tr)
    }

    /// Returns `true` if this input carries any signature.
    pub fn has_signatures(&self) -> bool {
        !self.partial_signatures.is_empty()
            || self.tap_key_sig.is_some()
            || !self.tap_script_sigs.is_empty()
    }
}

/// An ECDSA signature together with the public key it was made with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialSig {
    /// The compressed public key.
    pub pubkey: [u8; 33],
    /// A DER-encoded signature with the sighash type appended as its last byte.
    pub signature: Vec<u8>,
}

impl PartialSig {
    pub fn new(pubkey: [u8; 33], signature: Vec<u8>) -> Self {
        PartialSig { pubkey, signature }
    }

    /// Returns the sighash type byte the signature was made with.
    pub fn sighash_byte(&self) -> Option<u8> {
        self.signature.last().copied()
    }
}

/// A Schnorr signature for a taproot key-path spend.
///
/// A 64-byte signature uses `SIGHASH_DEFAULT`; a 65-byte one carries its sighash type as
/// the last byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapKeySig(pub Vec<u8>);

/// A Schnorr signature for a taproot script-path spend, bound to one leaf.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct TapScriptSig {
    /// The x-only public key the signature was made with.
    pub(crate) xonly_pubkey: [u8; 32],
    /// The hash of the leaf script being satisfied.
    pub(crate) leaf_hash: [u8; 32],
    /// The signature, optionally followed by its sighash type.
    pub(crate) signature: Vec<u8>,
}

impl TapScriptSig {
    pub fn new(xonly_pubkey: [u8; 32], leaf_hash: [u8; 32], signature: Vec<u8>) -> Self {
        TapScriptSig {
            xonly_pubkey,
            leaf_hash,
            signature,
        }
    }

    /// Returns `true` if `other` signs for the same key and leaf.
    pub(crate) fn same_slot(&self, other: &TapScriptSig) -> bool {
        self.xonly_pubkey == other.xonly_pubkey && self.leaf_hash == other.leaf_hash
    }
}

#[cfg(test)]
mod tests {
    use elements_protocol::{script::Script, TxId};

    use super::{Input, PartialSig};
    use crate::testing::funding_tx;

    #[test]
    fn spent_output_prefers_witness_utxo() {
        let tx = funding_tx(Script::p2wpkh(&[3; 20]), 100_000);
        let mut input = Input::new(tx.txid(), 1);
        assert_eq!(input.spent_output(), None);

        input.non_witness_utxo = Some(tx.clone());
        assert_eq!(input.spent_output(), Some(&tx.outputs[1]));
        assert!(!input.is_taproot());

        let taproot = funding_tx(Script::p2tr(&[4; 32]), 5).outputs[1].clone();
        input.witness_utxo = Some(taproot.clone());
        assert_eq!(input.spent_output(), Some(&taproot));
        assert!(input.is_taproot());
    }

    #[test]
    fn out_of_range_previous_output() {
        let tx = funding_tx(Script::p2wpkh(&[3; 20]), 100_000);
        let mut input = Input::new(tx.txid(), 7);
        input.non_witness_utxo = Some(tx);
        assert_eq!(input.non_witness_prevout(), None);
    }

    #[test]
    fn finalization_is_derived_from_final_fields() {
        let mut input = Input::new(TxId::from_bytes([0; 32]), 0);
        assert!(!input.is_finalized());
        input.final_script_witness = Some(vec![vec![1]]);
        assert!(input.is_finalized());
    }

    #[test]
    fn partial_sig_sighash_byte() {
        assert_eq!(PartialSig::new([2; 33], vec![]).sighash_byte(), None);
        assert_eq!(PartialSig::new([2; 33], vec![0x30, 0x01]).sighash_byte(), Some(1));
    }
}

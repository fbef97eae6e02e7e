//! The Updater role (anyone can contribute).
//!
//! - Adds information necessary for subsequent entities to proceed, such as the
//!   previous outputs and scripts of the coins being spent, and the blinding data of
//!   outputs.
//! - Admits signatures into inputs once they have been verified against the input's
//!   signature hash.
//!
//! Every setter checks the value it is given against what the input or output already
//! holds, and leaves it untouched on error.

use std::fmt;

use elements_protocol::{
    confidential::{
        ASSET_COMMITMENT_PREFIXES, COMPRESSED_PUBKEY_PREFIXES, VALUE_COMMITMENT_PREFIXES,
    },
    script::{Script, MAX_SCRIPT_SIZE},
    transaction::{Transaction, TxOut},
};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
    common::{FLAG_HAS_SIGHASH_SINGLE, FLAG_INPUTS_MODIFIABLE, FLAG_OUTPUTS_MODIFIABLE},
    sighash::{SighashError, SighashType},
    verify::schnorr_sighash_type,
    Input, Output, Pset, TapScriptSig,
};

/// Bounds on the length of a DER-encoded ECDSA signature.
const MIN_DER_SIGNATURE_LEN: usize = 8;
const MAX_DER_SIGNATURE_LEN: usize = 72;

pub struct Updater {
    pset: Pset,
}

impl Updater {
    /// Instantiates the Updater role with the given PSET.
    pub fn new(pset: Pset) -> Self {
        Self { pset }
    }

    /// Provides read access to the PSET being updated.
    pub fn pset(&self) -> &Pset {
        &self.pset
    }

    /// Returns the input at `index`, as long as it can still be updated.
    fn input(&self, index: usize) -> Result<&Input, UpdaterError> {
        let input = self
            .pset
            .inputs
            .get(index)
            .ok_or(UpdaterError::InvalidIndex)?;
        if input.is_finalized() {
            Err(UpdaterError::InputFinalized)
        } else {
            Ok(input)
        }
    }

    fn input_mut(&mut self, index: usize) -> Result<&mut Input, UpdaterError> {
        self.input(index)?;
        self.pset
            .inputs
            .get_mut(index)
            .ok_or(UpdaterError::InvalidIndex)
    }

    /// Updates the input at the given index with information provided in the given
    /// closure.
    pub fn update_input_with<F>(&mut self, index: usize, f: F) -> Result<(), UpdaterError>
    where
        F: FnOnce(InputUpdater<'_>) -> Result<(), UpdaterError>,
    {
        f(InputUpdater(self.input_mut(index)?))
    }

    /// Updates the output at the given index with information provided in the given
    /// closure.
    pub fn update_output_with<F>(&mut self, index: usize, f: F) -> Result<(), UpdaterError>
    where
        F: FnOnce(OutputUpdater<'_>) -> Result<(), UpdaterError>,
    {
        f(OutputUpdater(
            self.pset
                .outputs
                .get_mut(index)
                .ok_or(UpdaterError::InvalidIndex)?,
        ))
    }

    /// Adds an ECDSA signature made with `pubkey` to the input at `index`.
    ///
    /// `signature` is DER-encoded with the input's sighash type appended. It is checked
    /// with `verify(pubkey, sighash, der_signature)` before being stored.
    pub fn add_partial_signature<F>(
        &mut self,
        index: usize,
        pubkey: [u8; 33],
        signature: Vec<u8>,
        verify: F,
    ) -> Result<(), UpdaterError>
    where
        F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
    {
        let input = self.input(index)?;
        if input.is_taproot() {
            return Err(UpdaterError::WrongSigningAlgorithm);
        }
        if !COMPRESSED_PUBKEY_PREFIXES.contains(&pubkey[0]) {
            return Err(UpdaterError::InvalidPublicKey);
        }
        let (sighash_byte, der_signature) = signature
            .split_last()
            .ok_or(UpdaterError::InvalidSignatureEncoding)?;
        if !(MIN_DER_SIGNATURE_LEN..=MAX_DER_SIGNATURE_LEN).contains(&der_signature.len())
            || der_signature[0] != 0x30
        {
            return Err(UpdaterError::InvalidSignatureEncoding);
        }
        let sighash_type = input
            .sighash_type
            .ok_or(UpdaterError::MissingSighashType)?;
        if *sighash_byte != sighash_type.encode() {
            return Err(UpdaterError::SighashTypeMismatch);
        }

        let sighash = self
            .pset
            .ecdsa_sighash(index)
            .map_err(UpdaterError::Sighash)?;
        if !verify(&pubkey, &sighash, der_signature) {
            debug!("Rejected ECDSA signature for input {}", index);
            return Err(UpdaterError::InvalidSignature);
        }

        self.input_mut(index)?
            .partial_signatures
            .insert(pubkey, signature);
        self.signature_added(sighash_type);
        Ok(())
    }

    /// Adds a taproot key-path signature to the input at `index`.
    ///
    /// The signature is checked with `verify(output_key, sighash, signature)` against the
    /// output key of the spent script, without any trailing sighash type byte.
    pub fn add_tap_key_signature<F>(
        &mut self,
        index: usize,
        signature: Vec<u8>,
        genesis_block_hash: [u8; 32],
        verify: F,
    ) -> Result<(), UpdaterError>
    where
        F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
    {
        let input = self.input(index)?;
        let output_key = input
            .spent_script()
            .and_then(Script::taproot_output_key)
            .ok_or(UpdaterError::WrongSigningAlgorithm)?;
        let sighash_type = self.check_schnorr_signature(input, &signature)?;

        let sighash = self
            .pset
            .taproot_sighash(index, None, genesis_block_hash)
            .map_err(UpdaterError::Sighash)?;
        if !verify(&output_key, &sighash, &signature[..64]) {
            debug!("Rejected taproot key-path signature for input {}", index);
            return Err(UpdaterError::InvalidSignature);
        }

        self.input_mut(index)?.tap_key_sig = Some(signature);
        self.signature_added(sighash_type);
        Ok(())
    }

    /// Adds a taproot script-path signature to the input at `index`.
    ///
    /// The signature is checked with `verify(xonly_pubkey, sighash, signature)` for a
    /// spend of the signature's leaf. It replaces any earlier signature by the same key
    /// for the same leaf.
    pub fn add_tap_script_signature<F>(
        &mut self,
        index: usize,
        signature: TapScriptSig,
        genesis_block_hash: [u8; 32],
        verify: F,
    ) -> Result<(), UpdaterError>
    where
        F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
    {
        let input = self.input(index)?;
        if !input.is_taproot() {
            return Err(UpdaterError::WrongSigningAlgorithm);
        }
        let sighash_type = self.check_schnorr_signature(input, &signature.signature)?;

        let sighash = self
            .pset
            .taproot_sighash(index, Some(signature.leaf_hash), genesis_block_hash)
            .map_err(UpdaterError::Sighash)?;
        if !verify(
            &signature.xonly_pubkey,
            &sighash,
            &signature.signature[..64],
        ) {
            debug!("Rejected taproot script-path signature for input {}", index);
            return Err(UpdaterError::InvalidSignature);
        }

        let input = self.input_mut(index)?;
        match input
            .tap_script_sigs
            .iter_mut()
            .find(|existing| existing.same_slot(&signature))
        {
            Some(existing) => *existing = signature,
            None => input.tap_script_sigs.push(signature),
        }
        self.signature_added(sighash_type);
        Ok(())
    }

    /// Checks the encoding of a Schnorr signature and that it was made with the input's
    /// sighash type.
    fn check_schnorr_signature(
        &self,
        input: &Input,
        signature: &[u8],
    ) -> Result<SighashType, UpdaterError> {
        let signed_with =
            schnorr_sighash_type(signature).map_err(|_| UpdaterError::InvalidSignatureEncoding)?;
        let sighash_type = input
            .sighash_type
            .ok_or(UpdaterError::MissingSighashType)?;
        if signed_with != sighash_type {
            return Err(UpdaterError::SighashTypeMismatch);
        }
        Ok(sighash_type)
    }

    /// Updates `tx_modifiable` to reflect what a new signature commits to.
    fn signature_added(&mut self, sighash_type: SighashType) {
        let global = &mut self.pset.global;
        if !sighash_type.is_anyone_can_pay() {
            global.tx_modifiable &= !FLAG_INPUTS_MODIFIABLE;
        }
        if !sighash_type.is_none() {
            global.tx_modifiable &= !FLAG_OUTPUTS_MODIFIABLE;
        }
        if sighash_type.is_single() {
            global.tx_modifiable |= FLAG_HAS_SIGHASH_SINGLE;
        }
    }

    /// Finishes the Updater role, returning the updated PSET.
    pub fn finish(self) -> Pset {
        self.pset
    }
}

/// An updater for a PSET input.
pub struct InputUpdater<'a>(&'a mut Input);

impl InputUpdater<'_> {
    /// Sets the sighash type signatures for this input must use.
    ///
    /// Returns an error if the input already carries signatures made with another type.
    pub fn set_sighash_type(&mut self, sighash_type: SighashType) -> Result<(), UpdaterError> {
        if self.0.has_signatures() && self.0.sighash_type != Some(sighash_type) {
            return Err(UpdaterError::SighashTypeMismatch);
        }
        self.0.sighash_type = Some(sighash_type);
        Ok(())
    }

    /// Sets the full previous transaction for this input.
    ///
    /// Returns an error if its txid is not the one this input spends from, or it does not
    /// agree with the input's `witness_utxo`.
    pub fn set_non_witness_utxo(&mut self, tx: Transaction) -> Result<(), UpdaterError> {
        if tx.txid() != self.0.previous_txid {
            return Err(UpdaterError::NonWitnessUtxoMismatch);
        }
        let prevout = tx
            .output(self.0.previous_output_index)
            .ok_or(UpdaterError::MissingPrevout)?;
        if self
            .0
            .witness_utxo
            .as_ref()
            .is_some_and(|witness_utxo| witness_utxo != prevout)
        {
            return Err(UpdaterError::WitnessUtxoMismatch);
        }
        self.0.non_witness_utxo = Some(tx);
        Ok(())
    }

    /// Drops the full previous transaction, keeping only the `witness_utxo`.
    pub fn clear_non_witness_utxo(&mut self) {
        self.0.non_witness_utxo = None;
    }

    /// Sets the output spent by this input.
    ///
    /// Returns an error if the input's `non_witness_utxo` has a different output at the
    /// spent index.
    pub fn add_witness_utxo(&mut self, txout: TxOut) -> Result<(), UpdaterError> {
        if self.0.non_witness_utxo.is_some() && self.0.non_witness_prevout() != Some(&txout) {
            return Err(UpdaterError::WitnessUtxoMismatch);
        }
        self.0.witness_utxo = Some(txout);
        Ok(())
    }

    /// Sets the redeem script for this input.
    ///
    /// If the spent script is known, returns an error if it is not P2SH, or the given
    /// `redeem_script` does not match it.
    pub fn add_redeem_script(&mut self, redeem_script: Script) -> Result<(), UpdaterError> {
        check_script_size(&redeem_script)?;
        if let Some(spent_script) = self.0.spent_script() {
            match spent_script.hash160_payload() {
                Some(hash) if spent_script.is_p2sh() => {
                    if hash[..] != Ripemd160::digest(Sha256::digest(&redeem_script.0))[..] {
                        return Err(UpdaterError::WrongRedeemScript);
                    }
                }
                _ => return Err(UpdaterError::NotP2sh),
            }
        }
        self.0.redeem_script = Some(redeem_script);
        Ok(())
    }

    /// Sets the witness script for this input.
    ///
    /// The script is checked against the witness program once the spent script and any
    /// redeem script are known; see [`Input::verify`].
    pub fn add_witness_script(&mut self, witness_script: Script) -> Result<(), UpdaterError> {
        check_script_size(&witness_script)?;
        self.0.witness_script = Some(witness_script);
        Ok(())
    }
}

fn check_script_size(script: &Script) -> Result<(), UpdaterError> {
    if script.is_empty() {
        Err(UpdaterError::EmptyScript)
    } else if script.len() > MAX_SCRIPT_SIZE {
        Err(UpdaterError::ScriptTooLarge)
    } else {
        Ok(())
    }
}

/// An updater for a PSET output.
///
/// These setters record the results of blinding the output.
pub struct OutputUpdater<'a>(&'a mut Output);

impl OutputUpdater<'_> {
    /// Marks this output for blinding to the given public key.
    pub fn set_blinding_key(&mut self, blinding_key: [u8; 33]) -> Result<(), UpdaterError> {
        check_prefix(
            &blinding_key,
            &COMPRESSED_PUBKEY_PREFIXES,
            UpdaterError::InvalidPublicKey,
        )?;
        self.0.blinding_key = Some(blinding_key);
        Ok(())
    }

    pub fn set_blinder_index(&mut self, blinder_index: u32) {
        self.0.blinder_index = Some(blinder_index);
    }

    pub fn set_value_commitment(&mut self, commitment: [u8; 33]) -> Result<(), UpdaterError> {
        check_prefix(
            &commitment,
            &VALUE_COMMITMENT_PREFIXES,
            UpdaterError::InvalidCommitment,
        )?;
        self.0.amount_commitment = Some(commitment);
        Ok(())
    }

    pub fn set_asset_commitment(&mut self, commitment: [u8; 33]) -> Result<(), UpdaterError> {
        check_prefix(
            &commitment,
            &ASSET_COMMITMENT_PREFIXES,
            UpdaterError::InvalidCommitment,
        )?;
        self.0.asset_commitment = Some(commitment);
        Ok(())
    }

    pub fn set_ecdh_pubkey(&mut self, pubkey: [u8; 33]) -> Result<(), UpdaterError> {
        check_prefix(
            &pubkey,
            &COMPRESSED_PUBKEY_PREFIXES,
            UpdaterError::InvalidPublicKey,
        )?;
        self.0.ecdh_pubkey = Some(pubkey);
        Ok(())
    }

    pub fn set_value_rangeproof(&mut self, proof: Vec<u8>) {
        self.0.value_rangeproof = Some(proof);
    }

    pub fn set_asset_surjection_proof(&mut self, proof: Vec<u8>) {
        self.0.asset_surjection_proof = Some(proof);
    }

    pub fn set_blind_value_proof(&mut self, proof: Vec<u8>) {
        self.0.blind_value_proof = Some(proof);
    }

    pub fn set_blind_asset_proof(&mut self, proof: Vec<u8>) {
        self.0.blind_asset_proof = Some(proof);
    }
}

fn check_prefix(
    bytes: &[u8; 33],
    prefixes: &[u8; 2],
    error: UpdaterError,
) -> Result<(), UpdaterError> {
    if prefixes.contains(&bytes[0]) {
        Ok(())
    } else {
        Err(error)
    }
}

/// Errors that can occur while updating a PSET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdaterError {
    /// An out-of-bounds index was provided when looking up an input or output.
    InvalidIndex,
    /// The input has been finalized and can no longer be updated.
    InputFinalized,
    EmptyScript,
    ScriptTooLarge,
    /// A `redeem_script` can only be set on a P2SH coin.
    NotP2sh,
    /// The provided `redeem_script` does not match the input's spent script.
    WrongRedeemScript,
    /// The `witness_utxo` does not match the spent output of the `non_witness_utxo`.
    WitnessUtxoMismatch,
    /// The transaction is not the one the input spends from.
    NonWitnessUtxoMismatch,
    /// The previous transaction has no output at the spent index.
    MissingPrevout,
    InvalidPublicKey,
    InvalidSignatureEncoding,
    /// Signatures cannot be added before the input's sighash type is set.
    MissingSighashType,
    /// The signature was made with a sighash type other than the input's.
    SighashTypeMismatch,
    /// An ECDSA signature was given for a taproot input, or a Schnorr signature for any
    /// other input.
    WrongSigningAlgorithm,
    Sighash(SighashError),
    /// The verification capability rejected the signature.
    InvalidSignature,
    /// A commitment has an invalid prefix.
    InvalidCommitment,
}

impl fmt::Display for UpdaterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdaterError::InvalidIndex => write!(f, "index out of range"),
            UpdaterError::InputFinalized => write!(f, "input is finalized"),
            UpdaterError::EmptyScript => write!(f, "script is empty"),
            UpdaterError::ScriptTooLarge => write!(f, "script is too large"),
            UpdaterError::NotP2sh => write!(f, "redeem script given for a non-P2SH input"),
            UpdaterError::WrongRedeemScript => {
                write!(f, "redeem script does not match the spent script")
            }
            UpdaterError::WitnessUtxoMismatch => {
                write!(f, "witness utxo does not match the previous transaction")
            }
            UpdaterError::NonWitnessUtxoMismatch => {
                write!(f, "previous transaction does not match the input's txid")
            }
            UpdaterError::MissingPrevout => {
                write!(f, "previous transaction has no output at the spent index")
            }
            UpdaterError::InvalidPublicKey => write!(f, "invalid public key"),
            UpdaterError::InvalidSignatureEncoding => write!(f, "invalid signature encoding"),
            UpdaterError::MissingSighashType => write!(f, "input has no sighash type"),
            UpdaterError::SighashTypeMismatch => {
                write!(f, "signature sighash type differs from the input's")
            }
            UpdaterError::WrongSigningAlgorithm => {
                write!(f, "signature kind does not match the spent script")
            }
            UpdaterError::Sighash(e) => write!(f, "cannot compute sighash: {}", e),
            UpdaterError::InvalidSignature => write!(f, "signature verification failed"),
            UpdaterError::InvalidCommitment => write!(f, "invalid commitment prefix"),
        }
    }
}

impl std::error::Error for UpdaterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdaterError::Sighash(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use elements_protocol::{
        consensus::{Network, Parameters},
        script::Script,
    };

    use super::{Updater, UpdaterError};
    use crate::{
        sighash::{tap_leaf_hash, SighashError, SighashType},
        testing::{funding_tx, pset_spending, with_sighash_type},
        TapScriptSig,
    };

    fn der_signature(sighash_type: SighashType) -> Vec<u8> {
        let mut sig = vec![0x30; 70];
        sig.push(sighash_type.encode());
        sig
    }

    fn schnorr_signature(sighash_type: SighashType) -> Vec<u8> {
        let mut sig = vec![0x11; 64];
        if sighash_type != SighashType::DEFAULT {
            sig.push(sighash_type.encode());
        }
        sig
    }

    #[test]
    fn input_setters_check_consistency() {
        let funding = funding_tx(Script::p2wpkh(&[1; 20]), 100_000);
        let other = funding_tx(Script::p2wpkh(&[2; 20]), 1);
        let mut updater = Updater::new(pset_spending(&[funding.clone()]));

        assert_eq!(
            updater.update_input_with(0, |mut input| input.set_non_witness_utxo(other.clone())),
            Err(UpdaterError::NonWitnessUtxoMismatch)
        );
        updater
            .update_input_with(0, |mut input| input.set_non_witness_utxo(funding.clone()))
            .unwrap();
        assert_eq!(
            updater.update_input_with(0, |mut input| input
                .add_witness_utxo(other.outputs[1].clone())),
            Err(UpdaterError::WitnessUtxoMismatch)
        );
        updater
            .update_input_with(0, |mut input| {
                input.add_witness_utxo(funding.outputs[1].clone())?;
                input.clear_non_witness_utxo();
                Ok(())
            })
            .unwrap();
        assert_eq!(
            updater.pset().inputs()[0].witness_utxo(),
            &Some(funding.outputs[1].clone())
        );
        assert!(updater.pset().inputs()[0].non_witness_utxo().is_none());

        assert_eq!(
            updater.update_input_with(0, |mut input| input.add_redeem_script(Script(vec![0x51]))),
            Err(UpdaterError::NotP2sh)
        );
        assert_eq!(
            updater.update_input_with(0, |mut input| input.add_witness_script(Script::default())),
            Err(UpdaterError::EmptyScript)
        );
        assert_eq!(
            updater.update_input_with(3, |mut input| input.set_sighash_type(SighashType::ALL)),
            Err(UpdaterError::InvalidIndex)
        );
    }

    #[test]
    fn redeem_script_must_match_p2sh() {
        let redeem_script = Script::p2wpkh(&[1; 20]);
        let funding = funding_tx(redeem_script.to_p2sh(), 100_000);
        let mut updater = Updater::new(pset_spending(&[funding.clone()]));
        updater
            .update_input_with(0, |mut input| input.set_non_witness_utxo(funding))
            .unwrap();

        assert_eq!(
            updater.update_input_with(0, |mut input| input
                .add_redeem_script(Script::p2wpkh(&[2; 20]))),
            Err(UpdaterError::WrongRedeemScript)
        );
        assert_eq!(
            updater.update_input_with(0, |mut input| input.add_redeem_script(redeem_script)),
            Ok(())
        );
    }

    #[test]
    fn finalized_inputs_are_frozen() {
        let mut pset = pset_spending(&[funding_tx(Script::p2wpkh(&[1; 20]), 100_000)]);
        pset.inputs[0].final_script_witness = Some(vec![]);
        let mut updater = Updater::new(pset);
        assert_eq!(
            updater.update_input_with(0, |mut input| input.set_sighash_type(SighashType::ALL)),
            Err(UpdaterError::InputFinalized)
        );
        assert_eq!(
            updater.add_partial_signature(0, [2; 33], der_signature(SighashType::ALL), |_, _, _| {
                true
            }),
            Err(UpdaterError::InputFinalized)
        );
    }

    #[test]
    fn partial_signature_checks() {
        let funding = funding_tx(Script::p2wpkh(&[1; 20]), 100_000);
        let mut pset = pset_spending(&[funding.clone()]);
        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());
        let mut updater = Updater::new(pset);
        let accept = |_: &[u8], _: &[u8; 32], _: &[u8]| true;

        assert_eq!(
            updater.add_partial_signature(0, [2; 33], der_signature(SighashType::ALL), accept),
            Err(UpdaterError::MissingSighashType)
        );
        updater
            .update_input_with(0, |mut input| input.set_sighash_type(SighashType::ALL))
            .unwrap();
        assert_eq!(
            updater.add_partial_signature(0, [5; 33], der_signature(SighashType::ALL), accept),
            Err(UpdaterError::InvalidPublicKey)
        );
        assert_eq!(
            updater.add_partial_signature(0, [2; 33], vec![0x30, 0x01], accept),
            Err(UpdaterError::InvalidSignatureEncoding)
        );
        assert_eq!(
            updater.add_partial_signature(0, [2; 33], der_signature(SighashType::NONE), accept),
            Err(UpdaterError::SighashTypeMismatch)
        );
        assert_eq!(
            updater.add_partial_signature(0, [2; 33], der_signature(SighashType::ALL), |_, _, _| {
                false
            }),
            Err(UpdaterError::InvalidSignature)
        );
        assert!(updater.pset().inputs()[0].partial_signatures().is_empty());
        assert!(updater.pset().global().inputs_modifiable());

        let expected = updater.pset().ecdsa_sighash(0).unwrap();
        updater
            .add_partial_signature(0, [2; 33], der_signature(SighashType::ALL), |pk, msg, sig| {
                pk == [2; 33] && msg == &expected && sig.len() == 70
            })
            .unwrap();
        let pset = updater.finish();
        assert_eq!(pset.inputs()[0].partial_signatures().len(), 1);
        assert!(!pset.global().inputs_modifiable());
        assert!(!pset.global().outputs_modifiable());
        assert_eq!(pset.sanity_check(), Ok(()));
    }

    #[test]
    fn tx_modifiable_follows_sighash_type() {
        let funding = funding_tx(Script::p2wpkh(&[1; 20]), 100_000);
        let mut pset = with_sighash_type(
            pset_spending(&[funding.clone()]),
            SighashType::SINGLE_ANYONECANPAY,
        );
        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());
        let mut updater = Updater::new(pset);
        updater
            .add_partial_signature(
                0,
                [3; 33],
                der_signature(SighashType::SINGLE_ANYONECANPAY),
                |_, _, _| true,
            )
            .unwrap();
        let global = updater.pset().global();
        assert!(global.inputs_modifiable());
        assert!(!global.outputs_modifiable());
        assert!(global.has_sighash_single());
    }

    #[test]
    fn taproot_signature_checks() {
        let genesis = Network::Liquid.genesis_block_hash();
        let funding = funding_tx(Script::p2tr(&[9; 32]), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[funding.clone()]), SighashType::DEFAULT);
        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());
        let mut updater = Updater::new(pset);

        assert_eq!(
            updater.add_partial_signature(0, [2; 33], der_signature(SighashType::ALL), |_, _, _| {
                true
            }),
            Err(UpdaterError::WrongSigningAlgorithm)
        );
        assert_eq!(
            updater.add_tap_key_signature(
                0,
                schnorr_signature(SighashType::ALL),
                genesis,
                |_, _, _| true
            ),
            Err(UpdaterError::SighashTypeMismatch)
        );
        let mut zero_suffixed = schnorr_signature(SighashType::DEFAULT);
        zero_suffixed.push(0);
        assert_eq!(
            updater.add_tap_key_signature(0, zero_suffixed, genesis, |_, _, _| true),
            Err(UpdaterError::InvalidSignatureEncoding)
        );

        let expected = updater.pset().taproot_sighash(0, None, genesis).unwrap();
        updater
            .add_tap_key_signature(
                0,
                schnorr_signature(SighashType::DEFAULT),
                genesis,
                |pk, msg, sig| pk == [9; 32] && msg == &expected && sig.len() == 64,
            )
            .unwrap();
        assert_eq!(
            updater.pset().inputs()[0].tap_key_sig(),
            &Some(schnorr_signature(SighashType::DEFAULT))
        );
    }

    #[test]
    fn script_path_signatures_replace_same_slot() {
        let genesis = Network::Liquid.genesis_block_hash();
        let funding = funding_tx(Script::p2tr(&[9; 32]), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[funding.clone()]), SighashType::DEFAULT);
        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());
        let mut updater = Updater::new(pset);
        let leaf = tap_leaf_hash(&Script(vec![0x51]));
        let accept = |_: &[u8], _: &[u8; 32], _: &[u8]| true;

        let first = TapScriptSig::new([1; 32], leaf, vec![1; 64]);
        let second = TapScriptSig::new([2; 32], leaf, vec![2; 64]);
        let replacement = TapScriptSig::new([1; 32], leaf, vec![3; 64]);
        for sig in [first, second.clone(), replacement.clone()] {
            updater
                .add_tap_script_signature(0, sig, genesis, accept)
                .unwrap();
        }
        assert_eq!(
            updater.pset().inputs()[0].tap_script_sigs(),
            &vec![replacement, second]
        );
    }

    #[test]
    fn taproot_signature_needs_spent_outputs() {
        let genesis = Network::Liquid.genesis_block_hash();
        let first = funding_tx(Script::p2tr(&[9; 32]), 100_000);
        let second = funding_tx(Script::p2wpkh(&[8; 20]), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[first.clone(), second]), SighashType::ALL);
        pset.inputs[0].witness_utxo = Some(first.outputs[1].clone());
        let mut updater = Updater::new(pset);
        assert_matches!(
            updater.add_tap_key_signature(
                0,
                schnorr_signature(SighashType::ALL),
                genesis,
                |_, _, _| true
            ),
            Err(UpdaterError::Sighash(SighashError::MissingSpentOutput { index: 1 }))
        );
    }

    #[test]
    fn output_setters_check_prefixes() {
        let mut updater =
            Updater::new(pset_spending(&[funding_tx(Script::p2wpkh(&[1; 20]), 1)]));
        assert_eq!(
            updater.update_output_with(0, |mut output| output.set_value_commitment([0x0a; 33])),
            Err(UpdaterError::InvalidCommitment)
        );
        updater
            .update_output_with(0, |mut output| {
                output.set_blinding_key([0x02; 33])?;
                output.set_blinder_index(0);
                output.set_value_commitment([0x08; 33])?;
                output.set_asset_commitment([0x0b; 33])?;
                output.set_ecdh_pubkey([0x03; 33])?;
                output.set_value_rangeproof(vec![1]);
                output.set_asset_surjection_proof(vec![2]);
                Ok(())
            })
            .unwrap();
        assert!(updater.pset().outputs()[0].is_fully_blinded());
        assert_eq!(
            updater.update_output_with(1, |mut output| output.set_ecdh_pubkey([0x04; 33])),
            Err(UpdaterError::InvalidPublicKey)
        );
        assert_eq!(
            updater.update_output_with(5, |_| Ok(())),
            Err(UpdaterError::InvalidIndex)
        );
    }

    #[test]
    fn keys_must_be_compressed_pubkeys() {
        let mut updater =
            Updater::new(pset_spending(&[funding_tx(Script::p2wpkh(&[1; 20]), 1)]));
        for prefix in [0x02, 0x03] {
            assert_eq!(
                updater.update_output_with(0, |mut output| output.set_blinding_key([prefix; 33])),
                Ok(())
            );
        }
        // Uncompressed keys and commitment prefixes are rejected.
        for prefix in [0x04, 0x08, 0x0a] {
            assert_eq!(
                updater.update_output_with(0, |mut output| output.set_blinding_key([prefix; 33])),
                Err(UpdaterError::InvalidPublicKey)
            );
            assert_eq!(
                updater.add_partial_signature(
                    0,
                    [prefix; 33],
                    der_signature(SighashType::ALL),
                    |_, _, _| true
                ),
                Err(UpdaterError::InvalidPublicKey)
            );
        }
    }
}

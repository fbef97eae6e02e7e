//! The Signer role (anyone can execute).
//!
//! - Admits a signature into a single input of the PSET.
//! - Signatures that commit to every output are refused while any output is still
//!   waiting to be blinded, because the outputs they sign would change afterwards.
//! - Each signing attempt is carried out on a private copy of the PSET, which replaces
//!   the Signer's PSET only once the copy has passed [`Pset::sanity_check`]. A failed
//!   attempt leaves the PSET exactly as it was.

use std::fmt;

use elements_protocol::{consensus::Parameters, script::Script};
use tracing::{debug, trace};

use crate::{
    roles::updater::{Updater, UpdaterError},
    sighash::SighashType,
    PartialSig, Pset, TapKeySig, TapScriptSig, VerifyError,
};

#[cfg(feature = "secp256k1")]
pub mod secp256k1_verifier;

/// The signatures, and the scripts needed to check them, provided for one input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigningData {
    /// Data for an ECDSA signature on a legacy, wrapped-segwit or segwit v0 input.
    Legacy(LegacySigningData),
    /// Data for Schnorr signatures on a taproot input.
    Taproot(TaprootSigningData),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacySigningData {
    pub partial_sig: Option<PartialSig>,
    /// The redeem script of a P2SH coin. Ignored if empty.
    pub redeem_script: Option<Script>,
    /// The witness script of a P2WSH or P2SH-P2WSH coin. Ignored if empty.
    pub witness_script: Option<Script>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaprootSigningData {
    pub key_sig: Option<TapKeySig>,
    /// Script-path signatures, admitted in order.
    pub script_sigs: Vec<TapScriptSig>,
}

pub struct Signer<P: Parameters> {
    pset: Pset,
    params: P,
}

impl<P: Parameters> Signer<P> {
    /// Instantiates the Signer role with the given PSET, for a transaction on the given
    /// network.
    pub fn new(pset: Pset, params: P) -> Self {
        Self { pset, params }
    }

    /// Provides read access to the PSET being signed.
    pub fn pset(&self) -> &Pset {
        &self.pset
    }

    /// Admits the signatures in `signing_data` into the input at `index`.
    ///
    /// Every signature is checked with `verify(pubkey, sighash, signature)` before it is
    /// admitted, where `signature` has no trailing sighash type byte. ECDSA public keys
    /// are 33 bytes and Schnorr public keys 32 bytes.
    ///
    /// Signatures with `SIGHASH_ALL` or `SIGHASH_DEFAULT` commit to every output, and are
    /// refused with [`Error::BlindingIncomplete`] while any output is blinded but not
    /// fully blinded.
    ///
    /// The pathway is chosen by the spent script alone. Signing data of the other kind
    /// carries no usable signature, and fails with [`Error::MissingSignature`].
    ///
    /// Returns `Ok(())` without doing anything if the input has already been finalized.
    pub fn sign_input<F>(
        &mut self,
        index: usize,
        signing_data: SigningData,
        verify: F,
    ) -> Result<(), Error>
    where
        F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
    {
        let input_count = self.pset.global.input_count;
        let input = match self.pset.inputs.get(index) {
            Some(input) if index < input_count => input,
            _ => return Err(Error::IndexOutOfRange { index, input_count }),
        };
        if input.is_finalized() {
            debug!("Input {} is finalized, not signing", index);
            return Ok(());
        }
        let sighash_type = input.sighash_type.ok_or(Error::MissingSighashType)?;

        if sighash_type.commits_to_all_outputs() {
            if let Some(output_index) = self
                .pset
                .outputs
                .iter()
                .position(|output| output.is_blinded() && !output.is_fully_blinded())
            {
                debug!(
                    "Refusing {} signature for input {}: output {} is not fully blinded",
                    sighash_type, index, output_index
                );
                return Err(Error::BlindingIncomplete { output_index });
            }
        }

        let mut updater = Updater::new(self.pset.clone());
        if input.is_taproot() {
            debug!("Signing input {} with Schnorr ({})", index, sighash_type);
            let data = match signing_data {
                SigningData::Taproot(data) => data,
                SigningData::Legacy(_) => TaprootSigningData::default(),
            };
            let genesis_block_hash = self.params.genesis_block_hash();
            sign_taproot(&mut updater, index, data, genesis_block_hash, &verify)?;
        } else {
            debug!("Signing input {} with ECDSA ({})", index, sighash_type);
            let data = match signing_data {
                SigningData::Legacy(data) => data,
                SigningData::Taproot(_) => LegacySigningData::default(),
            };
            sign_legacy(&mut updater, index, sighash_type, data, &verify)?;
        }

        let pset = updater.finish();
        pset.sanity_check().map_err(Error::InvalidStructure)?;
        self.pset = pset;
        debug!("Committed signatures for input {}", index);
        Ok(())
    }

    /// Finishes the Signer role, returning the signed PSET.
    pub fn finish(self) -> Pset {
        self.pset
    }
}

fn sign_legacy<F>(
    updater: &mut Updater,
    index: usize,
    sighash_type: SighashType,
    data: LegacySigningData,
    verify: F,
) -> Result<(), Error>
where
    F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
{
    let partial_sig = data.partial_sig.ok_or(Error::MissingSignature)?;
    let expected = sighash_type.encode();
    let found = partial_sig.sighash_byte();
    if found != Some(expected) {
        return Err(Error::SighashMismatch { expected, found });
    }

    if let Some(witness_script) = data.witness_script.filter(|script| !script.is_empty()) {
        updater.update_input_with(index, |mut input| input.add_witness_script(witness_script))?;
        if !has_witness_utxo(updater, index) {
            upgrade_utxo(updater, index)?;
        }
    }

    if let Some(redeem_script) = data.redeem_script.filter(|script| !script.is_empty()) {
        let wraps_segwit = redeem_script.is_p2wpkh() || redeem_script.is_p2wsh();
        updater.update_input_with(index, |mut input| input.add_redeem_script(redeem_script))?;
        if wraps_segwit && !has_witness_utxo(updater, index) {
            upgrade_utxo(updater, index)?;
        }
    }

    let spends_segwit = updater.pset().inputs[index]
        .non_witness_prevout()
        .is_some_and(|prevout| {
            prevout.script_pubkey.is_p2wpkh() || prevout.script_pubkey.is_p2wsh()
        });
    if spends_segwit {
        upgrade_utxo(updater, index)?;
    }

    updater.add_partial_signature(index, partial_sig.pubkey, partial_sig.signature, verify)?;
    Ok(())
}

fn sign_taproot<F>(
    updater: &mut Updater,
    index: usize,
    data: TaprootSigningData,
    genesis_block_hash: [u8; 32],
    verify: F,
) -> Result<(), Error>
where
    F: Fn(&[u8], &[u8; 32], &[u8]) -> bool,
{
    if data.key_sig.is_none() && data.script_sigs.is_empty() {
        return Err(Error::MissingSignature);
    }

    if let Some(TapKeySig(signature)) = data.key_sig {
        updater.add_tap_key_signature(index, signature, genesis_block_hash, &verify)?;
    }
    for signature in data.script_sigs {
        updater.add_tap_script_signature(index, signature, genesis_block_hash, &verify)?;
    }
    Ok(())
}

fn has_witness_utxo(updater: &Updater, index: usize) -> bool {
    updater.pset().inputs[index].witness_utxo.is_some()
}

/// Replaces the input's `non_witness_utxo` with the `witness_utxo` it contains.
fn upgrade_utxo(updater: &mut Updater, index: usize) -> Result<(), Error> {
    let prevout = updater.pset().inputs[index]
        .non_witness_prevout()
        .cloned()
        .ok_or(Error::MissingUtxo)?;
    updater.update_input_with(index, |mut input| {
        input.add_witness_utxo(prevout)?;
        input.clear_non_witness_utxo();
        Ok(())
    })?;
    trace!("Replaced non_witness_utxo of input {} with witness_utxo", index);
    Ok(())
}

/// Errors that can occur while signing a PSET input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    IndexOutOfRange {
        index: usize,
        input_count: usize,
    },
    /// The input has no sighash type to sign with.
    MissingSighashType,
    /// The signature would commit to an output that has not been fully blinded yet.
    BlindingIncomplete {
        output_index: usize,
    },
    MissingSignature,
    /// The signature's trailing byte is not the input's sighash type.
    SighashMismatch {
        expected: u8,
        found: Option<u8>,
    },
    /// The previous output of a segwit spend is not known.
    MissingUtxo,
    Updater(UpdaterError),
    /// The signed PSET failed structural validation, and was discarded.
    InvalidStructure(VerifyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfRange { index, input_count } => write!(
                f,
                "input index {} out of range for {} inputs",
                index, input_count
            ),
            Error::MissingSighashType => write!(f, "input has no sighash type"),
            Error::BlindingIncomplete { output_index } => {
                write!(f, "output {} is not fully blinded", output_index)
            }
            Error::MissingSignature => write!(f, "no signature provided"),
            Error::SighashMismatch { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "signature has sighash type {:#04x}, expected {:#04x}",
                    found, expected
                ),
                None => write!(f, "signature is empty, expected sighash type {:#04x}", expected),
            },
            Error::MissingUtxo => write!(f, "previous output of the input is not known"),
            Error::Updater(e) => write!(f, "{}", e),
            Error::InvalidStructure(e) => write!(f, "signed PSET is invalid: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Updater(e) => Some(e),
            Error::InvalidStructure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UpdaterError> for Error {
    fn from(e: UpdaterError) -> Self {
        Error::Updater(e)
    }
}

use std::fmt;

use elements_protocol::confidential::{
    ASSET_COMMITMENT_PREFIXES, COMPRESSED_PUBKEY_PREFIXES, VALUE_COMMITMENT_PREFIXES,
};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
    common::{determine_lock_time, LOCK_TIME_THRESHOLD},
    confidential,
    sighash::SighashType,
    Input, Output, Pset,
};

/// The lowest transaction version a PSET can describe.
const MIN_TX_VERSION: u32 = 2;

impl Pset {
    /// Checks the structural consistency of the whole PSET.
    ///
    /// This covers the global counters and flags, the lock time requirements of the
    /// inputs, and every input and output (see [`Input::verify`] and
    /// [`Output::verify`]). It does not verify signatures.
    pub fn sanity_check(&self) -> Result<(), VerifyError> {
        let result = self.sanity_check_inner();
        if let Err(e) = &result {
            debug!("PSET failed structural validation: {}", e);
        }
        result
    }

    fn sanity_check_inner(&self) -> Result<(), VerifyError> {
        if self.global.input_count != self.inputs.len() {
            return Err(VerifyError::InputCountMismatch {
                expected: self.global.input_count,
                found: self.inputs.len(),
            });
        }
        if self.global.output_count != self.outputs.len() {
            return Err(VerifyError::OutputCountMismatch {
                expected: self.global.output_count,
                found: self.outputs.len(),
            });
        }
        if self.global.tx_version < MIN_TX_VERSION {
            return Err(VerifyError::UnsupportedTxVersion(self.global.tx_version));
        }
        if self.global.tx_modifiable >> 3 != 0 {
            return Err(VerifyError::InvalidTxModifiable(self.global.tx_modifiable));
        }

        for (index, input) in self.inputs.iter().enumerate() {
            input
                .verify()
                .map_err(|error| VerifyError::Input { index, error })?;
        }
        for (index, output) in self.outputs.iter().enumerate() {
            output
                .verify()
                .map_err(|error| VerifyError::Output { index, error })?;
        }

        if determine_lock_time(&self.global, &self.inputs).is_none() {
            return Err(VerifyError::IncompatibleLockTimes);
        }

        Ok(())
    }
}

impl Input {
    /// Verifies the consistency of this input.
    ///
    /// Fields that cannot be checked because the information they would be checked
    /// against is absent are accepted.
    pub fn verify(&self) -> Result<(), InputVerifyError> {
        self.verify_lock_times()?;
        self.verify_utxos()?;
        self.verify_scripts()?;
        self.verify_signatures()
    }

    fn verify_lock_times(&self) -> Result<(), InputVerifyError> {
        if let Some(time) = self.required_time_lock_time {
            if time < LOCK_TIME_THRESHOLD {
                return Err(InputVerifyError::InvalidRequiredTimeLockTime(time));
            }
        }
        if let Some(height) = self.required_height_lock_time {
            if height == 0 || height >= LOCK_TIME_THRESHOLD {
                return Err(InputVerifyError::InvalidRequiredHeightLockTime(height));
            }
        }
        Ok(())
    }

    fn verify_utxos(&self) -> Result<(), InputVerifyError> {
        if let Some(tx) = &self.non_witness_utxo {
            if tx.txid() != self.previous_txid {
                return Err(InputVerifyError::NonWitnessUtxoMismatch);
            }
            let prevout = tx
                .output(self.previous_output_index)
                .ok_or(InputVerifyError::MissingPreviousOutput)?;
            if let Some(witness_utxo) = &self.witness_utxo {
                if witness_utxo != prevout {
                    return Err(InputVerifyError::WitnessUtxoMismatch);
                }
            }
        }
        Ok(())
    }

    fn verify_scripts(&self) -> Result<(), InputVerifyError> {
        let spent_script = self.spent_script();

        if let (Some(redeem_script), Some(spent_script)) = (&self.redeem_script, spent_script) {
            match spent_script.hash160_payload() {
                Some(hash) if spent_script.is_p2sh() => {
                    if redeem_script.to_p2sh().hash160_payload() != Some(hash) {
                        return Err(InputVerifyError::WrongRedeemScript);
                    }
                }
                _ => return Err(InputVerifyError::NotP2sh),
            }
        }

        if let Some(witness_script) = &self.witness_script {
            // The P2WSH program is either spent directly or wrapped in P2SH.
            let program = match (spent_script, &self.redeem_script) {
                (Some(spent), _) if spent.is_p2wsh() => spent.witness_program(),
                (Some(spent), Some(redeem)) if spent.is_p2sh() && redeem.is_p2wsh() => {
                    redeem.witness_program()
                }
                (Some(spent), None) if spent.is_p2sh() => None,
                (Some(_), _) => return Err(InputVerifyError::NotP2wsh),
                (None, _) => None,
            };
            if let Some(program) = program {
                if program != Sha256::digest(witness_script.as_bytes()).as_slice() {
                    return Err(InputVerifyError::WrongWitnessScript);
                }
            }
        }

        Ok(())
    }

    fn verify_signatures(&self) -> Result<(), InputVerifyError> {
        if !self.partial_signatures.is_empty() {
            if self.is_taproot() {
                return Err(InputVerifyError::PartialSignatureOnTaprootInput);
            }
            let sighash_type = self
                .sighash_type
                .ok_or(InputVerifyError::SignatureWithoutSighashType)?;
            for (pubkey, signature) in &self.partial_signatures {
                if !COMPRESSED_PUBKEY_PREFIXES.contains(&pubkey[0]) {
                    return Err(InputVerifyError::InvalidPublicKey);
                }
                if signature.last() != Some(&sighash_type.encode()) {
                    return Err(InputVerifyError::SighashTypeMismatch);
                }
            }
        }

        if self.tap_key_sig.is_some() || !self.tap_script_sigs.is_empty() {
            if !self.is_taproot() {
                return Err(InputVerifyError::TaprootSignatureOnNonTaprootInput);
            }
            let sighash_type = self
                .sighash_type
                .ok_or(InputVerifyError::SignatureWithoutSighashType)?;
            let signatures = self
                .tap_key_sig
                .iter()
                .chain(self.tap_script_sigs.iter().map(|sig| &sig.signature));
            for signature in signatures {
                if schnorr_sighash_type(signature)? != sighash_type {
                    return Err(InputVerifyError::SighashTypeMismatch);
                }
            }
        }

        Ok(())
    }
}

/// Returns the sighash type a BIP 340 signature was made with.
///
/// A 64-byte signature implies `SIGHASH_DEFAULT`; a 65-byte signature carries an explicit
/// sighash type, which must not be `SIGHASH_DEFAULT`.
pub(crate) fn schnorr_sighash_type(signature: &[u8]) -> Result<SighashType, InputVerifyError> {
    match signature.len() {
        64 => Ok(SighashType::DEFAULT),
        65 => match SighashType::parse(signature[64]) {
            Some(SighashType::DEFAULT) | None => {
                Err(InputVerifyError::InvalidSchnorrSignatureEncoding)
            }
            Some(sighash_type) => Ok(sighash_type),
        },
        _ => Err(InputVerifyError::InvalidSchnorrSignatureEncoding),
    }
}

impl Output {
    /// Verifies the consistency of this output.
    ///
    /// Blind value and asset proofs are checked against the installed
    /// [`confidential::Backend`], if any.
    pub fn verify(&self) -> Result<(), OutputVerifyError> {
        if let Some(commitment) = &self.amount_commitment {
            if !VALUE_COMMITMENT_PREFIXES.contains(&commitment[0]) {
                return Err(OutputVerifyError::InvalidValueCommitment);
            }
        } else if self.amount.is_none() {
            return Err(OutputVerifyError::MissingAmount);
        }

        if let Some(commitment) = &self.asset_commitment {
            if !ASSET_COMMITMENT_PREFIXES.contains(&commitment[0]) {
                return Err(OutputVerifyError::InvalidAssetCommitment);
            }
        } else if self.asset.is_none() {
            return Err(OutputVerifyError::MissingAsset);
        }

        for key in [&self.blinding_key, &self.ecdh_pubkey].into_iter().flatten() {
            if !COMPRESSED_PUBKEY_PREFIXES.contains(&key[0]) {
                return Err(OutputVerifyError::InvalidPublicKey);
            }
        }

        if self.blinder_index.is_some() && self.blinding_key.is_none() {
            return Err(OutputVerifyError::BlinderIndexWithoutBlindingKey);
        }

        if let Some(proof) = &self.blind_value_proof {
            let (Some(amount), Some(value_commitment), Some(asset_commitment)) =
                (self.amount, &self.amount_commitment, &self.asset_commitment)
            else {
                return Err(OutputVerifyError::IncompleteBlindValueProof);
            };
            if let Some(backend) = confidential::backend() {
                if !backend.verify_blind_value_proof(
                    amount,
                    value_commitment,
                    asset_commitment,
                    proof,
                ) {
                    return Err(OutputVerifyError::InvalidBlindValueProof);
                }
            }
        }

        if let Some(proof) = &self.blind_asset_proof {
            let (Some(asset), Some(asset_commitment)) = (&self.asset, &self.asset_commitment)
            else {
                return Err(OutputVerifyError::IncompleteBlindAssetProof);
            };
            if let Some(backend) = confidential::backend() {
                if !backend.verify_blind_asset_proof(asset, asset_commitment, proof) {
                    return Err(OutputVerifyError::InvalidBlindAssetProof);
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur while verifying the structure of a PSET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    InputCountMismatch { expected: usize, found: usize },
    OutputCountMismatch { expected: usize, found: usize },
    UnsupportedTxVersion(u32),
    /// Reserved bits of `tx_modifiable` are set.
    InvalidTxModifiable(u8),
    /// The inputs require both a height-based and a time-based lock time.
    IncompatibleLockTimes,
    Input { index: usize, error: InputVerifyError },
    Output { index: usize, error: OutputVerifyError },
}

/// Errors that can occur while verifying a PSET input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputVerifyError {
    InvalidRequiredTimeLockTime(u32),
    InvalidRequiredHeightLockTime(u32),
    /// The `non_witness_utxo` is not the transaction referenced by `previous_txid`.
    NonWitnessUtxoMismatch,
    /// The `non_witness_utxo` has no output at `previous_output_index`.
    MissingPreviousOutput,
    /// The `witness_utxo` differs from the output it spends.
    WitnessUtxoMismatch,
    /// A `redeem_script` can only be set on a P2SH coin.
    NotP2sh,
    /// The `redeem_script` does not match the spent P2SH script.
    WrongRedeemScript,
    /// A `witness_script` can only be set on a P2WSH or P2SH-P2WSH coin.
    NotP2wsh,
    /// The `witness_script` does not match the P2WSH program.
    WrongWitnessScript,
    PartialSignatureOnTaprootInput,
    TaprootSignatureOnNonTaprootInput,
    SignatureWithoutSighashType,
    /// A signature was made with a sighash type other than the input's.
    SighashTypeMismatch,
    InvalidPublicKey,
    InvalidSchnorrSignatureEncoding,
}

/// Errors that can occur while verifying a PSET output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputVerifyError {
    InvalidValueCommitment,
    InvalidAssetCommitment,
    InvalidPublicKey,
    /// The output has neither an explicit amount nor a value commitment.
    MissingAmount,
    /// The output has neither an explicit asset nor an asset commitment.
    MissingAsset,
    BlinderIndexWithoutBlindingKey,
    /// A blind value proof needs the explicit amount and both commitments.
    IncompleteBlindValueProof,
    InvalidBlindValueProof,
    /// A blind asset proof needs the explicit asset and the asset commitment.
    IncompleteBlindAssetProof,
    InvalidBlindAssetProof,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::InputCountMismatch { expected, found } => write!(
                f,
                "input count is {} but there are {} inputs",
                expected, found
            ),
            VerifyError::OutputCountMismatch { expected, found } => write!(
                f,
                "output count is {} but there are {} outputs",
                expected, found
            ),
            VerifyError::UnsupportedTxVersion(version) => {
                write!(f, "unsupported transaction version {}", version)
            }
            VerifyError::InvalidTxModifiable(flags) => {
                write!(f, "reserved tx_modifiable bits are set: {:#010b}", flags)
            }
            VerifyError::IncompatibleLockTimes => {
                write!(f, "inputs require incompatible lock times")
            }
            VerifyError::Input { index, error } => write!(f, "input {}: {}", index, error),
            VerifyError::Output { index, error } => write!(f, "output {}: {}", index, error),
        }
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VerifyError::Input { error, .. } => Some(error),
            VerifyError::Output { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for InputVerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputVerifyError::InvalidRequiredTimeLockTime(time) => {
                write!(f, "{} is not a valid time lock time", time)
            }
            InputVerifyError::InvalidRequiredHeightLockTime(height) => {
                write!(f, "{} is not a valid height lock time", height)
            }
            InputVerifyError::NonWitnessUtxoMismatch => {
                write!(f, "non_witness_utxo does not match the previous txid")
            }
            InputVerifyError::MissingPreviousOutput => {
                write!(f, "non_witness_utxo has no output at the previous output index")
            }
            InputVerifyError::WitnessUtxoMismatch => {
                write!(f, "witness_utxo does not match the spent output")
            }
            InputVerifyError::NotP2sh => write!(f, "redeem_script set on a non-P2SH input"),
            InputVerifyError::WrongRedeemScript => {
                write!(f, "redeem_script does not match the spent script")
            }
            InputVerifyError::NotP2wsh => write!(f, "witness_script set on a non-P2WSH input"),
            InputVerifyError::WrongWitnessScript => {
                write!(f, "witness_script does not match the witness program")
            }
            InputVerifyError::PartialSignatureOnTaprootInput => {
                write!(f, "ECDSA signature on a taproot input")
            }
            InputVerifyError::TaprootSignatureOnNonTaprootInput => {
                write!(f, "Schnorr signature on a non-taproot input")
            }
            InputVerifyError::SignatureWithoutSighashType => {
                write!(f, "signature present but no sighash type set")
            }
            InputVerifyError::SighashTypeMismatch => {
                write!(f, "signature sighash type differs from the input's")
            }
            InputVerifyError::InvalidPublicKey => write!(f, "invalid public key"),
            InputVerifyError::InvalidSchnorrSignatureEncoding => {
                write!(f, "invalid Schnorr signature encoding")
            }
        }
    }
}

impl std::error::Error for InputVerifyError {}

impl fmt::Display for OutputVerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputVerifyError::InvalidValueCommitment => write!(f, "invalid value commitment"),
            OutputVerifyError::InvalidAssetCommitment => write!(f, "invalid asset commitment"),
            OutputVerifyError::InvalidPublicKey => write!(f, "invalid public key"),
            OutputVerifyError::MissingAmount => write!(f, "no amount or value commitment"),
            OutputVerifyError::MissingAsset => write!(f, "no asset or asset commitment"),
            OutputVerifyError::BlinderIndexWithoutBlindingKey => {
                write!(f, "blinder index set without a blinding key")
            }
            OutputVerifyError::IncompleteBlindValueProof => {
                write!(f, "blind value proof without explicit and committed values")
            }
            OutputVerifyError::InvalidBlindValueProof => write!(f, "invalid blind value proof"),
            OutputVerifyError::IncompleteBlindAssetProof => {
                write!(f, "blind asset proof without explicit and committed assets")
            }
            OutputVerifyError::InvalidBlindAssetProof => write!(f, "invalid blind asset proof"),
        }
    }
}

impl std::error::Error for OutputVerifyError {}

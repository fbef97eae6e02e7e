//! Signature hashes for the inputs of a PSET.
//!
//! Elements reuses the Bitcoin signature hash algorithms with a few changes: outputs and
//! spent amounts are written in their explicit or confidential encodings, segwit v0
//! hashes additionally commit to the issuances of the inputs, and taproot hashes commit
//! to the genesis block hash of the chain as well as to the range and surjection proofs
//! of the outputs.

use std::fmt;
use std::io::{self, Write};

use elements_protocol::{
    confidential::ConfidentialValue,
    encoding::{sha256_with, sha256d_with, write_var_bytes, HashWriter},
    script::Script,
    transaction::{OutPoint, Transaction, TxIn, TxOut},
};

use crate::{common::determine_lock_time, Input, Output, Pset};

const ANYONECANPAY_FLAG: u8 = 0x80;
const BASE_DEFAULT: u8 = 0x00;
const BASE_ALL: u8 = 0x01;
const BASE_NONE: u8 = 0x02;
const BASE_SINGLE: u8 = 0x03;

const TAP_SIGHASH_TAG: &str = "TapSighash/elements";
const TAP_LEAF_TAG: &str = "TapLeaf/elements";

/// The leaf version of tapscript leaves on Elements chains.
pub const TAPSCRIPT_LEAF_VERSION: u8 = 0xc4;

const KEY_VERSION_0: u8 = 0;
const NO_CODE_SEPARATOR: u32 = 0xffff_ffff;

/// A signature hash type.
///
/// Only the types that are valid for either ECDSA or Schnorr signatures can be
/// represented; [`SighashType::DEFAULT`] is only valid for taproot spends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SighashType(u8);

impl SighashType {
    /// Taproot only: behaves like `ALL`, but is not appended to the signature.
    pub const DEFAULT: Self = SighashType(BASE_DEFAULT);
    pub const ALL: Self = SighashType(BASE_ALL);
    pub const NONE: Self = SighashType(BASE_NONE);
    pub const SINGLE: Self = SighashType(BASE_SINGLE);
    pub const ALL_ANYONECANPAY: Self = SighashType(ANYONECANPAY_FLAG | BASE_ALL);
    pub const NONE_ANYONECANPAY: Self = SighashType(ANYONECANPAY_FLAG | BASE_NONE);
    pub const SINGLE_ANYONECANPAY: Self = SighashType(ANYONECANPAY_FLAG | BASE_SINGLE);

    /// Parses a sighash type from its byte encoding.
    pub fn parse(value: u8) -> Option<Self> {
        matches!(value, 0x00..=0x03 | 0x81..=0x83).then_some(SighashType(value))
    }

    /// Returns the byte encoding of this sighash type.
    pub fn encode(&self) -> u8 {
        self.0
    }

    pub fn is_anyone_can_pay(&self) -> bool {
        self.0 & ANYONECANPAY_FLAG != 0
    }

    /// Returns the output mode of this sighash type (`sighash_type & 0x1f`).
    pub fn base(&self) -> u8 {
        self.0 & 0x1f
    }

    /// Returns `true` if signatures of this type commit to every output of the
    /// transaction.
    pub fn commits_to_all_outputs(&self) -> bool {
        matches!(self.base(), BASE_DEFAULT | BASE_ALL)
    }

    pub fn is_none(&self) -> bool {
        self.base() == BASE_NONE
    }

    pub fn is_single(&self) -> bool {
        self.base() == BASE_SINGLE
    }
}

impl fmt::Display for SighashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.base() {
            BASE_DEFAULT => "SIGHASH_DEFAULT",
            BASE_ALL => "SIGHASH_ALL",
            BASE_NONE => "SIGHASH_NONE",
            _ => "SIGHASH_SINGLE",
        };
        write!(f, "{}", name)?;
        if self.is_anyone_can_pay() {
            write!(f, "|SIGHASH_ANYONECANPAY")?;
        }
        Ok(())
    }
}

/// Errors that can occur while computing a signature hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SighashError {
    /// The inputs require both a height-based and a time-based lock time.
    IncompatibleLockTimes,
    InvalidIndex,
    /// The sighash type of the input has not been set.
    MissingSighashType,
    /// The sighash type cannot be used with this signing algorithm.
    InvalidSighashType(u8),
    /// The output spent by the input at `index` is not known.
    MissingSpentOutput { index: usize },
    /// Only the signed input's spent output was provided, but the sighash type commits to
    /// all of them.
    InsufficientPrevouts,
    MissingRedeemScript,
    MissingWitnessScript,
    /// The output at `index` has a malformed commitment.
    InvalidOutput { index: usize },
    /// ECDSA was requested for a taproot input, or Schnorr for any other input.
    WrongSigningAlgorithm,
    /// `SIGHASH_SINGLE` was used for an input without a corresponding output.
    SingleOutputOutOfRange,
    /// The consensus encoding failed.
    Encoding,
}

impl fmt::Display for SighashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SighashError::IncompatibleLockTimes => {
                write!(f, "inputs require incompatible lock times")
            }
            SighashError::InvalidIndex => write!(f, "input index out of range"),
            SighashError::MissingSighashType => write!(f, "input has no sighash type"),
            SighashError::InvalidSighashType(value) => {
                write!(f, "sighash type {:#04x} is not valid here", value)
            }
            SighashError::MissingSpentOutput { index } => {
                write!(f, "the output spent by input {} is unknown", index)
            }
            SighashError::InsufficientPrevouts => {
                write!(f, "all spent outputs are required for this sighash type")
            }
            SighashError::MissingRedeemScript => write!(f, "P2SH input has no redeem script"),
            SighashError::MissingWitnessScript => {
                write!(f, "P2WSH input has no witness script")
            }
            SighashError::InvalidOutput { index } => {
                write!(f, "output {} has an invalid commitment", index)
            }
            SighashError::WrongSigningAlgorithm => {
                write!(f, "signing algorithm does not match the spent script")
            }
            SighashError::SingleOutputOutOfRange => {
                write!(f, "SIGHASH_SINGLE input has no corresponding output")
            }
            SighashError::Encoding => write!(f, "failed to encode signature hash data"),
        }
    }
}

impl std::error::Error for SighashError {}

impl From<io::Error> for SighashError {
    fn from(_: io::Error) -> Self {
        SighashError::Encoding
    }
}

/// The outputs spent by a transaction, as required by taproot signature hashes.
#[derive(Clone, Copy, Debug)]
pub enum Prevouts<'a> {
    /// The outputs spent by every input, in input order.
    All(&'a [TxOut]),
    /// Only the output spent by the input at the given index. Sufficient for
    /// `SIGHASH_ANYONECANPAY`.
    One(usize, &'a TxOut),
}

impl<'a> Prevouts<'a> {
    fn all(&self, input_count: usize) -> Result<&'a [TxOut], SighashError> {
        match *self {
            Prevouts::All(prevouts) if prevouts.len() == input_count => Ok(prevouts),
            Prevouts::All(prevouts) => Err(SighashError::MissingSpentOutput {
                index: prevouts.len(),
            }),
            Prevouts::One(..) => Err(SighashError::InsufficientPrevouts),
        }
    }

    fn get(&self, index: usize) -> Result<&'a TxOut, SighashError> {
        match *self {
            Prevouts::All(prevouts) => prevouts.get(index),
            Prevouts::One(one_index, prevout) => (one_index == index).then_some(prevout),
        }
        .ok_or(SighashError::MissingSpentOutput { index })
    }
}

/// The witness of a transaction output: its surjection proof and range proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputWitness<'a> {
    pub surjection_proof: &'a [u8],
    pub rangeproof: &'a [u8],
}

impl OutputWitness<'_> {
    fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_var_bytes(&mut writer, self.surjection_proof)?;
        write_var_bytes(&mut writer, self.rangeproof)
    }
}

/// Computes the hash of a tapscript leaf.
pub fn tap_leaf_hash(script: &Script) -> [u8; 32] {
    let mut writer = HashWriter::tagged(TAP_LEAF_TAG);
    // Writing into a hash state is infallible.
    let _ = writer
        .write_all(&[TAPSCRIPT_LEAF_VERSION])
        .and_then(|()| write_var_bytes(&mut writer, script.as_bytes()));
    writer.into_sha256()
}

fn write_u32<W: Write>(mut writer: W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Computes the signature hash of a pre-segwit input.
///
/// `script_code` is the script being executed: the redeem script for P2SH inputs, and
/// the spent `script_pubkey` otherwise.
pub fn legacy_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: SighashType,
) -> Result<[u8; 32], SighashError> {
    if input_index >= tx.inputs.len() {
        return Err(SighashError::InvalidIndex);
    }
    if hash_type == SighashType::DEFAULT {
        return Err(SighashError::InvalidSighashType(hash_type.encode()));
    }
    if hash_type.is_single() && input_index >= tx.outputs.len() {
        // Consensus quirk: such signatures sign the number one.
        let mut one = [0; 32];
        one[0] = 1;
        return Ok(one);
    }

    let anyone_can_pay = hash_type.is_anyone_can_pay();
    let inputs = tx
        .inputs
        .iter()
        .enumerate()
        .filter(|(index, _)| !anyone_can_pay || *index == input_index)
        .map(|(index, txin)| {
            if index == input_index {
                TxIn {
                    prevout: txin.prevout,
                    script_sig: script_code.clone(),
                    sequence: txin.sequence,
                }
            } else {
                TxIn {
                    prevout: txin.prevout,
                    script_sig: Script::default(),
                    sequence: if hash_type.is_none() || hash_type.is_single() {
                        0
                    } else {
                        txin.sequence
                    },
                }
            }
        })
        .collect();
    let outputs = if hash_type.is_none() {
        vec![]
    } else if hash_type.is_single() {
        tx.outputs
            .iter()
            .take(input_index + 1)
            .enumerate()
            .map(|(index, txout)| {
                if index == input_index {
                    txout.clone()
                } else {
                    TxOut::default()
                }
            })
            .collect()
    } else {
        tx.outputs.clone()
    };

    let tx_copy = Transaction {
        version: tx.version,
        lock_time: tx.lock_time,
        inputs,
        outputs,
    };
    Ok(sha256d_with(|writer| {
        tx_copy.write(&mut *writer)?;
        write_u32(&mut *writer, hash_type.encode().into())
    })?)
}

/// Computes the signature hash of a segwit v0 input.
///
/// `script_code` is the P2PKH script of the key hash for P2WPKH inputs, and the witness
/// script for P2WSH inputs. `spent_value` is the (possibly confidential) amount of the
/// output being spent.
pub fn segwit_v0_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    spent_value: &ConfidentialValue,
    hash_type: SighashType,
) -> Result<[u8; 32], SighashError> {
    let txin = tx
        .inputs
        .get(input_index)
        .ok_or(SighashError::InvalidIndex)?;
    if hash_type == SighashType::DEFAULT {
        return Err(SighashError::InvalidSighashType(hash_type.encode()));
    }
    let anyone_can_pay = hash_type.is_anyone_can_pay();

    let hash_prevouts = if anyone_can_pay {
        [0; 32]
    } else {
        sha256d_with(|writer| {
            tx.inputs
                .iter()
                .try_for_each(|txin| txin.prevout.write(&mut *writer))
        })?
    };
    let hash_sequence = if anyone_can_pay || hash_type.is_none() || hash_type.is_single() {
        [0; 32]
    } else {
        sha256d_with(|writer| {
            tx.inputs
                .iter()
                .try_for_each(|txin| write_u32(&mut *writer, txin.sequence))
        })?
    };
    // No input carries an issuance.
    let hash_issuances = if anyone_can_pay {
        [0; 32]
    } else {
        sha256d_with(|writer| tx.inputs.iter().try_for_each(|_| writer.write_all(&[0])))?
    };
    let hash_outputs = if hash_type.is_single() {
        match tx.outputs.get(input_index) {
            Some(txout) => sha256d_with(|writer| txout.write(writer))?,
            None => [0; 32],
        }
    } else if hash_type.is_none() {
        [0; 32]
    } else {
        sha256d_with(|writer| {
            tx.outputs
                .iter()
                .try_for_each(|txout| txout.write(&mut *writer))
        })?
    };

    Ok(sha256d_with(|writer| {
        write_u32(&mut *writer, tx.version)?;
        writer.write_all(&hash_prevouts)?;
        writer.write_all(&hash_sequence)?;
        writer.write_all(&hash_issuances)?;
        txin.prevout.write(&mut *writer)?;
        write_var_bytes(&mut *writer, script_code.as_bytes())?;
        spent_value.write(&mut *writer)?;
        write_u32(&mut *writer, txin.sequence)?;
        writer.write_all(&hash_outputs)?;
        write_u32(&mut *writer, tx.lock_time)?;
        write_u32(&mut *writer, hash_type.encode().into())
    })?)
}

/// Computes the signature hash of a taproot input.
///
/// `leaf_hash` selects a script-path spend of that leaf; `None` is a key-path spend.
/// `output_witnesses` must be in output order.
pub fn taproot_signature_hash(
    tx: &Transaction,
    output_witnesses: &[OutputWitness<'_>],
    prevouts: Prevouts<'_>,
    input_index: usize,
    leaf_hash: Option<[u8; 32]>,
    hash_type: SighashType,
    genesis_block_hash: [u8; 32],
) -> Result<[u8; 32], SighashError> {
    let txin = tx
        .inputs
        .get(input_index)
        .ok_or(SighashError::InvalidIndex)?;
    let anyone_can_pay = hash_type.is_anyone_can_pay();

    let mut writer = HashWriter::tagged(TAP_SIGHASH_TAG);
    // Epoch.
    writer.write_all(&[0])?;
    writer.write_all(&genesis_block_hash)?;
    writer.write_all(&genesis_block_hash)?;
    writer.write_all(&[hash_type.encode()])?;
    write_u32(&mut writer, tx.version)?;
    write_u32(&mut writer, tx.lock_time)?;

    if !anyone_can_pay {
        let prevouts = prevouts.all(tx.inputs.len())?;
        // Outpoint flags, all clear without issuances or peg-ins.
        let outpoint_flags =
            sha256_with(|w| tx.inputs.iter().try_for_each(|_| w.write_all(&[0])))?;
        let hash_prevouts = sha256_with(|w| {
            tx.inputs
                .iter()
                .try_for_each(|txin| txin.prevout.write(&mut *w))
        })?;
        let hash_asset_amounts = sha256_with(|w| {
            prevouts.iter().try_for_each(|prevout| {
                prevout.asset.write(&mut *w)?;
                prevout.value.write(&mut *w)
            })
        })?;
        let hash_script_pubkeys = sha256_with(|w| {
            prevouts
                .iter()
                .try_for_each(|prevout| write_var_bytes(&mut *w, prevout.script_pubkey.as_bytes()))
        })?;
        let hash_sequences = sha256_with(|w| {
            tx.inputs
                .iter()
                .try_for_each(|txin| write_u32(&mut *w, txin.sequence))
        })?;
        let hash_issuances = sha256_with(|w| tx.inputs.iter().try_for_each(|_| w.write_all(&[0])))?;
        // Two empty issuance range proofs per input.
        let hash_issuance_rangeproofs =
            sha256_with(|w| tx.inputs.iter().try_for_each(|_| w.write_all(&[0, 0])))?;

        writer.write_all(&outpoint_flags)?;
        writer.write_all(&hash_prevouts)?;
        writer.write_all(&hash_asset_amounts)?;
        writer.write_all(&hash_script_pubkeys)?;
        writer.write_all(&hash_sequences)?;
        writer.write_all(&hash_issuances)?;
        writer.write_all(&hash_issuance_rangeproofs)?;
    }

    if !hash_type.is_none() && !hash_type.is_single() {
        let hash_outputs = sha256_with(|w| {
            tx.outputs
                .iter()
                .try_for_each(|txout| txout.write(&mut *w))
        })?;
        let hash_output_witnesses = sha256_with(|w| {
            output_witnesses
                .iter()
                .try_for_each(|witness| witness.write(&mut *w))
        })?;
        writer.write_all(&hash_outputs)?;
        writer.write_all(&hash_output_witnesses)?;
    }

    let spend_type: u8 = if leaf_hash.is_some() { 2 } else { 0 };
    writer.write_all(&[spend_type])?;

    if anyone_can_pay {
        let prevout = prevouts.get(input_index)?;
        writer.write_all(&[0])?;
        txin.prevout.write(&mut writer)?;
        prevout.asset.write(&mut writer)?;
        prevout.value.write(&mut writer)?;
        write_var_bytes(&mut writer, prevout.script_pubkey.as_bytes())?;
        write_u32(&mut writer, txin.sequence)?;
        writer.write_all(&[0])?;
        writer.write_all(&sha256_with(|w| w.write_all(&[0, 0]))?)?;
    } else {
        let index = u32::try_from(input_index).map_err(|_| SighashError::InvalidIndex)?;
        write_u32(&mut writer, index)?;
    }

    if hash_type.is_single() {
        let txout = tx
            .outputs
            .get(input_index)
            .ok_or(SighashError::SingleOutputOutOfRange)?;
        let witness = output_witnesses
            .get(input_index)
            .copied()
            .unwrap_or_default();
        writer.write_all(&sha256_with(|w| txout.write(w))?)?;
        writer.write_all(&sha256_with(|w| witness.write(w))?)?;
    }

    if let Some(leaf_hash) = leaf_hash {
        writer.write_all(&leaf_hash)?;
        writer.write_all(&[KEY_VERSION_0])?;
        write_u32(&mut writer, NO_CODE_SEPARATOR)?;
    }

    Ok(writer.into_sha256())
}

impl Pset {
    /// Returns the transaction described by this PSET, without any signatures.
    pub fn unsigned_tx(&self) -> Result<Transaction, SighashError> {
        let lock_time = determine_lock_time(&self.global, &self.inputs)
            .ok_or(SighashError::IncompatibleLockTimes)?;

        let inputs = self
            .inputs
            .iter()
            .map(|input| TxIn {
                prevout: OutPoint::new(input.previous_txid, input.previous_output_index),
                script_sig: Script::default(),
                sequence: input.sequence_or_final(),
            })
            .collect();
        let outputs = self
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| {
                output
                    .to_txout()
                    .map_err(|_| SighashError::InvalidOutput { index })
            })
            .collect::<Result<_, _>>()?;

        Ok(Transaction {
            version: self.global.tx_version,
            lock_time,
            inputs,
            outputs,
        })
    }

    fn signing_input(&self, index: usize) -> Result<(&Input, SighashType), SighashError> {
        let input = self.inputs.get(index).ok_or(SighashError::InvalidIndex)?;
        let hash_type = input
            .sighash_type
            .ok_or(SighashError::MissingSighashType)?;
        Ok((input, hash_type))
    }

    /// Computes the digest an ECDSA signature for the input at `index` must sign.
    ///
    /// The input's sighash type is used; the algorithm (legacy or segwit v0) and the
    /// script code are selected from the spent script and the input's redeem and witness
    /// scripts.
    pub fn ecdsa_sighash(&self, index: usize) -> Result<[u8; 32], SighashError> {
        let (input, hash_type) = self.signing_input(index)?;
        let spent = input
            .spent_output()
            .ok_or(SighashError::MissingSpentOutput { index })?;
        if spent.script_pubkey.is_p2tr() {
            return Err(SighashError::WrongSigningAlgorithm);
        }

        let script = if spent.script_pubkey.is_p2sh() {
            input
                .redeem_script
                .as_ref()
                .ok_or(SighashError::MissingRedeemScript)?
        } else {
            &spent.script_pubkey
        };

        let tx = self.unsigned_tx()?;
        if script.is_v0_witness_program() {
            let script_code = match script.hash160_payload() {
                Some(pubkey_hash) => Script::p2pkh(&pubkey_hash),
                None => input
                    .witness_script
                    .clone()
                    .ok_or(SighashError::MissingWitnessScript)?,
            };
            segwit_v0_signature_hash(&tx, index, &script_code, &spent.value, hash_type)
        } else {
            legacy_signature_hash(&tx, index, script, hash_type)
        }
    }

    /// Computes the digest a Schnorr signature for the taproot input at `index` must sign.
    ///
    /// `leaf_hash` selects a script-path spend; `None` is a key-path spend.
    pub fn taproot_sighash(
        &self,
        index: usize,
        leaf_hash: Option<[u8; 32]>,
        genesis_block_hash: [u8; 32],
    ) -> Result<[u8; 32], SighashError> {
        let (input, hash_type) = self.signing_input(index)?;
        let spent = input
            .spent_output()
            .ok_or(SighashError::MissingSpentOutput { index })?;
        if !spent.script_pubkey.is_p2tr() {
            return Err(SighashError::WrongSigningAlgorithm);
        }

        let tx = self.unsigned_tx()?;
        let witnesses = self.outputs.iter().map(Output::witness).collect::<Vec<_>>();
        let all_prevouts;
        let prevouts = if hash_type.is_anyone_can_pay() {
            Prevouts::One(index, spent)
        } else {
            all_prevouts = self
                .inputs
                .iter()
                .enumerate()
                .map(|(index, input)| {
                    input
                        .spent_output()
                        .cloned()
                        .ok_or(SighashError::MissingSpentOutput { index })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Prevouts::All(&all_prevouts)
        };

        taproot_signature_hash(
            &tx,
            &witnesses,
            prevouts,
            index,
            leaf_hash,
            hash_type,
            genesis_block_hash,
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use elements_protocol::{
        consensus::{Network, Parameters},
        script::Script,
        transaction::TxOut,
    };

    use super::{
        legacy_signature_hash, tap_leaf_hash, taproot_signature_hash, OutputWitness, Prevouts,
        SighashError, SighashType,
    };
    use crate::testing::{funding_tx, pset_spending, with_sighash_type, ASSET};

    #[test]
    fn sighash_type_parsing() {
        for value in [0x00, 0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
            assert_eq!(SighashType::parse(value).map(|t| t.encode()), Some(value));
        }
        for value in [0x04, 0x80, 0x84, 0x41, 0xff] {
            assert_eq!(SighashType::parse(value), None);
        }
        assert!(SighashType::DEFAULT.commits_to_all_outputs());
        assert!(SighashType::ALL_ANYONECANPAY.commits_to_all_outputs());
        assert!(!SighashType::SINGLE.commits_to_all_outputs());
        assert_eq!(
            SighashType::NONE_ANYONECANPAY.to_string(),
            "SIGHASH_NONE|SIGHASH_ANYONECANPAY"
        );
    }

    #[test]
    fn legacy_single_without_output_signs_one() {
        let funding = [
            funding_tx(Script::p2pkh(&[1; 20]), 50_000),
            funding_tx(Script::p2pkh(&[2; 20]), 50_000),
            funding_tx(Script::p2pkh(&[3; 20]), 50_000),
        ];
        let mut pset = with_sighash_type(pset_spending(&funding), SighashType::SINGLE);
        for (input, tx) in pset.inputs.iter_mut().zip(&funding) {
            input.non_witness_utxo = Some(tx.clone());
        }

        let mut one = [0; 32];
        one[0] = 1;
        let tx = pset.unsigned_tx().unwrap();
        assert_eq!(
            legacy_signature_hash(&tx, 2, &Script::p2pkh(&[3; 20]), SighashType::SINGLE),
            Ok(one)
        );
        assert_eq!(pset.ecdsa_sighash(2), Ok(one));
        assert_ne!(pset.ecdsa_sighash(1).unwrap(), one);
        assert_eq!(
            legacy_signature_hash(&tx, 0, &Script::p2pkh(&[1; 20]), SighashType::DEFAULT),
            Err(SighashError::InvalidSighashType(0))
        );
    }

    #[test]
    fn segwit_none_ignores_outputs() {
        let funding = funding_tx(Script::p2wpkh(&[1; 20]), 100_000);
        let mut pset = pset_spending(&[funding.clone()]);
        pset.inputs[0].non_witness_utxo = Some(funding);

        let all = with_sighash_type(pset.clone(), SighashType::ALL);
        let none = with_sighash_type(pset, SighashType::NONE);

        let mut all_changed = all.clone();
        all_changed.outputs[0].amount = Some(80_000);
        let mut none_changed = none.clone();
        none_changed.outputs[0].amount = Some(80_000);

        assert_ne!(all.ecdsa_sighash(0).unwrap(), all_changed.ecdsa_sighash(0).unwrap());
        assert_eq!(
            none.ecdsa_sighash(0).unwrap(),
            none_changed.ecdsa_sighash(0).unwrap()
        );
    }

    #[test]
    fn ecdsa_script_code_requirements() {
        let witness_script = Script(vec![0x51]);
        let funding = funding_tx(Script::p2wsh(&witness_script), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[funding.clone()]), SighashType::ALL);
        assert_eq!(
            pset.ecdsa_sighash(0),
            Err(SighashError::MissingSpentOutput { index: 0 })
        );

        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());
        assert_eq!(pset.ecdsa_sighash(0), Err(SighashError::MissingWitnessScript));

        pset.inputs[0].witness_script = Some(witness_script);
        assert!(pset.ecdsa_sighash(0).is_ok());
        assert_eq!(
            pset.taproot_sighash(0, None, Network::Liquid.genesis_block_hash()),
            Err(SighashError::WrongSigningAlgorithm)
        );

        let p2sh = funding_tx(Script(vec![0x51]).to_p2sh(), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[p2sh.clone()]), SighashType::ALL);
        pset.inputs[0].non_witness_utxo = Some(p2sh);
        assert_eq!(pset.ecdsa_sighash(0), Err(SighashError::MissingRedeemScript));
        pset.inputs[0].redeem_script = Some(Script(vec![0x51]));
        assert!(pset.ecdsa_sighash(0).is_ok());
    }

    #[test]
    fn taproot_commits_to_chain_and_leaf() {
        let funding = funding_tx(Script::p2tr(&[9; 32]), 100_000);
        let mut pset = with_sighash_type(pset_spending(&[funding.clone()]), SighashType::DEFAULT);
        pset.inputs[0].witness_utxo = Some(funding.outputs[1].clone());

        let liquid = pset
            .taproot_sighash(0, None, Network::Liquid.genesis_block_hash())
            .unwrap();
        let testnet = pset
            .taproot_sighash(0, None, Network::LiquidTestnet.genesis_block_hash())
            .unwrap();
        let leaf = pset
            .taproot_sighash(
                0,
                Some(tap_leaf_hash(&Script(vec![0x51]))),
                Network::Liquid.genesis_block_hash(),
            )
            .unwrap();
        assert_ne!(liquid, testnet);
        assert_ne!(liquid, leaf);
        assert_eq!(
            pset.ecdsa_sighash(0),
            Err(SighashError::WrongSigningAlgorithm)
        );

        let mut proved = pset.clone();
        proved.outputs[0].value_rangeproof = Some(vec![1, 2, 3]);
        assert_ne!(
            proved
                .taproot_sighash(0, None, Network::Liquid.genesis_block_hash())
                .unwrap(),
            liquid
        );
    }

    #[test]
    fn taproot_anyone_can_pay_ignores_other_inputs() {
        let first = funding_tx(Script::p2tr(&[9; 32]), 100_000);
        let second = funding_tx(Script::p2wpkh(&[8; 20]), 100_000);
        let mut pset = with_sighash_type(
            pset_spending(&[first.clone(), second.clone()]),
            SighashType::ALL_ANYONECANPAY,
        );
        pset.inputs[0].witness_utxo = Some(first.outputs[1].clone());
        let genesis = Network::Liquid.genesis_block_hash();
        let before = pset.taproot_sighash(0, None, genesis).unwrap();

        pset.inputs[1].witness_utxo = Some(second.outputs[1].clone());
        pset.inputs[1].sequence = Some(0);
        assert_eq!(pset.taproot_sighash(0, None, genesis).unwrap(), before);

        pset.inputs[0].sighash_type = Some(SighashType::ALL);
        assert_ne!(pset.taproot_sighash(0, None, genesis).unwrap(), before);
    }

    #[test]
    fn taproot_prevout_requirements() {
        let pset = pset_spending(&[funding_tx(Script::p2tr(&[9; 32]), 1)]);
        let tx = pset.unsigned_tx().unwrap();
        let prevout = TxOut::explicit(ASSET, 1, Script::p2tr(&[9; 32]));
        let witnesses = [OutputWitness::default(), OutputWitness::default()];
        let genesis = Network::Liquid.genesis_block_hash();

        assert_matches!(
            taproot_signature_hash(
                &tx,
                &witnesses,
                Prevouts::One(0, &prevout),
                0,
                None,
                SighashType::ALL,
                genesis,
            ),
            Err(SighashError::InsufficientPrevouts)
        );
        assert_matches!(
            taproot_signature_hash(
                &tx,
                &witnesses,
                Prevouts::One(0, &prevout),
                0,
                None,
                SighashType::ALL_ANYONECANPAY,
                genesis,
            ),
            Ok(_)
        );
        assert_matches!(
            taproot_signature_hash(
                &tx,
                &witnesses,
                Prevouts::All(&[prevout.clone()]),
                2,
                None,
                SighashType::ALL,
                genesis,
            ),
            Err(SighashError::InvalidIndex)
        );
    }

    #[test]
    fn taproot_single_requires_output() {
        let funding = [
            funding_tx(Script::p2tr(&[9; 32]), 1),
            funding_tx(Script::p2tr(&[8; 32]), 1),
            funding_tx(Script::p2tr(&[7; 32]), 1),
        ];
        let mut pset = with_sighash_type(pset_spending(&funding), SighashType::SINGLE);
        for (input, tx) in pset.inputs.iter_mut().zip(&funding) {
            input.witness_utxo = Some(tx.outputs[1].clone());
        }
        let genesis = Network::Liquid.genesis_block_hash();
        assert!(pset.taproot_sighash(1, None, genesis).is_ok());
        assert_eq!(
            pset.taproot_sighash(2, None, genesis),
            Err(SighashError::SingleOutputOutOfRange)
        );
    }
}

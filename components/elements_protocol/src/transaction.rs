//! Elements transactions, as far as they are needed to identify coins and to compute
//! signature hashes.
//!
//! Asset issuances and peg-ins are not modelled: every input is a plain spend of a
//! previous output, and the corresponding outpoint flags are always clear.

use std::io::{self, Write};

use crate::{
    confidential::{ConfidentialAsset, ConfidentialNonce, ConfidentialValue},
    encoding::{sha256d_with, write_var_bytes, CompactSize, WriteBytesExt},
    script::Script,
    TxId,
};

/// The sequence number that disables relative lock times and replacement.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// A reference to an output of a previous transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: TxId,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: TxId, vout: u32) -> Self {
        OutPoint { txid, vout }
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.txid.write(&mut writer)?;
        writer.write_u32_le(self.vout)
    }
}

/// A transaction input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.prevout.write(&mut writer)?;
        write_var_bytes(&mut writer, &self.script_sig.0)?;
        writer.write_u32_le(self.sequence)
    }
}

/// A transaction output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOut {
    pub asset: ConfidentialAsset,
    pub value: ConfidentialValue,
    pub nonce: ConfidentialNonce,
    pub script_pubkey: Script,
}

impl TxOut {
    /// Constructs an unblinded output.
    pub fn explicit(asset: [u8; 32], value: u64, script_pubkey: Script) -> Self {
        TxOut {
            asset: ConfidentialAsset::Explicit(asset),
            value: ConfidentialValue::Explicit(value),
            nonce: ConfidentialNonce::Null,
            script_pubkey,
        }
    }

    /// Returns `true` if this output pays a fee (an explicit output with an empty script).
    pub fn is_fee(&self) -> bool {
        self.script_pubkey.is_empty()
            && matches!(self.asset, ConfidentialAsset::Explicit(_))
            && matches!(self.value, ConfidentialValue::Explicit(_))
    }

    /// Writes the consensus encoding of this output, excluding its witness (range proof
    /// and surjection proof).
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.asset.write(&mut writer)?;
        self.value.write(&mut writer)?;
        self.nonce.write(&mut writer)?;
        write_var_bytes(&mut writer, &self.script_pubkey.0)
    }
}

/// An Elements transaction without witness data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub lock_time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
}

impl Transaction {
    /// Writes the transaction in its witness-stripped form.
    ///
    /// Elements always serializes the witness flag byte; it is zero here because no
    /// witness follows.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32_le(self.version)?;
        writer.write_u8(0)?;
        CompactSize::write(&mut writer, self.inputs.len())?;
        for input in &self.inputs {
            input.write(&mut writer)?;
        }
        CompactSize::write(&mut writer, self.outputs.len())?;
        for output in &self.outputs {
            output.write(&mut writer)?;
        }
        writer.write_u32_le(self.lock_time)
    }

    /// Computes the identifier of this transaction.
    pub fn txid(&self) -> TxId {
        // Writing into a hash state is infallible.
        let hash = sha256d_with(|w| self.write(w)).unwrap_or([0; 32]);
        TxId::from_bytes(hash)
    }

    /// Returns the output at the given index, if it exists.
    pub fn output(&self, index: u32) -> Option<&TxOut> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.outputs.get(index))
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::*;

    use super::{OutPoint, Transaction, TxIn, TxOut, SEQUENCE_FINAL};
    use crate::{script::testing::arb_p2wpkh, TxId};

    prop_compose! {
        pub fn arb_explicit_txout()(
            asset in prop::array::uniform32(any::<u8>()),
            value in 1u64..21_000_000_00000000,
            script_pubkey in arb_p2wpkh(),
        ) -> TxOut {
            TxOut::explicit(asset, value, script_pubkey)
        }
    }

    prop_compose! {
        pub fn arb_transaction()(
            prev in prop::array::uniform32(any::<u8>()),
            outputs in prop::collection::vec(arb_explicit_txout(), 1..4),
        ) -> Transaction {
            Transaction {
                version: 2,
                lock_time: 0,
                inputs: vec![TxIn {
                    prevout: OutPoint::new(TxId::from_bytes(prev), 0),
                    script_sig: Default::default(),
                    sequence: SEQUENCE_FINAL,
                }],
                outputs,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{testing::arb_transaction, Transaction, TxOut};
    use crate::script::Script;

    #[test]
    fn empty_transaction_encoding() {
        let tx = Transaction {
            version: 2,
            lock_time: 0,
            inputs: vec![],
            outputs: vec![],
        };
        let mut buf = vec![];
        tx.write(&mut buf).unwrap();
        assert_eq!(buf, [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn fee_output_detection() {
        assert!(TxOut::explicit([1; 32], 500, Script::default()).is_fee());
        assert!(!TxOut::explicit([1; 32], 500, Script::p2wpkh(&[2; 20])).is_fee());
    }

    proptest! {
        #[test]
        fn txid_commits_to_outputs(tx in arb_transaction()) {
            let mut other = tx.clone();
            other.outputs.pop();
            prop_assert_ne!(tx.txid(), other.txid());
            prop_assert_eq!(tx.txid(), tx.clone().txid());
            prop_assert!(tx.output(0).is_some());
            prop_assert!(tx.output(tx.outputs.len() as u32).is_none());
        }
    }
}

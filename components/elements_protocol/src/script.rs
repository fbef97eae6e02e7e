//! Scripts and the standard templates used to lock Elements coins.

use core::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Script opcodes needed to recognise the standard templates.
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHBYTES_20: u8 = 0x14;
    pub const OP_PUSHBYTES_32: u8 = 0x20;
    pub const OP_1: u8 = 0x51;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
}

use opcodes::*;

/// The maximum size of a script that can be executed.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Computes `RIPEMD160(SHA256(data))`.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// A serialized script, used inside transparent inputs and outputs of a transaction.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Script(pub Vec<u8>);

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Script").field(&hex::encode(&self.0)).finish()
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }
}

impl Script {
    /// Returns the script for a pay-to-public-key-hash output.
    pub fn p2pkh(pubkey_hash: &[u8; 20]) -> Self {
        let mut script = vec![OP_DUP, OP_HASH160, OP_PUSHBYTES_20];
        script.extend_from_slice(pubkey_hash);
        script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(script)
    }

    /// Returns the script for a pay-to-script-hash output.
    pub fn p2sh(script_hash: &[u8; 20]) -> Self {
        let mut script = vec![OP_HASH160, OP_PUSHBYTES_20];
        script.extend_from_slice(script_hash);
        script.push(OP_EQUAL);
        Script(script)
    }

    /// Returns the version 0 witness program locking to the given public key hash.
    pub fn p2wpkh(pubkey_hash: &[u8; 20]) -> Self {
        let mut script = vec![OP_0, OP_PUSHBYTES_20];
        script.extend_from_slice(pubkey_hash);
        Script(script)
    }

    /// Returns the version 0 witness program locking to the SHA-256 of the given witness
    /// script.
    pub fn p2wsh(witness_script: &Script) -> Self {
        let mut script = vec![OP_0, OP_PUSHBYTES_32];
        script.extend_from_slice(&Sha256::digest(&witness_script.0));
        Script(script)
    }

    /// Returns the version 1 witness program locking to the given x-only output key.
    pub fn p2tr(output_key: &[u8; 32]) -> Self {
        let mut script = vec![OP_1, OP_PUSHBYTES_32];
        script.extend_from_slice(output_key);
        Script(script)
    }

    /// Returns the pay-to-script-hash output committing to this script.
    pub fn to_p2sh(&self) -> Self {
        Script::p2sh(&hash160(&self.0))
    }

    /// Returns the raw bytes of the script.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if this is a pay-to-public-key-hash script.
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == OP_PUSHBYTES_20
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
    }

    /// Returns `true` if this is a pay-to-script-hash script.
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23
            && self.0[0] == OP_HASH160
            && self.0[1] == OP_PUSHBYTES_20
            && self.0[22] == OP_EQUAL
    }

    /// Returns `true` if this is a version 0 pay-to-witness-public-key-hash script.
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == OP_PUSHBYTES_20
    }

    /// Returns `true` if this is a version 0 pay-to-witness-script-hash script.
    pub fn is_p2wsh(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_0 && self.0[1] == OP_PUSHBYTES_32
    }

    /// Returns `true` if this is a version 1 (taproot) witness program.
    pub fn is_p2tr(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_1 && self.0[1] == OP_PUSHBYTES_32
    }

    /// Returns `true` if this is a version 0 witness program of either kind.
    pub fn is_v0_witness_program(&self) -> bool {
        self.is_p2wpkh() || self.is_p2wsh()
    }

    /// Returns the program pushed by a version 0 or version 1 witness script.
    pub fn witness_program(&self) -> Option<&[u8]> {
        if self.is_p2wpkh() || self.is_p2wsh() || self.is_p2tr() {
            Some(&self.0[2..])
        } else {
            None
        }
    }

    /// Returns the 20-byte hash committed to by a P2PKH, P2SH or P2WPKH script.
    pub fn hash160_payload(&self) -> Option<[u8; 20]> {
        let range = if self.is_p2pkh() {
            3..23
        } else if self.is_p2sh() || self.is_p2wpkh() {
            2..22
        } else {
            return None;
        };
        let mut hash = [0; 20];
        hash.copy_from_slice(&self.0[range]);
        Some(hash)
    }

    /// Returns the x-only output key of a taproot script.
    pub fn taproot_output_key(&self) -> Option<[u8; 32]> {
        if self.is_p2tr() {
            let mut key = [0; 32];
            key.copy_from_slice(&self.0[2..]);
            Some(key)
        } else {
            None
        }
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::*;

    use super::Script;

    prop_compose! {
        pub fn arb_p2wpkh()(hash in prop::array::uniform20(any::<u8>())) -> Script {
            Script::p2wpkh(&hash)
        }
    }

    prop_compose! {
        pub fn arb_witness_script()(bytes in prop::collection::vec(any::<u8>(), 1..64)) -> Script {
            Script(bytes)
        }
    }
}

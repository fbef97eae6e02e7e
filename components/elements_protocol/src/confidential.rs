//! Explicit and confidential encodings of assets, values and nonces.
//!
//! Each field of an Elements transaction output is either absent (`Null`), given in the
//! clear (`Explicit`), or replaced by a Pedersen commitment (`Confidential`). Commitments
//! are stored as a prefix byte plus the 32-byte x-coordinate, exactly as they appear on
//! the wire; whether the point is on the curve is the concern of the cryptography
//! backend, not of this crate.

use std::io::{self, Write};

use crate::encoding::WriteBytesExt;

/// Prefix byte of an explicit asset, value or nonce.
pub const EXPLICIT_PREFIX: u8 = 0x01;

/// Valid prefix bytes of an asset commitment.
pub const ASSET_COMMITMENT_PREFIXES: [u8; 2] = [0x0a, 0x0b];

/// Valid prefix bytes of a value commitment.
pub const VALUE_COMMITMENT_PREFIXES: [u8; 2] = [0x08, 0x09];

/// Valid prefix bytes of a compressed secp256k1 public key.
pub const COMPRESSED_PUBKEY_PREFIXES: [u8; 2] = [0x02, 0x03];

/// Valid prefix bytes of a nonce commitment, which is a compressed public key.
pub const NONCE_COMMITMENT_PREFIXES: [u8; 2] = COMPRESSED_PUBKEY_PREFIXES;

/// Errors that can occur when interpreting a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentError {
    /// The commitment does not start with a prefix valid for its kind.
    InvalidPrefix(u8),
}

/// Splits a 33-byte commitment into its prefix and payload, checking the prefix.
fn split_commitment(
    bytes: &[u8; 33],
    prefixes: &[u8; 2],
) -> Result<(u8, [u8; 32]), CommitmentError> {
    if !prefixes.contains(&bytes[0]) {
        return Err(CommitmentError::InvalidPrefix(bytes[0]));
    }
    let mut payload = [0; 32];
    payload.copy_from_slice(&bytes[1..]);
    Ok((bytes[0], payload))
}

/// An asset identifier, either explicit or blinded behind a commitment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConfidentialAsset {
    #[default]
    Null,
    Explicit([u8; 32]),
    Confidential(u8, [u8; 32]),
}

impl ConfidentialAsset {
    /// Parses a 33-byte asset commitment.
    pub fn from_commitment(bytes: &[u8; 33]) -> Result<Self, CommitmentError> {
        split_commitment(bytes, &ASSET_COMMITMENT_PREFIXES)
            .map(|(prefix, payload)| ConfidentialAsset::Confidential(prefix, payload))
    }

    pub fn is_confidential(&self) -> bool {
        matches!(self, ConfidentialAsset::Confidential(..))
    }

    /// Writes the consensus encoding of this asset.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        match self {
            ConfidentialAsset::Null => writer.write_u8(0),
            ConfidentialAsset::Explicit(asset) => {
                writer.write_u8(EXPLICIT_PREFIX)?;
                writer.write_all(asset)
            }
            ConfidentialAsset::Confidential(prefix, payload) => {
                writer.write_u8(*prefix)?;
                writer.write_all(payload)
            }
        }
    }
}

/// An amount, either explicit or blinded behind a commitment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConfidentialValue {
    #[default]
    Null,
    Explicit(u64),
    Confidential(u8, [u8; 32]),
}

impl ConfidentialValue {
    /// Parses a 33-byte value commitment.
    pub fn from_commitment(bytes: &[u8; 33]) -> Result<Self, CommitmentError> {
        split_commitment(bytes, &VALUE_COMMITMENT_PREFIXES)
            .map(|(prefix, payload)| ConfidentialValue::Confidential(prefix, payload))
    }

    pub fn is_confidential(&self) -> bool {
        matches!(self, ConfidentialValue::Confidential(..))
    }

    /// Returns the amount if it is explicit.
    pub fn explicit(&self) -> Option<u64> {
        match self {
            ConfidentialValue::Explicit(value) => Some(*value),
            _ => None,
        }
    }

    /// Writes the consensus encoding of this value.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        match self {
            ConfidentialValue::Null => writer.write_u8(0),
            ConfidentialValue::Explicit(value) => {
                writer.write_u8(EXPLICIT_PREFIX)?;
                writer.write_u64_be(*value)
            }
            ConfidentialValue::Confidential(prefix, payload) => {
                writer.write_u8(*prefix)?;
                writer.write_all(payload)
            }
        }
    }
}

/// The nonce of an output: for blinded outputs, the ephemeral ECDH public key used to
/// share the blinding factors with the receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConfidentialNonce {
    #[default]
    Null,
    Explicit([u8; 32]),
    Confidential(u8, [u8; 32]),
}

impl ConfidentialNonce {
    /// Parses a 33-byte compressed public key used as a nonce.
    pub fn from_commitment(bytes: &[u8; 33]) -> Result<Self, CommitmentError> {
        split_commitment(bytes, &NONCE_COMMITMENT_PREFIXES)
            .map(|(prefix, payload)| ConfidentialNonce::Confidential(prefix, payload))
    }

    /// Writes the consensus encoding of this nonce.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        match self {
            ConfidentialNonce::Null => writer.write_u8(0),
            ConfidentialNonce::Explicit(nonce) => {
                writer.write_u8(EXPLICIT_PREFIX)?;
                writer.write_all(nonce)
            }
            ConfidentialNonce::Confidential(prefix, payload) => {
                writer.write_u8(*prefix)?;
                writer.write_all(payload)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitmentError, ConfidentialAsset, ConfidentialNonce, ConfidentialValue};

    fn encode<F: FnOnce(&mut Vec<u8>)>(f: F) -> Vec<u8> {
        let mut buf = vec![];
        f(&mut buf);
        buf
    }

    #[test]
    fn explicit_value_is_big_endian() {
        let buf = encode(|w| ConfidentialValue::Explicit(0x0102).write(w).unwrap());
        assert_eq!(buf, [0x01, 0, 0, 0, 0, 0, 0, 0x01, 0x02]);
    }

    #[test]
    fn null_fields_encode_as_single_zero() {
        assert_eq!(encode(|w| ConfidentialAsset::Null.write(w).unwrap()), [0]);
        assert_eq!(encode(|w| ConfidentialValue::Null.write(w).unwrap()), [0]);
        assert_eq!(encode(|w| ConfidentialNonce::Null.write(w).unwrap()), [0]);
    }

    #[test]
    fn commitments_check_their_prefix() {
        let mut bytes = [0x11; 33];

        bytes[0] = 0x0a;
        assert!(ConfidentialAsset::from_commitment(&bytes).is_ok());
        assert_eq!(
            ConfidentialValue::from_commitment(&bytes),
            Err(CommitmentError::InvalidPrefix(0x0a))
        );

        bytes[0] = 0x09;
        let value = ConfidentialValue::from_commitment(&bytes).unwrap();
        assert!(value.is_confidential());
        assert_eq!(value.explicit(), None);
        assert_eq!(encode(|w| value.write(w).unwrap()), bytes.to_vec());

        bytes[0] = 0x03;
        assert!(ConfidentialNonce::from_commitment(&bytes).is_ok());
        assert!(ConfidentialAsset::from_commitment(&bytes).is_err());
    }
}

//! Consensus encoding helpers and the digests built on top of them.
//!
//! Everything that is hashed for a transaction identifier or a signature hash is written
//! through [`std::io::Write`], so the same encoders can target a `Vec<u8>` or a running
//! SHA-256 state.

use std::io::{self, Write};

use sha2::{Digest, Sha256};

pub(crate) trait WriteBytesExt {
    fn write_u8(self, value: u8) -> io::Result<()>;
    fn write_u32_le(self, value: u32) -> io::Result<()>;
    fn write_u64_be(self, value: u64) -> io::Result<()>;
}

impl<W: Write> WriteBytesExt for &mut W {
    fn write_u8(self, value: u8) -> io::Result<()> {
        self.write_all(&[value])
    }

    fn write_u32_le(self, value: u32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    // Explicit confidential values are the only big-endian integers on the wire.
    fn write_u64_be(self, value: u64) -> io::Result<()> {
        self.write_all(&value.to_be_bytes())
    }
}

/// Namespace for functions for compact encoding of integers.
///
/// These are the Bitcoin "CompactSize" integers used as length prefixes.
pub struct CompactSize;

impl CompactSize {
    /// Writes the given size as a CompactSize.
    pub fn write<W: Write>(mut writer: W, size: usize) -> io::Result<()> {
        match size {
            s if s < 253 => writer.write_all(&[s as u8]),
            s if s <= 0xFFFF => {
                writer.write_all(&[253])?;
                writer.write_all(&(s as u16).to_le_bytes())
            }
            s if s <= 0xFFFF_FFFF => {
                writer.write_all(&[254])?;
                writer.write_all(&(s as u32).to_le_bytes())
            }
            s => {
                writer.write_all(&[255])?;
                writer.write_all(&(s as u64).to_le_bytes())
            }
        }
    }

    /// Returns the number of bytes needed to encode the given size.
    pub fn serialized_size(size: usize) -> usize {
        match size {
            s if s < 253 => 1,
            s if s <= 0xFFFF => 3,
            s if s <= 0xFFFF_FFFF => 5,
            _ => 9,
        }
    }
}

/// Writes a CompactSize-prefixed byte string.
pub fn write_var_bytes<W: Write>(mut writer: W, bytes: &[u8]) -> io::Result<()> {
    CompactSize::write(&mut writer, bytes.len())?;
    writer.write_all(bytes)
}

/// A [`Write`] sink feeding a SHA-256 state.
#[derive(Clone, Default)]
pub struct HashWriter(Sha256);

impl HashWriter {
    /// Starts a BIP 340 tagged hash with the given tag.
    pub fn tagged(tag: &str) -> Self {
        let tag_hash = Sha256::digest(tag.as_bytes());
        let mut state = Sha256::new();
        state.update(tag_hash);
        state.update(tag_hash);
        HashWriter(state)
    }

    /// Returns the single SHA-256 of everything written.
    pub fn into_sha256(self) -> [u8; 32] {
        self.0.finalize().into()
    }

    /// Returns the double SHA-256 of everything written.
    pub fn into_sha256d(self) -> [u8; 32] {
        Sha256::digest(self.0.finalize()).into()
    }
}

impl Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Computes the double SHA-256 of the data written by `f`.
///
/// Writing into a hash state cannot fail; any error from `f` would come from the encoder
/// itself, and is returned as-is.
pub fn sha256d_with<F>(f: F) -> io::Result<[u8; 32]>
where
    F: FnOnce(&mut HashWriter) -> io::Result<()>,
{
    let mut writer = HashWriter::default();
    f(&mut writer)?;
    Ok(writer.into_sha256d())
}

/// Computes the single SHA-256 of the data written by `f`.
pub fn sha256_with<F>(f: F) -> io::Result<[u8; 32]>
where
    F: FnOnce(&mut HashWriter) -> io::Result<()>,
{
    let mut writer = HashWriter::default();
    f(&mut writer)?;
    Ok(writer.into_sha256())
}

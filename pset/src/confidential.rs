//! The cryptography backend used to judge blinded outputs.
//!
//! This crate does not implement range proofs or Pedersen commitments. Callers that
//! need their outputs checked cryptographically install a [`Backend`] once per process;
//! without one, blinding completeness is judged by the presence and shape of the
//! blinding fields alone.

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

/// Verification of the proofs attached to blinded outputs.
pub trait Backend: Send + Sync {
    /// Verifies that `proof` shows the value committed to by `value_commitment` is in
    /// range, for an output with the given asset commitment and script.
    fn verify_value_rangeproof(
        &self,
        proof: &[u8],
        value_commitment: &[u8; 33],
        asset_commitment: &[u8; 33],
        script_pubkey: &[u8],
    ) -> bool;

    /// Verifies that `value_commitment` commits to the explicit `amount`.
    fn verify_blind_value_proof(
        &self,
        amount: u64,
        value_commitment: &[u8; 33],
        asset_commitment: &[u8; 33],
        proof: &[u8],
    ) -> bool;

    /// Verifies that `asset_commitment` commits to the explicit `asset`.
    fn verify_blind_asset_proof(
        &self,
        asset: &[u8; 32],
        asset_commitment: &[u8; 33],
        proof: &[u8],
    ) -> bool;
}

static BACKEND: OnceLock<Box<dyn Backend>> = OnceLock::new();

/// Returned by [`install`] when a backend has already been installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyInstalled;

impl fmt::Display for AlreadyInstalled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a confidential backend has already been installed")
    }
}

impl std::error::Error for AlreadyInstalled {}

/// Installs the process-wide confidential backend.
///
/// The backend cannot be replaced once installed.
pub fn install<B: Backend + 'static>(backend: B) -> Result<(), AlreadyInstalled> {
    BACKEND
        .set(Box::new(backend))
        .map_err(|_| AlreadyInstalled)?;
    debug!("Installed confidential backend");
    Ok(())
}

/// Returns the installed backend, if any.
pub fn backend() -> Option<&'static dyn Backend> {
    BACKEND.get().map(|backend| backend.as_ref())
}

//! Signature verification capabilities backed by `secp256k1`.
//!
//! Each function returns a closure suitable as the `verify` argument of
//! [`Signer::sign_input`](super::Signer::sign_input) and the Updater's signature
//! setters. Malformed keys or signatures are reported as invalid.

use secp256k1::{ecdsa, schnorr, Message, PublicKey, Secp256k1, Verification, XOnlyPublicKey};

/// Verifies DER-encoded ECDSA signatures made with compressed public keys.
pub fn ecdsa<C: Verification>(
    secp: &Secp256k1<C>,
) -> impl Fn(&[u8], &[u8; 32], &[u8]) -> bool + '_ {
    move |pubkey: &[u8], sighash: &[u8; 32], signature: &[u8]| {
        verify_ecdsa(secp, pubkey, sighash, signature)
    }
}

/// Verifies 64-byte BIP 340 signatures made with x-only public keys.
pub fn schnorr<C: Verification>(
    secp: &Secp256k1<C>,
) -> impl Fn(&[u8], &[u8; 32], &[u8]) -> bool + '_ {
    move |pubkey: &[u8], sighash: &[u8; 32], signature: &[u8]| {
        verify_schnorr(secp, pubkey, sighash, signature)
    }
}

/// Verifies either kind of signature, selected by the length of the public key.
///
/// This is the capability to pass to the Signer, which uses it for ECDSA and Schnorr
/// signatures alike.
pub fn verifier<C: Verification>(
    secp: &Secp256k1<C>,
) -> impl Fn(&[u8], &[u8; 32], &[u8]) -> bool + '_ {
    move |pubkey: &[u8], sighash: &[u8; 32], signature: &[u8]| match pubkey.len() {
        33 => verify_ecdsa(secp, pubkey, sighash, signature),
        32 => verify_schnorr(secp, pubkey, sighash, signature),
        _ => false,
    }
}

fn verify_ecdsa<C: Verification>(
    secp: &Secp256k1<C>,
    pubkey: &[u8],
    sighash: &[u8; 32],
    signature: &[u8],
) -> bool {
    let (Ok(pubkey), Ok(signature)) = (
        PublicKey::from_slice(pubkey),
        ecdsa::Signature::from_der(signature),
    ) else {
        return false;
    };
    secp.verify_ecdsa(&Message::from_digest(*sighash), &signature, &pubkey)
        .is_ok()
}

fn verify_schnorr<C: Verification>(
    secp: &Secp256k1<C>,
    pubkey: &[u8],
    sighash: &[u8; 32],
    signature: &[u8],
) -> bool {
    let (Ok(pubkey), Ok(signature)) = (
        XOnlyPublicKey::from_slice(pubkey),
        schnorr::Signature::from_slice(signature),
    ) else {
        return false;
    };
    secp.verify_schnorr(&signature, &Message::from_digest(*sighash), &pubkey)
        .is_ok()
}

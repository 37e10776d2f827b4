//! P-256 ECDSA (ES256) signatures
//!
//! COSE algorithm identifier: -7 (ES256)
//!
//! - Curve: P-256 (secp256r1)
//! - Hash: SHA-256 (applied by the signing operation)
//! - Signature format: DER-encoded or raw (r || s)
//! - Public keys: 65-byte uncompressed SEC1 (0x04 || x || y)

use crate::error::{CryptoError, Result};

use p256::ecdsa::{Signature, SigningKey, VerifyingKey, signature::Signer, signature::Verifier};
use rand::rngs::OsRng;

/// Length of a P-256 private scalar in bytes
pub const SCALAR_LEN: usize = 32;

/// Length of an uncompressed SEC1 public key in bytes
pub const PUBLIC_KEY_LEN: usize = 65;

/// Generate a fresh random ES256 key pair
///
/// Returns `(private_scalar, public_key)` with the public key in
/// uncompressed SEC1 format.
pub fn generate_keypair() -> ([u8; SCALAR_LEN], Vec<u8>) {
    let signing_key = SigningKey::random(&mut OsRng);
    let public = signing_key
        .verifying_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();
    (signing_key.to_bytes().into(), public)
}

/// Derive the uncompressed SEC1 public key from a private scalar
pub fn public_from_private(private_key: &[u8; SCALAR_LEN]) -> Result<Vec<u8>> {
    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(signing_key
        .verifying_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec())
}

/// Sign data with ES256 and return a DER-encoded signature
///
/// The input is hashed with SHA-256 by the signing operation, so callers
/// may pass either raw message bytes or an externally produced digest that
/// both sides agree to treat as the message.
pub fn sign_der(private_key: &[u8; SCALAR_LEN], data: &[u8]) -> Result<Vec<u8>> {
    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let signature: Signature = signing_key.sign(data);
    Ok(signature.to_der().to_bytes().to_vec())
}

/// Sign data with ES256 and return the raw 64-byte signature (r || s)
pub fn sign_raw(private_key: &[u8; SCALAR_LEN], data: &[u8]) -> Result<[u8; 64]> {
    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let signature: Signature = signing_key.sign(data);
    Ok(signature.to_bytes().into())
}

/// Verify a DER-encoded ES256 signature
pub fn verify_der(public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = Signature::from_der(signature).map_err(|_| CryptoError::InvalidSignature)?;
    verifying_key
        .verify(data, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Verify a raw 64-byte ES256 signature (r || s)
pub fn verify_raw(public_key: &[u8], data: &[u8], signature: &[u8; 64]) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig =
        Signature::from_bytes(signature.into()).map_err(|_| CryptoError::InvalidSignature)?;
    verifying_key
        .verify(data, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

//! Keyed one-way derivation of device-bound secrets
//!
//! Every secret the authenticator derives (credential private keys, the
//! key-handle MAC key, credential-bound hmac-secret keys) is an HMAC-SHA-256
//! of the device master secret with an ASCII domain-separation label. The
//! derivation is deterministic: the same (secret, label, context) always
//! yields the same output, which is what makes key handles stateless.

use crate::error::{CryptoError, Result};

use hmac::{Hmac, Mac};
use p256::ecdsa::SigningKey;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA-256 over `data` with `key`
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Labelled one-way derivation: HMAC-SHA-256(secret, label || 0x00 || context)
///
/// The zero byte separates the label from the context so that no two
/// (label, context) pairs can collide on the same input stream.
pub fn derive(secret: &[u8], label: &str, context: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(label.as_bytes());
    mac.update(&[0x00]);
    mac.update(context);
    mac.finalize().into_bytes().into()
}

/// Deterministically derive a valid P-256 signing scalar
///
/// Appends a retry counter byte to the context and re-derives until the
/// candidate is a non-zero scalar in the curve order. For P-256 the first
/// candidate is valid except with negligible probability, but the loop keeps
/// the derivation total and still deterministic for a fixed context.
pub fn derive_p256_scalar(secret: &[u8], label: &str, context: &[u8]) -> Result<[u8; 32]> {
    let mut input = Vec::with_capacity(context.len() + 1);
    input.extend_from_slice(context);
    input.push(0);

    for counter in 0u8..=255 {
        *input.last_mut().expect("input is never empty") = counter;
        let candidate = derive(secret, label, &input);
        if SigningKey::from_bytes((&candidate).into()).is_ok() {
            return Ok(candidate);
        }
    }
    Err(CryptoError::DerivationFailed)
}

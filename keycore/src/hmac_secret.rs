//! hmac-secret extension output
//!
//! Derives the credential-bound secret for the CTAP2 `hmac-secret`
//! extension. The per-credential key is a one-way function of the device
//! master secret and the credential nonce, so it needs no storage and
//! survives only as long as the key handle does.
//!
//! Salt transport (ECDH key agreement, decryption, saltAuth) is the command
//! layer's job; this module sees plaintext salts.

use crate::device_key::DeviceKeyStore;
use crate::error::{Error, Result};

use keycore_crypto::kdf;

/// Domain-separation label for the credential-bound hmac-secret key
const LABEL_HMAC_SECRET: &str = "hmac-secret";

/// One salt block; callers pass one or two
pub const SALT_LEN: usize = 32;

/// Compute the hmac-secret output for a credential nonce and salt
///
/// `salt` must be exactly one or two 32-byte blocks; each block yields
/// `HMAC-SHA-256(cred_key, block)` and the outputs are concatenated. The
/// result is deterministic per (nonce, salt) pair.
pub fn make_hmac_secret_output(
    device: &DeviceKeyStore,
    nonce: &[u8; 32],
    salt: &[u8],
) -> Result<Vec<u8>> {
    if salt.len() != SALT_LEN && salt.len() != 2 * SALT_LEN {
        return Err(Error::InvalidSaltLength);
    }

    let cred_key = device.derive_secret(LABEL_HMAC_SECRET, nonce);
    let mut output = Vec::with_capacity(salt.len());
    for block in salt.chunks_exact(SALT_LEN) {
        output.extend_from_slice(&kdf::hmac_sha256(cred_key.as_ref(), block));
    }
    Ok(output)
}

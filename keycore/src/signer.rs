//! Attestation and assertion signing
//!
//! Two signing paths: the attestation key vouches for credential generation
//! at registration, and re-derived credential keys sign assertions. The
//! requested algorithm must match the key exactly; a mismatch never falls
//! back to the key's own algorithm.

use crate::credential::{AlgorithmType, PrivateKey};
use crate::device_key::DeviceKeyStore;
use crate::error::{Error, Result};

use keycore_crypto::ecdsa;

/// Sign with the attestation key (registration responses)
///
/// Returns a DER-encoded ES256 signature.
pub fn sign_with_device_key(device: &DeviceKeyStore, input: &[u8]) -> Result<Vec<u8>> {
    let scalar = device.attestation_scalar()?;
    ecdsa::sign_der(&scalar, input).map_err(|_| Error::StorageFailure)
}

/// Sign with a re-derived credential key (assertion responses)
///
/// Fails with [`Error::AlgorithmMismatch`] when the requested algorithm and
/// the key's algorithm differ; the signature format is determined by the
/// algorithm, never inferred from the key.
pub fn sign_with_private_key(
    alg: AlgorithmType,
    key: &PrivateKey,
    input: &[u8],
) -> Result<Vec<u8>> {
    if key.algorithm() != alg {
        return Err(Error::AlgorithmMismatch);
    }

    match alg {
        AlgorithmType::Es256 => {
            let scalar = key
                .secret()
                .to_array::<{ ecdsa::SCALAR_LEN }>()
                .ok_or(Error::InvalidCredential)?;
            ecdsa::sign_der(&scalar, input).map_err(|_| Error::InvalidCredential)
        }
        AlgorithmType::EdDsa => Err(Error::UnsupportedAlgorithm),
    }
}

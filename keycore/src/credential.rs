//! Credential identifiers ("key handles")
//!
//! A key handle is an opaque, self-verifying blob the relying party stores
//! and presents back at authentication time:
//!
//! ```text
//! alg(1) || nonce(32) || mac(32)        65 bytes
//! mac = HMAC-SHA-256(mac_key, alg || nonce)
//! ```
//!
//! The MAC binds the handle to the device master key; verification
//! recomputes it in constant time and re-derives the private key from the
//! nonce. A handle that fails any check is reported as
//! [`Error::InvalidCredential`] with no further detail — forged, corrupted
//! and foreign handles are indistinguishable from absent ones.

use crate::device_key::DeviceKeyStore;
use crate::error::{Error, Result};
use crate::sec_bytes::SecBytes;

use keycore_crypto::{ecdsa, kdf};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// Length of the per-credential nonce in bytes
pub const NONCE_LEN: usize = 32;

/// Length of the key-handle MAC in bytes
pub const MAC_LEN: usize = 32;

/// Serialized key-handle length in bytes
pub const CREDENTIAL_ID_LEN: usize = 1 + NONCE_LEN + MAC_LEN;

/// Credential signature algorithms, tagged into the key handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmType {
    /// ECDSA over P-256 with SHA-256 (COSE -7)
    Es256,
    /// EdDSA over Ed25519 (COSE -8); recognized but not backed by this build
    EdDsa,
}

impl AlgorithmType {
    /// Map from a COSE algorithm identifier
    pub fn from_cose(alg: i32) -> Option<Self> {
        match alg {
            -7 => Some(Self::Es256),
            -8 => Some(Self::EdDsa),
            _ => None,
        }
    }

    /// COSE algorithm identifier
    pub fn to_cose(self) -> i32 {
        match self {
            Self::Es256 => -7,
            Self::EdDsa => -8,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Es256 => 0x01,
            Self::EdDsa => 0x02,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Es256),
            0x02 => Some(Self::EdDsa),
            _ => None,
        }
    }
}

/// A re-derived credential private key
///
/// Only ever constructed by the device key store; the scalar lives in
/// protected memory and is consumed by the signer.
#[derive(Debug)]
pub struct PrivateKey {
    alg: AlgorithmType,
    secret: SecBytes,
}

impl PrivateKey {
    pub(crate) fn new(alg: AlgorithmType, secret: SecBytes) -> Self {
        Self { alg, secret }
    }

    /// Algorithm this key was derived for
    pub fn algorithm(&self) -> AlgorithmType {
        self.alg
    }

    /// Public counterpart, uncompressed SEC1
    pub fn public_key(&self) -> Result<Vec<u8>> {
        match self.alg {
            AlgorithmType::Es256 => {
                let scalar = self
                    .secret
                    .to_array::<{ ecdsa::SCALAR_LEN }>()
                    .ok_or(Error::InvalidCredential)?;
                ecdsa::public_from_private(&scalar).map_err(|_| Error::InvalidCredential)
            }
            AlgorithmType::EdDsa => Err(Error::UnsupportedAlgorithm),
        }
    }

    pub(crate) fn secret(&self) -> &SecBytes {
        &self.secret
    }
}

/// Opaque credential identifier round-tripped through the relying party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialId {
    alg: AlgorithmType,
    nonce: [u8; NONCE_LEN],
    mac: [u8; MAC_LEN],
}

impl CredentialId {
    /// Algorithm tag carried by the handle
    pub fn algorithm(&self) -> AlgorithmType {
        self.alg
    }

    /// Per-credential nonce (also the hmac-secret context)
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> [u8; CREDENTIAL_ID_LEN] {
        let mut out = [0u8; CREDENTIAL_ID_LEN];
        out[0] = self.alg.tag();
        out[1..1 + NONCE_LEN].copy_from_slice(&self.nonce);
        out[1 + NONCE_LEN..].copy_from_slice(&self.mac);
        out
    }

    /// Parse from the wire layout
    ///
    /// Malformed input fails with [`Error::InvalidCredential`], the same
    /// kind a MAC mismatch produces.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != CREDENTIAL_ID_LEN {
            return Err(Error::InvalidCredential);
        }
        let alg = AlgorithmType::from_tag(bytes[0]).ok_or(Error::InvalidCredential)?;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[1..1 + NONCE_LEN]);
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&bytes[1 + NONCE_LEN..]);

        Ok(Self { alg, nonce, mac })
    }
}

/// Generate a fresh key handle and its public key
///
/// Picks a random nonce, derives the credential key pair through the device
/// key store, and binds {alg, nonce} to the device with a MAC. Fails with
/// [`Error::UnsupportedAlgorithm`] for algorithms this build cannot sign
/// with.
pub fn generate_key_handle(
    device: &DeviceKeyStore,
    alg: AlgorithmType,
) -> Result<(CredentialId, Vec<u8>)> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = device.derive_credential_key(alg, &nonce)?;
    let public = key.public_key()?;
    let mac = compute_mac(device, alg, &nonce);

    Ok((CredentialId { alg, nonce, mac }, public))
}

/// Verify a key handle and re-derive its private key
///
/// Recomputes the MAC under the current device master key and compares in
/// constant time. On success the private key is reconstructed from the
/// nonce; nothing is looked up, so storage is O(1) in issued credentials.
pub fn verify_key_handle(device: &DeviceKeyStore, id: &CredentialId) -> Result<PrivateKey> {
    let expected = compute_mac(device, id.alg, &id.nonce);
    if !bool::from(expected.ct_eq(&id.mac)) {
        return Err(Error::InvalidCredential);
    }
    device
        .derive_credential_key(id.alg, &id.nonce)
        .map_err(|_| Error::InvalidCredential)
}

fn compute_mac(device: &DeviceKeyStore, alg: AlgorithmType, nonce: &[u8; NONCE_LEN]) -> [u8; MAC_LEN] {
    let mac_key = device.mac_key();
    let mut input = [0u8; 1 + NONCE_LEN];
    input[0] = alg.tag();
    input[1..].copy_from_slice(nonce);
    kdf::hmac_sha256(mac_key.as_ref(), &input)
}

//! Device key store
//!
//! Owns the 32-byte device master secret and the attestation key. Every
//! credential private key is a one-way function of the master secret and the
//! credential nonce, so the same nonce always re-derives the same key and no
//! issued credential needs local storage.
//!
//! Raw master-secret bytes never leave this module; other components get
//! only derived material.

use crate::credential::{AlgorithmType, PrivateKey};
use crate::error::{Error, Result};
use crate::sec_bytes::SecBytes;
use crate::store::{KvStore, keys};

use keycore_crypto::{ecdsa, kdf};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Domain-separation label for credential private keys
const LABEL_CREDENTIAL_KEY: &str = "credential-key";

/// Domain-separation label for the key-handle MAC key
const LABEL_CREDENTIAL_MAC: &str = "credential-mac";

/// Device master key store
#[derive(Debug)]
pub struct DeviceKeyStore {
    /// 32-byte master secret, generated at provisioning
    master: SecBytes,

    /// Attestation private scalar (factory-provisioned, ES256)
    attestation: SecBytes,
}

impl DeviceKeyStore {
    /// Open the device keys, provisioning fresh ones on first boot
    ///
    /// A missing master secret or attestation key is generated and persisted
    /// before use; a present record with the wrong shape is treated as
    /// storage corruption.
    pub fn open<S: KvStore>(store: &mut S) -> Result<Self> {
        let master = match store.get(keys::DEVICE_SECRET)? {
            Some(bytes) if bytes.len() == 32 => SecBytes::new(bytes),
            Some(_) => return Err(Error::StorageFailure),
            None => {
                let mut secret = Zeroizing::new([0u8; 32]);
                OsRng.fill_bytes(secret.as_mut());
                store.put(keys::DEVICE_SECRET, secret.as_ref())?;
                log::info!("provisioned device master secret");
                SecBytes::from_slice(secret.as_ref())
            }
        };

        let attestation = match store.get(keys::ATTESTATION_KEY)? {
            Some(bytes) if bytes.len() == ecdsa::SCALAR_LEN => SecBytes::new(bytes),
            Some(_) => return Err(Error::StorageFailure),
            None => {
                let (private, _) = ecdsa::generate_keypair();
                store.put(keys::ATTESTATION_KEY, &private)?;
                log::info!("generated placeholder attestation key");
                SecBytes::from_slice(&private)
            }
        };

        Ok(Self {
            master,
            attestation,
        })
    }

    /// Install the factory attestation key, replacing the current one
    pub fn install_attestation_key<S: KvStore>(
        &mut self,
        store: &mut S,
        private: &[u8; ecdsa::SCALAR_LEN],
    ) -> Result<()> {
        ecdsa::public_from_private(private).map_err(|_| Error::InvalidLength)?;
        store.put(keys::ATTESTATION_KEY, private)?;
        self.attestation = SecBytes::from_slice(private);
        Ok(())
    }

    /// Deterministically derive the private key for a credential nonce
    pub fn derive_credential_key(
        &self,
        alg: AlgorithmType,
        nonce: &[u8; 32],
    ) -> Result<PrivateKey> {
        match alg {
            AlgorithmType::Es256 => {
                let scalar =
                    kdf::derive_p256_scalar(self.master.as_slice(), LABEL_CREDENTIAL_KEY, nonce)
                        .map_err(|_| Error::InvalidCredential)?;
                Ok(PrivateKey::new(alg, SecBytes::from_slice(&scalar)))
            }
            AlgorithmType::EdDsa => Err(Error::UnsupportedAlgorithm),
        }
    }

    /// Device public key for registration responses, uncompressed SEC1
    ///
    /// The public half of the attestation key.
    pub fn device_public_key(&self) -> Result<Vec<u8>> {
        let scalar = self.attestation_scalar()?;
        ecdsa::public_from_private(&scalar).map_err(|_| Error::StorageFailure)
    }

    /// MAC key binding key handles to this device
    pub(crate) fn mac_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(kdf::derive(
            self.master.as_slice(),
            LABEL_CREDENTIAL_MAC,
            &[],
        ))
    }

    /// Derive a labelled credential-bound secret (e.g. for hmac-secret)
    pub(crate) fn derive_secret(&self, label: &str, context: &[u8]) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(kdf::derive(self.master.as_slice(), label, context))
    }

    /// Attestation private scalar for the signer
    pub(crate) fn attestation_scalar(&self) -> Result<Zeroizing<[u8; ecdsa::SCALAR_LEN]>> {
        self.attestation.to_array().ok_or(Error::StorageFailure)
    }
}

//! Single-instance security context
//!
//! [`SecurityCore`] owns the persistent store and the device key material
//! and exposes every operation the CTAP command layer calls into. The
//! firmware runs one foreground event loop, so there is exactly one
//! instance and no operation is ever reentered; all persistence ordering
//! guarantees follow from the individual components.

use crate::counter;
use crate::credential::{self, AlgorithmType, CredentialId, PrivateKey};
use crate::device_key::DeviceKeyStore;
use crate::error::Result;
use crate::hmac_secret;
use crate::pin::{self, PinState};
use crate::signer;
use crate::store::{KvStore, keys};

/// The authenticator security core
///
/// Created once at startup from the platform's persistent store;
/// provisioning happens transparently on first boot.
pub struct SecurityCore<S: KvStore> {
    store: S,
    device: DeviceKeyStore,
}

impl<S: KvStore> SecurityCore<S> {
    /// Open the core over a persistent store
    pub fn open(mut store: S) -> Result<Self> {
        let device = DeviceKeyStore::open(&mut store)?;
        Ok(Self { store, device })
    }

    /// The device key store (public key retrieval for responses)
    pub fn device(&self) -> &DeviceKeyStore {
        &self.device
    }

    // --- Credential engine ---

    /// Generate a fresh key handle and its public key
    pub fn generate_key_handle(&self, alg: AlgorithmType) -> Result<(CredentialId, Vec<u8>)> {
        credential::generate_key_handle(&self.device, alg)
    }

    /// Verify a key handle and re-derive its private key
    pub fn verify_key_handle(&self, id: &CredentialId) -> Result<PrivateKey> {
        credential::verify_key_handle(&self.device, id)
    }

    // --- Signer ---

    /// Sign with the attestation key (registration)
    pub fn sign_with_device_key(&self, input: &[u8]) -> Result<Vec<u8>> {
        signer::sign_with_device_key(&self.device, input)
    }

    /// Sign with a re-derived credential key (assertion)
    pub fn sign_with_private_key(
        &self,
        alg: AlgorithmType,
        key: &PrivateKey,
        input: &[u8],
    ) -> Result<Vec<u8>> {
        signer::sign_with_private_key(alg, key, input)
    }

    // --- PIN state ---

    /// Whether a PIN has been set
    pub fn has_pin(&self) -> Result<bool> {
        pin::has_pin(&self.store)
    }

    /// Current PIN lifecycle state
    pub fn pin_state(&self) -> Result<PinState> {
        pin::state(&self.store)
    }

    /// Set or change the PIN
    pub fn set_pin(&mut self, pin: &[u8]) -> Result<()> {
        pin::set_pin(&mut self.store, pin)
    }

    /// Verify a candidate PIN hash
    pub fn verify_pin_hash(&mut self, candidate: &[u8]) -> Result<()> {
        pin::verify_pin_hash(&mut self.store, candidate)
    }

    /// Remaining PIN retries
    pub fn get_pin_retries(&self) -> Result<u8> {
        pin::get_pin_retries(&self.store)
    }

    /// Restore the PIN retry counter
    pub fn set_pin_retries(&mut self, retries: u8) -> Result<()> {
        pin::set_pin_retries(&mut self.store, retries)
    }

    // --- hmac-secret ---

    /// Compute the hmac-secret output for a credential nonce and salt
    pub fn make_hmac_secret_output(&self, nonce: &[u8; 32], salt: &[u8]) -> Result<Vec<u8>> {
        hmac_secret::make_hmac_secret_output(&self.device, nonce, salt)
    }

    // --- Signature counter ---

    /// Increment, persist and return the signature counter
    ///
    /// Call exactly once per successful assertion; the returned value is the
    /// one to embed in the signed authenticator data.
    pub fn increase_counter(&mut self) -> Result<u32> {
        counter::increase_counter(&mut self.store)
    }

    // --- Provisioning and recovery ---

    /// Install the factory attestation key
    pub fn install_attestation_key(&mut self, private: &[u8; 32]) -> Result<()> {
        self.device
            .install_attestation_key(&mut self.store, private)
    }

    /// Install the attestation certificate (DER)
    pub fn install_attestation_cert(&mut self, cert: &[u8]) -> Result<()> {
        self.store.put(keys::ATTESTATION_CERT, cert)
    }

    /// The attestation certificate, if provisioned
    pub fn attestation_cert(&self) -> Result<Option<Vec<u8>>> {
        self.store.get(keys::ATTESTATION_CERT)
    }

    /// Device public key (attestation), uncompressed SEC1
    pub fn device_public_key(&self) -> Result<Vec<u8>> {
        self.device.device_public_key()
    }

    /// Factory reset: wipe all device state and re-provision
    ///
    /// Invalidates every issued key handle, clears PIN state (including a
    /// blocked device) and zeroes the signature counter.
    pub fn factory_reset(&mut self) -> Result<()> {
        for key in [
            keys::DEVICE_SECRET,
            keys::ATTESTATION_KEY,
            keys::ATTESTATION_CERT,
            keys::PIN_RECORD,
            keys::PIN_RETRIES,
            keys::SIGN_COUNTER,
        ] {
            self.store.remove(key)?;
        }
        self.device = DeviceKeyStore::open(&mut self.store)?;
        log::info!("factory reset complete");
        Ok(())
    }
}

//! End-to-end exercise of the security core over one store
//!
//! Drives the registration and assertion paths the CTAP command layer
//! would: issue a key handle, round-trip it through its wire form, verify
//! it, sign, and check the persistence-visible state along the way.

use keycore::credential::CredentialId;
use keycore::pin::{self, pin_hash};
use keycore::{AlgorithmType, Error, MemStore, SecurityCore};

use keycore_crypto::ecdsa;

#[test]
fn register_then_assert() {
    let mut store = MemStore::new();
    let mut core = SecurityCore::open(&mut store).unwrap();

    // Registration: fresh handle, attestation signature over response data
    let (id, public) = core.generate_key_handle(AlgorithmType::Es256).unwrap();
    let response_data = [0xa5u8; 64];
    let attestation_sig = core.sign_with_device_key(&response_data).unwrap();
    assert!(
        ecdsa::verify_der(
            &core.device_public_key().unwrap(),
            &response_data,
            &attestation_sig
        )
        .is_ok()
    );

    // The relying party stores only the opaque handle bytes
    let wire = id.to_bytes();

    // Assertion: parse the handle back, verify, sign a 32-byte digest
    let parsed = CredentialId::from_bytes(&wire).unwrap();
    let key = core.verify_key_handle(&parsed).unwrap();
    assert_eq!(key.public_key().unwrap(), public);

    let counter = core.increase_counter().unwrap();
    assert_eq!(counter, 1);

    let digest = [0x3cu8; 32];
    let signature = core
        .sign_with_private_key(AlgorithmType::Es256, &key, &digest)
        .unwrap();
    assert!(ecdsa::verify_der(&public, &digest, &signature).is_ok());

    // Each assertion bumps the counter with no repeats
    assert_eq!(core.increase_counter().unwrap(), 2);
    assert_eq!(core.increase_counter().unwrap(), 3);
}

#[test]
fn hmac_secret_tracks_the_credential() {
    let mut store = MemStore::new();
    let core = SecurityCore::open(&mut store).unwrap();

    let (id, _) = core.generate_key_handle(AlgorithmType::Es256).unwrap();
    let (other, _) = core.generate_key_handle(AlgorithmType::Es256).unwrap();
    let salt = [0x77u8; 32];

    let output = core.make_hmac_secret_output(id.nonce(), &salt).unwrap();
    let again = core.make_hmac_secret_output(id.nonce(), &salt).unwrap();
    assert_eq!(output, again);

    // A different credential yields an unrelated secret for the same salt
    let foreign = core.make_hmac_secret_output(other.nonce(), &salt).unwrap();
    assert_ne!(output, foreign);

    assert_eq!(
        core.make_hmac_secret_output(id.nonce(), &[0u8; 48])
            .unwrap_err(),
        Error::InvalidSaltLength
    );
}

#[test]
fn pin_retry_state_survives_reboot() {
    let mut store = MemStore::new();

    {
        let mut core = SecurityCore::open(&mut store).unwrap();
        core.set_pin(b"123456").unwrap();
        assert_eq!(
            core.verify_pin_hash(&pin_hash(b"999999")).unwrap_err(),
            Error::PinInvalid
        );
        // Core dropped here: simulates power loss after the failed attempt
    }

    let mut core = SecurityCore::open(&mut store).unwrap();
    assert_eq!(core.get_pin_retries().unwrap(), pin::MAX_RETRIES - 1);

    // The correct PIN still works and restores the budget
    assert!(core.verify_pin_hash(&pin_hash(b"123456")).is_ok());
    assert_eq!(core.get_pin_retries().unwrap(), pin::MAX_RETRIES);
}

#[test]
fn blocked_device_rejects_everything_until_reset() {
    let mut store = MemStore::new();
    let mut core = SecurityCore::open(&mut store).unwrap();
    core.set_pin(b"123456").unwrap();

    for _ in 0..pin::MAX_RETRIES {
        let _ = core.verify_pin_hash(&pin_hash(b"000000"));
    }

    assert_eq!(
        core.verify_pin_hash(&pin_hash(b"123456")).unwrap_err(),
        Error::PinBlocked
    );
    assert_eq!(core.set_pin(b"654321").unwrap_err(), Error::PinBlocked);

    core.factory_reset().unwrap();
    assert!(!core.has_pin().unwrap());
    assert!(core.set_pin(b"654321").is_ok());
}

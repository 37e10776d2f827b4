//! FIDO2 authenticator security core
//!
//! This crate implements the key-handle security core of a CTAP2
//! authenticator:
//!
//! - **Device key store**: the device master secret every credential key is
//!   derived from, plus the factory attestation key
//! - **Credential engine**: stateless, self-verifying key handles
//! - **Signer**: attestation and assertion signatures
//! - **PIN state**: salted PIN hash with a bounded, persisted retry counter
//! - **hmac-secret**: credential-bound secret derivation
//! - **Signature counter**: the monotonic per-assertion counter
//!
//! The CTAP CBOR command layer and the USB transport live outside this
//! crate; they call in through [`SecurityCore`], the single-instance context
//! object that owns the persistent store and the device keys.
//!
//! No credential private keys are ever stored: a key handle carries the
//! nonce its key is re-derived from, bound to the device master key by a
//! MAC. Verifying a handle recomputes the MAC and re-derives the key, so
//! storage stays O(1) in the number of issued credentials.

pub mod authenticator;
pub mod counter;
pub mod credential;
pub mod device_key;
pub mod error;
pub mod hmac_secret;
pub mod pin;
pub mod sec_bytes;
pub mod signer;
pub mod store;

// Re-export commonly used types
pub use authenticator::SecurityCore;
pub use credential::{AlgorithmType, CredentialId, PrivateKey};
pub use device_key::DeviceKeyStore;
pub use error::{Error, Result};
pub use pin::PinState;
pub use sec_bytes::SecBytes;
pub use store::{KvStore, MemStore};

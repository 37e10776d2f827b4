//! Cryptographic primitives for the keycore authenticator
//!
//! This crate wraps the low-level operations the security core relies on:
//!
//! - **ECDSA**: ES256 signatures for attestation and assertions
//! - **KDF**: keyed one-way derivation of device-bound secrets
//!
//! The underlying curve and hash implementations come from the RustCrypto
//! `p256`, `sha2` and `hmac` crates; this crate only fixes the formats and
//! derivation conventions used by the authenticator.

pub mod ecdsa;
pub mod error;
pub mod kdf;

// Re-export commonly used items
pub use error::{CryptoError, Result};
pub use kdf::hmac_sha256;

//! Error types for cryptographic operations

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid private key provided
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid public key provided
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid signature format
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key derivation produced no usable key
    #[error("Key derivation failed")]
    DerivationFailed,
}

/// Result type alias for cryptographic operations
pub type Result<T> = core::result::Result<T, CryptoError>;

//! Security core error taxonomy
//!
//! Every operation surfaces one of these kinds to the CTAP command layer,
//! which maps them to wire status codes. Security-relevant failures carry no
//! detail: a key handle that fails its MAC check is indistinguishable from a
//! malformed one, and a wrong PIN reveals nothing beyond the retry count the
//! host can query anyway.

use thiserror::Error;

/// Security core errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Key handle failed verification or was malformed
    ///
    /// Deliberately a single kind: callers must treat this identically to
    /// "no such credential".
    #[error("invalid credential")]
    InvalidCredential,

    /// Requested algorithm is not supported by this device
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// Key and requested signature algorithm do not match
    #[error("algorithm mismatch")]
    AlgorithmMismatch,

    /// Caller input outside the accepted length bounds
    #[error("invalid length")]
    InvalidLength,

    /// hmac-secret salt is not one or two 32-byte blocks
    #[error("invalid salt length")]
    InvalidSaltLength,

    /// PIN verification failed; retries remain
    #[error("PIN invalid")]
    PinInvalid,

    /// PIN retry counter exhausted; terminal until factory reset
    #[error("PIN blocked")]
    PinBlocked,

    /// Signature counter reached its maximum; counter reuse is not allowed
    #[error("signature counter exhausted")]
    CounterExhausted,

    /// Persistence I/O failed; the operation in progress must be aborted
    #[error("storage failure")]
    StorageFailure,
}

/// Result type alias for security core operations
pub type Result<T> = std::result::Result<T, Error>;

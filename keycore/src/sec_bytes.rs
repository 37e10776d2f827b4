//! Secret byte container
//!
//! Wraps sensitive material (the device master secret, derived private
//! scalars) in storage that is mlocked while alive and zeroed on drop.
//! Equality is constant-time and `Debug` output is redacted.

use secstr::SecVec;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Secret bytes with locked, self-wiping storage
#[derive(Clone)]
pub struct SecBytes {
    inner: SecVec<u8>,
}

impl SecBytes {
    /// Move a byte vector into protected storage
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: SecVec::from(data),
        }
    }

    /// Copy a slice into protected storage
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }

    /// Access the raw bytes
    ///
    /// The returned slice points into protected memory but is an ordinary
    /// reference; keep the scope it is held in as small as possible.
    pub fn as_slice(&self) -> &[u8] {
        self.inner.unsecure()
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.inner.unsecure().len()
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy into a fixed-size array that zeroes itself on drop
    ///
    /// Returns `None` if the length does not match.
    pub fn to_array<const N: usize>(&self) -> Option<Zeroizing<[u8; N]>> {
        if self.len() != N {
            return None;
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.as_slice());
        Some(Zeroizing::new(arr))
    }
}

impl core::fmt::Debug for SecBytes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecBytes")
            .field("len", &self.len())
            .field("data", &"<redacted>")
            .finish()
    }
}

// Constant-time equality; SecBytes holds comparison targets like MAC keys
impl PartialEq for SecBytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice().ct_eq(other.as_slice()).into()
    }
}

impl Eq for SecBytes {}

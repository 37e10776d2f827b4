//! Persistent key-value boundary
//!
//! The core persists a handful of fixed records: the device master secret,
//! the attestation key and certificate, the PIN record and retry counter,
//! and the signature counter. Flash layout, page management and
//! wear-leveling live behind this trait in the platform layer.
//!
//! A `put` must be durable before it returns: the PIN retry counter and the
//! signature counter rely on persist-then-respond ordering for their
//! crash-consistency guarantees.

use crate::error::Result;

use std::collections::HashMap;

/// Well-known record names
pub mod keys {
    /// 32-byte device master secret
    pub const DEVICE_SECRET: &str = "device_secret";
    /// 32-byte attestation private scalar
    pub const ATTESTATION_KEY: &str = "attestation_key";
    /// DER attestation certificate
    pub const ATTESTATION_CERT: &str = "attestation_cert";
    /// Salted PIN verification record
    pub const PIN_RECORD: &str = "pin";
    /// Remaining PIN retries (single byte)
    pub const PIN_RETRIES: &str = "pin_retries";
    /// Big-endian u32 signature counter
    pub const SIGN_COUNTER: &str = "sign_counter";
}

/// Byte-oriented persistent key-value store
pub trait KvStore {
    /// Read a record, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Durably write a record, replacing any previous value
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a record; deleting an absent record is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

// Allow passing a store by mutable reference through the core
impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store for tests and soft deployments
#[derive(Debug, Default)]
pub struct MemStore {
    records: HashMap<String, Vec<u8>>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}

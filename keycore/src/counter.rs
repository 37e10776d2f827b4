//! Monotonic signature counter
//!
//! A single persisted big-endian `u32`, incremented exactly once per
//! successful assertion. The value returned is the value persisted, so the
//! signed assertion always embeds what the device will report next time.
//! Reaching `u32::MAX` is surfaced as [`Error::CounterExhausted`] rather
//! than wrapping; counter reuse would break the relying party's clone
//! detection.

use crate::error::{Error, Result};
use crate::store::{KvStore, keys};

/// Read the current counter value without incrementing
pub fn read_counter<S: KvStore>(store: &S) -> Result<u32> {
    match store.get(keys::SIGN_COUNTER)? {
        None => Ok(0),
        Some(bytes) if bytes.len() == 4 => {
            Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        Some(_) => Err(Error::StorageFailure),
    }
}

/// Increment, persist and return the new counter value
///
/// The new value is durable before it is returned; a crash between persist
/// and response costs one counter step, never a repeat.
pub fn increase_counter<S: KvStore>(store: &mut S) -> Result<u32> {
    let current = read_counter(store)?;
    let next = current.checked_add(1).ok_or(Error::CounterExhausted)?;
    store.put(keys::SIGN_COUNTER, &next.to_be_bytes())?;
    Ok(next)
}

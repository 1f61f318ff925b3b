//! Session handle type.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Global counter for handle generation.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a ranging session.
///
/// Handles are generated from an atomic counter, ensuring uniqueness within
/// a single process lifetime. A closed session's handle is never reused.
/// The handle is displayed as `rs-XXXXXXXX` where X is a hexadecimal digit,
/// and that string form is what external callers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// Create a new unique session handle.
    pub fn new() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Create a SessionHandle from a raw u64 value.
    ///
    /// This is primarily for testing and deserialization.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rs-{:08x}", self.0)
    }
}

impl FromStr for SessionHandle {
    type Err = crate::error::UwbBridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("rs-")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .map(SessionHandle)
            .ok_or_else(|| crate::error::UwbBridgeError::UnknownHandle(s.into()))
    }
}

impl Serialize for SessionHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

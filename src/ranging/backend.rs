//! Ranging backend abstraction layer.
//!
//! The platform ranging stack sits behind a small set of traits so the
//! registry and service never depend on a concrete implementation. Opening
//! a session is asynchronous: the call only enqueues the request, and the
//! outcome (including the native session reference itself) arrives later
//! through the callback contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::callback::{ParamsBundle, SessionCallback};
use super::report::PeerAddress;
use crate::error::Result;
use crate::session::SessionHandle;

/// Parameters for opening a ranging session.
///
/// Mirrors the JSON shape automation scripts send: every field is optional
/// and unknown fields are ignored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Device type (controller/controlee).
    pub device_type: Option<i32>,
    /// Device role (initiator/responder).
    pub device_role: Option<i32>,
    /// Protocol-level session id.
    pub session_id: Option<u32>,
    /// UWB channel number.
    pub channel: Option<u8>,
    /// Multi-node mode.
    pub multi_node_mode: Option<i32>,
    /// Local device address.
    pub device_address: Option<PeerAddress>,
    /// Remote device addresses to range against.
    pub destination_addresses: Vec<PeerAddress>,
    /// Vendor id bytes.
    pub vendor_id: Option<Vec<u8>>,
    /// Static STS initialization vector.
    pub static_sts_iv: Option<Vec<u8>>,
}

/// Receiver side of the callback contract.
///
/// Implemented by the session registry; backends hold it as a trait object
/// and deliver every asynchronous outcome through it.
pub trait SessionCallbacks: Send + Sync {
    /// Deliver a callback for the given session.
    fn on_callback(&self, handle: SessionHandle, callback: SessionCallback);
}

/// A live platform ranging session.
///
/// Commands are fire-and-forget: outcomes are delivered as callbacks, never
/// as return values.
pub trait NativeSession: Send + Sync {
    /// Begin ranging.
    fn start(&self, params: ParamsBundle);
    /// Stop ranging (the session stays open).
    fn stop(&self);
    /// Close the session permanently.
    fn close(&self);
}

/// The platform ranging capability.
pub trait RangingBackend: Send + Sync {
    /// Request a new ranging session.
    ///
    /// Completion or failure is delivered via `callbacks` (Opened or
    /// OpenFailed for `handle`). The returned guard cancels the pending
    /// open if fired before the session opens.
    fn open_session(
        &self,
        handle: SessionHandle,
        config: &SessionConfig,
        callbacks: Arc<dyn SessionCallbacks>,
    ) -> Result<CancelGuard>;
}

/// Cancellation token for a pending session open.
///
/// Firing the guard after the session has opened is a no-op; dropping it
/// without firing leaves the open request running.
pub struct CancelGuard(Option<Box<dyn FnOnce() + Send>>);

impl CancelGuard {
    /// Wrap a cancellation action.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(cancel)))
    }

    /// A guard with no cancellation action.
    pub fn noop() -> Self {
        Self(None)
    }

    /// Fire the cancellation action, if any.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.0.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for CancelGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("CancelGuard(armed)"),
            None => f.write_str("CancelGuard(noop)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_session_config_from_empty_json() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!(config.destination_addresses.is_empty());
    }

    #[test]
    fn test_session_config_from_json() {
        let json = r#"{
            "device_type": 1,
            "session_id": 42,
            "channel": 9,
            "device_address": [1, 2],
            "destination_addresses": [[3, 4], [5, 6]],
            "vendor_id": [7, 8],
            "static_sts_iv": [1, 2, 3, 4, 5, 6]
        }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.device_type, Some(1));
        assert_eq!(config.session_id, Some(42));
        assert_eq!(config.channel, Some(9));
        assert_eq!(
            config.device_address,
            Some(PeerAddress::from_bytes([1, 2]))
        );
        assert_eq!(config.destination_addresses.len(), 2);
        assert_eq!(config.vendor_id, Some(vec![7, 8]));
        assert_eq!(config.static_sts_iv.as_ref().map(Vec::len), Some(6));
    }

    #[test]
    fn test_cancel_guard_fires_once() {
        let fired = std::sync::Arc::new(AtomicBool::new(false));
        let fired2 = std::sync::Arc::clone(&fired);

        let guard = CancelGuard::new(move || fired2.store(true, Ordering::SeqCst));
        guard.cancel();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_guard_noop() {
        // Should not panic
        CancelGuard::noop().cancel();
    }

    #[test]
    fn test_cancel_guard_drop_without_firing() {
        let fired = std::sync::Arc::new(AtomicBool::new(false));
        let fired2 = std::sync::Arc::clone(&fired);

        let guard = CancelGuard::new(move || fired2.store(true, Ordering::SeqCst));
        drop(guard);
        assert!(!fired.load(Ordering::SeqCst));
    }
}

//! The ranging session registry.
//!
//! Owns every open ranging session, keyed by handle. Receives asynchronous
//! session callbacks, records them into per-session state, filters them
//! through the session's subscription mask, and republishes qualifying
//! events to the configured sink. Measurement queries run against the most
//! recently stored report.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use super::event::{EventKind, EventMask};
use super::handle::SessionHandle;
use super::record::SessionRecord;
use crate::error::{Result, UwbBridgeError};
use crate::events::{EventSink, SessionEvent};
use crate::ranging::{Measurement, PeerAddress, SessionCallback, SessionCallbacks};

/// Thread-safe registry of ranging sessions.
///
/// Locking is two-level: the entry map takes a brief registry-wide lock for
/// structural changes (create, close, lookup), while each record has its own
/// mutex so concurrent callbacks and queries for distinct sessions never
/// serialize against each other.
pub struct SessionRegistry {
    entries: RwLock<HashMap<SessionHandle, Arc<Mutex<SessionRecord>>>>,
    sink: Arc<dyn EventSink>,
}

impl SessionRegistry {
    /// Create an empty registry publishing to the given sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sink,
        }
    }

    /// Allocate a new session subscribed to every event kind.
    pub fn create(&self) -> SessionHandle {
        self.create_with_mask(EventMask::ALL)
    }

    /// Allocate a new session with the given initial subscription mask.
    ///
    /// Allocation cannot fail; a fresh handle is always returned.
    pub fn create_with_mask(&self, mask: EventMask) -> SessionHandle {
        let handle = SessionHandle::new();
        let record = Arc::new(Mutex::new(SessionRecord::new(mask)));

        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(handle, record);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(handle, record);
            }
        }

        tracing::debug!(%handle, "ranging session created");
        handle
    }

    /// Look up a session's record.
    fn entry(&self, handle: SessionHandle) -> Option<Arc<Mutex<SessionRecord>>> {
        self.entries.read().ok()?.get(&handle).cloned()
    }

    /// Check if a handle is registered.
    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(&handle))
            .unwrap_or(false)
    }

    /// Number of open sessions.
    pub fn count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// All registered handles.
    pub fn list_handles(&self) -> Vec<SessionHandle> {
        self.entries
            .read()
            .map(|e| e.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Start forwarding an event kind to the sink.
    ///
    /// Returns false if the handle is unknown or the name is not an exact
    /// (case-sensitive) event name; the mask is untouched on failure.
    pub fn subscribe(&self, handle: SessionHandle, event_name: &str) -> bool {
        self.adjust_mask(handle, event_name, true)
    }

    /// Stop forwarding an event kind to the sink.
    ///
    /// Same failure conditions as [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, handle: SessionHandle, event_name: &str) -> bool {
        self.adjust_mask(handle, event_name, false)
    }

    fn adjust_mask(&self, handle: SessionHandle, event_name: &str, set: bool) -> bool {
        let Some(kind) = EventKind::from_name(event_name) else {
            tracing::debug!(%handle, event_name, "unrecognized event name");
            return false;
        };
        let Some(entry) = self.entry(handle) else {
            return false;
        };
        let Ok(mut record) = entry.lock() else {
            return false;
        };
        if set {
            record.mask_mut().insert(kind);
        } else {
            record.mask_mut().remove(kind);
        }
        true
    }

    /// Run a closure against a session's record.
    pub fn with_record<R>(
        &self,
        handle: SessionHandle,
        f: impl FnOnce(&SessionRecord) -> R,
    ) -> Result<R> {
        let entry = self
            .entry(handle)
            .ok_or_else(|| UwbBridgeError::UnknownHandle(handle.to_string()))?;
        let record = entry.lock().map_err(|_| UwbBridgeError::LockPoisoned)?;
        Ok(f(&record))
    }

    /// Deliver a callback for a session.
    ///
    /// State is recorded unconditionally, then the event is republished to
    /// the sink iff its kind is currently subscribed. The ordering matters:
    /// a late subscriber can still query state recorded while its bit was
    /// unset. The sink is posted outside the record lock.
    pub fn on_callback(&self, handle: SessionHandle, callback: SessionCallback) {
        let kind = callback.kind();
        tracing::debug!(%handle, %kind, "session callback");

        let Some(entry) = self.entry(handle) else {
            // A close can race an in-flight callback; drop it.
            tracing::debug!(%handle, %kind, "callback for unregistered handle dropped");
            return;
        };

        let subscribed = match entry.lock() {
            Ok(mut record) => {
                record.apply(callback);
                record.mask().contains(kind)
            }
            Err(_) => {
                tracing::warn!(%handle, "session record lock poisoned");
                return;
            }
        };

        if subscribed {
            self.sink.post(SessionEvent {
                handle,
                event: kind,
            });
        }
    }

    /// Find the first successful measurement for a peer in the latest report.
    ///
    /// Scan order follows report delivery order. Returns None on unknown
    /// handle, no report yet, or no entry with success status and a matching
    /// address.
    pub fn find_measurement(
        &self,
        handle: SessionHandle,
        peer: &PeerAddress,
    ) -> Option<Measurement> {
        let entry = self.entry(handle)?;
        let record = entry.lock().ok()?;
        record
            .report()?
            .measurements
            .iter()
            .find(|m| m.status.is_success() && m.peer == *peer)
            .cloned()
    }

    /// Whether a successful measurement for the peer exists.
    pub fn is_peer_found(&self, handle: SessionHandle, peer: &PeerAddress) -> bool {
        self.find_measurement(handle, peer).is_some()
    }

    /// Distance to a peer in meters.
    pub fn distance(&self, handle: SessionHandle, peer: &PeerAddress) -> Result<f64> {
        self.measurement_or_err(handle, peer)?
            .distance_m
            .ok_or(UwbBridgeError::MeasurementUnavailable("no distance reading"))
    }

    /// Angle-of-arrival azimuth to a peer in radians.
    pub fn azimuth(&self, handle: SessionHandle, peer: &PeerAddress) -> Result<f64> {
        self.measurement_or_err(handle, peer)?
            .aoa_azimuth_rad
            .ok_or(UwbBridgeError::MeasurementUnavailable("no azimuth reading"))
    }

    /// Angle-of-arrival altitude to a peer in radians.
    pub fn altitude(&self, handle: SessionHandle, peer: &PeerAddress) -> Result<f64> {
        self.measurement_or_err(handle, peer)?
            .aoa_altitude_rad
            .ok_or(UwbBridgeError::MeasurementUnavailable("no altitude reading"))
    }

    fn measurement_or_err(
        &self,
        handle: SessionHandle,
        peer: &PeerAddress,
    ) -> Result<Measurement> {
        let entry = self
            .entry(handle)
            .ok_or_else(|| UwbBridgeError::UnknownHandle(handle.to_string()))?;
        let record = entry.lock().map_err(|_| UwbBridgeError::LockPoisoned)?;
        let report = record
            .report()
            .ok_or(UwbBridgeError::MeasurementUnavailable("no report received yet"))?;
        report
            .measurements
            .iter()
            .find(|m| m.status.is_success() && m.peer == *peer)
            .cloned()
            .ok_or(UwbBridgeError::MeasurementUnavailable(
                "peer not found in latest report",
            ))
    }

    /// Close a session.
    ///
    /// Issues a close request to the native session if one was opened, then
    /// removes the record unconditionally. Subsequent operations on the
    /// handle see "unknown handle"; the handle is never reused.
    pub fn close(&self, handle: SessionHandle) -> Result<()> {
        let entry = {
            let mut entries = self.entries.write().map_err(|_| UwbBridgeError::LockPoisoned)?;
            entries
                .remove(&handle)
                .ok_or_else(|| UwbBridgeError::UnknownHandle(handle.to_string()))?
        };

        let native = entry
            .lock()
            .map_err(|_| UwbBridgeError::LockPoisoned)?
            .native()
            .cloned();
        if let Some(native) = native {
            native.close();
        }

        tracing::debug!(%handle, "ranging session closed");
        Ok(())
    }
}

impl SessionCallbacks for SessionRegistry {
    fn on_callback(&self, handle: SessionHandle, callback: SessionCallback) {
        SessionRegistry::on_callback(self, handle, callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectSink;
    use crate::ranging::{
        NativeSession, ParamsBundle, RangingReport, REASON_LOCAL_REQUEST,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSession {
        closes: AtomicUsize,
    }

    impl CountingSession {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                closes: AtomicUsize::new(0),
            })
        }
    }

    impl NativeSession for CountingSession {
        fn start(&self, _params: ParamsBundle) {}
        fn stop(&self) {}
        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn registry_with_sink() -> (SessionRegistry, Arc<CollectSink>) {
        let sink = Arc::new(CollectSink::new());
        let registry = SessionRegistry::new(Arc::clone(&sink) as Arc<dyn EventSink>);
        (registry, sink)
    }

    fn report_for(peer: &PeerAddress, distance_m: f64) -> RangingReport {
        RangingReport::new(vec![Measurement::with_distance(peer.clone(), distance_m)])
    }

    #[test]
    fn test_create_registers_handle() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        assert!(registry.contains(handle));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_handles_are_fresh_even_when_empty() {
        let (registry, _) = registry_with_sink();
        let first = registry.create();
        registry.close(first).unwrap();
        assert_eq!(registry.count(), 0);

        let second = registry.create();
        assert_ne!(first, second);
    }

    #[test]
    fn test_subscribe_unknown_handle() {
        let (registry, _) = registry_with_sink();
        assert!(!registry.subscribe(SessionHandle::from_raw(999_999), "Opened"));
    }

    #[test]
    fn test_subscribe_invalid_name_leaves_mask_unchanged() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create_with_mask(EventMask::NONE);

        assert!(!registry.subscribe(handle, "opened"));
        assert!(!registry.subscribe(handle, "Invalid"));
        assert!(!registry.subscribe(handle, ""));

        let mask = registry.with_record(handle, |r| r.mask()).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn test_subscribe_then_unsubscribe() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create_with_mask(EventMask::NONE);

        assert!(registry.subscribe(handle, "ReportReceived"));
        let mask = registry.with_record(handle, |r| r.mask()).unwrap();
        assert!(mask.contains(EventKind::ReportReceived));

        assert!(registry.unsubscribe(handle, "ReportReceived"));
        let mask = registry.with_record(handle, |r| r.mask()).unwrap();
        assert!(!mask.contains(EventKind::ReportReceived));
    }

    #[test]
    fn test_callback_republished_when_subscribed() {
        let (registry, sink) = registry_with_sink();
        let handle = registry.create();

        registry.on_callback(handle, SessionCallback::Started(ParamsBundle::new()));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].handle, handle);
        assert_eq!(events[0].event, EventKind::Started);
    }

    #[test]
    fn test_callback_filtered_when_unsubscribed() {
        let (registry, sink) = registry_with_sink();
        let handle = registry.create();

        assert!(registry.unsubscribe(handle, "Started"));
        registry.on_callback(handle, SessionCallback::Started(ParamsBundle::new()));
        assert!(sink.is_empty());

        // State was still recorded
        let has_info = registry.with_record(handle, |r| r.session_info().is_some()).unwrap();
        assert!(has_info);
    }

    #[test]
    fn test_state_survives_missed_subscription() {
        let (registry, sink) = registry_with_sink();
        let handle = registry.create_with_mask(EventMask::NONE);
        let peer = PeerAddress::from_bytes([0x01, 0x02]);

        // Report delivered while nothing is subscribed: stored, not posted
        registry.on_callback(
            handle,
            SessionCallback::ReportReceived(report_for(&peer, 1.0)),
        );
        assert!(sink.is_empty());
        assert!(registry.is_peer_found(handle, &peer));

        // Subscribe, then a new report of the same kind is republished
        assert!(registry.subscribe(handle, "ReportReceived"));
        registry.on_callback(
            handle,
            SessionCallback::ReportReceived(report_for(&peer, 2.0)),
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].event, EventKind::ReportReceived);
    }

    #[test]
    fn test_callback_for_unknown_handle_is_dropped() {
        let (registry, sink) = registry_with_sink();
        registry.on_callback(
            SessionHandle::from_raw(999_999),
            SessionCallback::Started(ParamsBundle::new()),
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_find_measurement_skips_failed_entries() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let peer = PeerAddress::from_bytes([0x0a]);

        // A failed entry for the peer precedes a successful one
        registry.on_callback(
            handle,
            SessionCallback::ReportReceived(RangingReport::new(vec![
                Measurement::failed(peer.clone()),
                Measurement::with_distance(peer.clone(), 3.25),
            ])),
        );

        let m = registry.find_measurement(handle, &peer).unwrap();
        assert!(m.status.is_success());
        assert_eq!(m.distance_m, Some(3.25));
    }

    #[test]
    fn test_find_measurement_failed_only_peer_is_absent() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let peer_a = PeerAddress::from_bytes([0x0a]);
        let peer_b = PeerAddress::from_bytes([0x0b]);

        registry.on_callback(
            handle,
            SessionCallback::ReportReceived(RangingReport::new(vec![
                Measurement::with_distance(peer_a.clone(), 1.5),
                Measurement::failed(peer_b.clone()),
            ])),
        );

        assert!(registry.is_peer_found(handle, &peer_a));
        assert!(!registry.is_peer_found(handle, &peer_b));
        assert_eq!(registry.distance(handle, &peer_a).unwrap(), 1.5);
        assert!(matches!(
            registry.altitude(handle, &peer_a),
            Err(UwbBridgeError::MeasurementUnavailable(_))
        ));
        assert!(matches!(
            registry.distance(handle, &peer_b),
            Err(UwbBridgeError::MeasurementUnavailable(_))
        ));
    }

    #[test]
    fn test_zero_distance_is_a_valid_reading() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let peer = PeerAddress::from_bytes([0x01]);

        registry.on_callback(
            handle,
            SessionCallback::ReportReceived(report_for(&peer, 0.0)),
        );
        assert_eq!(registry.distance(handle, &peer).unwrap(), 0.0);
    }

    #[test]
    fn test_queries_before_any_report() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let peer = PeerAddress::from_bytes([0x01]);

        assert!(!registry.is_peer_found(handle, &peer));
        assert!(matches!(
            registry.distance(handle, &peer),
            Err(UwbBridgeError::MeasurementUnavailable(_))
        ));
    }

    #[test]
    fn test_close_calls_native_and_removes_entry() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let native = CountingSession::new();

        registry.on_callback(handle, SessionCallback::Opened(native.clone()));
        registry.close(handle).unwrap();

        assert_eq!(native.closes.load(Ordering::SeqCst), 1);
        assert!(!registry.contains(handle));
    }

    #[test]
    fn test_operations_after_close() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        let peer = PeerAddress::from_bytes([0x01]);
        registry.close(handle).unwrap();

        assert!(!registry.subscribe(handle, "Opened"));
        assert!(!registry.unsubscribe(handle, "Opened"));
        assert!(!registry.is_peer_found(handle, &peer));
        assert!(matches!(
            registry.distance(handle, &peer),
            Err(UwbBridgeError::UnknownHandle(_))
        ));
        assert!(matches!(
            registry.close(handle),
            Err(UwbBridgeError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_close_without_native_session() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();
        // Opened never arrived; close still removes the entry
        registry.close(handle).unwrap();
        assert!(!registry.contains(handle));
    }

    #[test]
    fn test_stopped_records_reason() {
        let (registry, _) = registry_with_sink();
        let handle = registry.create();

        registry.on_callback(
            handle,
            SessionCallback::Stopped(REASON_LOCAL_REQUEST, ParamsBundle::new()),
        );
        let reason = registry.with_record(handle, |r| r.last_reason()).unwrap();
        assert_eq!(reason, Some(REASON_LOCAL_REQUEST));
    }

    #[test]
    fn test_concurrent_callbacks_and_queries() {
        use std::thread;

        let sink = Arc::new(CollectSink::new());
        let registry = Arc::new(SessionRegistry::new(Arc::clone(&sink) as Arc<dyn EventSink>));

        let handles: Vec<_> = (0..8).map(|_| registry.create()).collect();
        let peer = PeerAddress::from_bytes([0x01]);

        let mut workers = vec![];
        for &handle in &handles {
            let registry = Arc::clone(&registry);
            let peer = peer.clone();
            workers.push(thread::spawn(move || {
                for i in 0..100 {
                    registry.on_callback(
                        handle,
                        SessionCallback::ReportReceived(RangingReport::new(vec![
                            Measurement::with_distance(peer.clone(), f64::from(i)),
                        ])),
                    );
                    let _ = registry.is_peer_found(handle, &peer);
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        // Every session saw 100 report callbacks, all subscribed
        assert_eq!(sink.len(), 800);
        for &handle in &handles {
            assert_eq!(registry.distance(handle, &peer).unwrap(), 99.0);
        }
    }
}

//! Simulated ranging backend.
//!
//! An in-process stand-in for the platform ranging stack, used by the binary
//! and by integration tests. It honors the real callback contract: opening
//! is asynchronous, commands are fire-and-forget, and every outcome is
//! delivered on the single callback worker in submission order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::json;

use super::backend::{
    CancelGuard, NativeSession, RangingBackend, SessionCallbacks, SessionConfig,
};
use super::callback::{
    ParamsBundle, SessionCallback, REASON_GENERIC_ERROR, REASON_LOCAL_REQUEST,
};
use super::executor::SerialExecutor;
use super::report::{Measurement, PeerAddress, RangingReport};
use crate::error::Result;
use crate::session::SessionHandle;

/// A peer the simulated backend can range against.
#[derive(Debug, Clone)]
pub struct SimPeer {
    /// The peer's device address.
    pub address: PeerAddress,
    /// Reported distance in meters.
    pub distance_m: f64,
    /// Reported azimuth in radians, if the peer provides angle data.
    pub aoa_azimuth_rad: Option<f64>,
    /// Reported altitude in radians, if the peer provides angle data.
    pub aoa_altitude_rad: Option<f64>,
    /// Unresponsive peers produce failed measurements.
    pub responsive: bool,
}

impl SimPeer {
    /// A responsive peer reporting only a distance.
    pub fn at_distance(address: PeerAddress, distance_m: f64) -> Self {
        Self {
            address,
            distance_m,
            aoa_azimuth_rad: None,
            aoa_altitude_rad: None,
            responsive: true,
        }
    }

    /// A peer that never answers ranging rounds.
    pub fn unresponsive(address: PeerAddress) -> Self {
        Self {
            address,
            distance_m: 0.0,
            aoa_azimuth_rad: None,
            aoa_altitude_rad: None,
            responsive: false,
        }
    }

    fn measure(&self) -> Measurement {
        if self.responsive {
            Measurement {
                peer: self.address.clone(),
                status: super::report::MeasurementStatus::Success,
                distance_m: Some(self.distance_m),
                aoa_azimuth_rad: self.aoa_azimuth_rad,
                aoa_altitude_rad: self.aoa_altitude_rad,
            }
        } else {
            Measurement::failed(self.address.clone())
        }
    }
}

/// Simulated platform ranging backend.
pub struct SimBackend {
    executor: Arc<SerialExecutor>,
    peers: Vec<SimPeer>,
    report_interval: Duration,
    fail_open: bool,
}

impl SimBackend {
    /// Create a backend with the given peer world and report interval.
    pub fn new(peers: Vec<SimPeer>, report_interval: Duration) -> Self {
        Self {
            executor: Arc::new(SerialExecutor::new()),
            peers,
            report_interval,
            fail_open: false,
        }
    }

    /// Make every subsequent open fail with OpenFailed.
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// The measurements one ranging round yields for a session.
    ///
    /// With destinations configured, measurements follow destination order;
    /// unknown destinations produce failed entries. Without destinations the
    /// session ranges against every known peer.
    fn round(&self, config: &SessionConfig) -> Vec<Measurement> {
        if config.destination_addresses.is_empty() {
            return self.peers.iter().map(SimPeer::measure).collect();
        }
        config
            .destination_addresses
            .iter()
            .map(|addr| {
                self.peers
                    .iter()
                    .find(|p| p.address == *addr)
                    .map(SimPeer::measure)
                    .unwrap_or_else(|| Measurement::failed(addr.clone()))
            })
            .collect()
    }
}

impl RangingBackend for SimBackend {
    fn open_session(
        &self,
        handle: SessionHandle,
        config: &SessionConfig,
        callbacks: Arc<dyn SessionCallbacks>,
    ) -> Result<CancelGuard> {
        if self.fail_open {
            let callbacks = Arc::clone(&callbacks);
            self.executor.execute(move || {
                callbacks.on_callback(
                    handle,
                    SessionCallback::OpenFailed(
                        super::callback::REASON_BAD_PARAMETERS,
                        ParamsBundle::from_pairs([("detail", json!("open rejected"))]),
                    ),
                );
            });
            return Ok(CancelGuard::noop());
        }

        let session = Arc::new(SimSession {
            handle,
            callbacks: Arc::clone(&callbacks),
            executor: Arc::clone(&self.executor),
            round: self.round(config),
            report_interval: self.report_interval,
            ranging: Arc::new(AtomicBool::new(false)),
            closed: AtomicBool::new(false),
            reporter: Mutex::new(None),
        });

        let cancelled = Arc::new(AtomicBool::new(false));
        let deliver_cancelled = Arc::clone(&cancelled);
        let deliver_session = Arc::clone(&session);
        self.executor.execute(move || {
            if deliver_cancelled.load(Ordering::SeqCst) {
                // Open cancelled before completion: session closes instead.
                deliver_session.callbacks.on_callback(
                    deliver_session.handle,
                    SessionCallback::Closed(REASON_LOCAL_REQUEST, ParamsBundle::new()),
                );
            } else {
                tracing::debug!(handle = %deliver_session.handle, "sim session opened");
                deliver_session
                    .callbacks
                    .on_callback(deliver_session.handle, SessionCallback::Opened(deliver_session.clone()));
            }
        });

        Ok(CancelGuard::new(move || {
            cancelled.store(true, Ordering::SeqCst);
        }))
    }
}

/// A live simulated session.
struct SimSession {
    handle: SessionHandle,
    callbacks: Arc<dyn SessionCallbacks>,
    executor: Arc<SerialExecutor>,
    round: Vec<Measurement>,
    report_interval: Duration,
    ranging: Arc<AtomicBool>,
    closed: AtomicBool,
    reporter: Mutex<Option<JoinHandle<()>>>,
}

impl SimSession {
    fn post(&self, callback: SessionCallback) {
        let callbacks = Arc::clone(&self.callbacks);
        let handle = self.handle;
        self.executor.execute(move || callbacks.on_callback(handle, callback));
    }

    fn stop_reporter(&self) {
        self.ranging.store(false, Ordering::SeqCst);
        if let Ok(mut reporter) = self.reporter.lock() {
            if let Some(worker) = reporter.take() {
                let _ = worker.join();
            }
        }
    }
}

impl NativeSession for SimSession {
    fn start(&self, _params: ParamsBundle) {
        if self.closed.load(Ordering::SeqCst) || self.ranging.swap(true, Ordering::SeqCst) {
            self.post(SessionCallback::StartFailed(
                REASON_GENERIC_ERROR,
                ParamsBundle::from_pairs([("detail", json!("session closed or already ranging"))]),
            ));
            return;
        }

        self.post(SessionCallback::Started(ParamsBundle::from_pairs([(
            "report_interval_ms",
            json!(self.report_interval.as_millis() as u64),
        )])));

        let ranging = Arc::clone(&self.ranging);
        let callbacks = Arc::clone(&self.callbacks);
        let executor = Arc::clone(&self.executor);
        let handle = self.handle;
        let round = self.round.clone();
        let interval = self.report_interval;

        let worker = std::thread::spawn(move || {
            while ranging.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
                if !ranging.load(Ordering::SeqCst) {
                    break;
                }
                let callbacks = Arc::clone(&callbacks);
                let report = RangingReport::new(round.clone());
                executor.execute(move || {
                    callbacks.on_callback(handle, SessionCallback::ReportReceived(report));
                });
            }
        });

        if let Ok(mut reporter) = self.reporter.lock() {
            *reporter = Some(worker);
        }
    }

    fn stop(&self) {
        if self.closed.load(Ordering::SeqCst) || !self.ranging.load(Ordering::SeqCst) {
            self.post(SessionCallback::StopFailed(
                REASON_GENERIC_ERROR,
                ParamsBundle::from_pairs([("detail", json!("not ranging"))]),
            ));
            return;
        }
        self.stop_reporter();
        self.post(SessionCallback::Stopped(
            REASON_LOCAL_REQUEST,
            ParamsBundle::new(),
        ));
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop_reporter();
        self.post(SessionCallback::Closed(
            REASON_LOCAL_REQUEST,
            ParamsBundle::new(),
        ));
    }
}

//! # uwb-bridge
//!
//! Ranging session registry with an HTTP control surface.
//!
//! This crate tracks ultra-wideband ranging sessions from open to close,
//! records the latest platform callback per session, and republishes
//! callbacks as events filtered through a per-session subscription mask.
//! Scripted callers query the latest ranging report for distance and
//! angle-of-arrival readings per peer.
//!
//! ## Features
//!
//! - **Session registry**: Stateful ranging sessions with lifecycle tracking
//! - **Event republishing**: Per-session event mask over a broadcast sink
//! - **Measurement queries**: Distance and angle-of-arrival lookup per peer
//! - **Simulated backend**: Deterministic ranging rounds for development
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use uwb_bridge::{
//!     BroadcastSink, EventSink, RangingService, SessionConfig, SessionRegistry, SimBackend,
//! };
//!
//! fn main() -> uwb_bridge::Result<()> {
//!     uwb_bridge::logging::try_init().ok();
//!
//!     let sink = Arc::new(BroadcastSink::default());
//!     let registry = Arc::new(SessionRegistry::new(sink as Arc<dyn EventSink>));
//!     let backend = Arc::new(SimBackend::new(vec![], Duration::from_millis(100)));
//!     let service = RangingService::new(registry, backend);
//!
//!     let handle = service.open_session(&SessionConfig::default())?;
//!     println!("Session {} opened", handle);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod ranging;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use error::{Result, UwbBridgeError};
pub use events::{BroadcastSink, CollectSink, EventSink, NullSink, SessionEvent};
pub use ranging::{
    Measurement, MeasurementStatus, NativeSession, ParamsBundle, PeerAddress, RangingBackend,
    RangingReport, SessionCallback, SessionConfig, SimBackend, SimPeer,
};
pub use service::RangingService;
pub use session::{EventKind, EventMask, SessionHandle, SessionRecord, SessionRegistry};

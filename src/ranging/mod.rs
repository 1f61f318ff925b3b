//! Ranging platform abstraction.
//!
//! Backend traits, the callback sum type, report/measurement value types,
//! the single-worker callback executor, and the simulated backend.

mod backend;
mod callback;
mod executor;
mod report;
mod sim;

pub use backend::{
    CancelGuard, NativeSession, RangingBackend, SessionCallbacks, SessionConfig,
};
pub use callback::{
    ParamsBundle, ReasonCode, SessionCallback, REASON_BAD_PARAMETERS, REASON_GENERIC_ERROR,
    REASON_LOCAL_REQUEST, REASON_REMOTE_REQUEST, REASON_UNKNOWN,
};
pub use executor::SerialExecutor;
pub use report::{Measurement, MeasurementStatus, PeerAddress, RangingReport};
pub use sim::{SimBackend, SimPeer};

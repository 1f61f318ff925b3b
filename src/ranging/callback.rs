//! Session callbacks as a tagged variant.
//!
//! The platform ranging layer exposes one override point per outcome; here
//! the whole callback contract is a single sum type dispatched by kind.
//! Kind-specific payloads ride along: the opened native session, the reason
//! code and parameter bundle of terminal/failure callbacks, or the report.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::backend::NativeSession;
use super::report::RangingReport;
use crate::session::EventKind;

/// Integer reason carried by terminal and failure callbacks.
pub type ReasonCode = i32;

/// Reason is unknown or unreported.
pub const REASON_UNKNOWN: ReasonCode = 0;
/// The local caller requested the transition.
pub const REASON_LOCAL_REQUEST: ReasonCode = 1;
/// The remote peer requested the transition.
pub const REASON_REMOTE_REQUEST: ReasonCode = 2;
/// The supplied parameters were rejected.
pub const REASON_BAD_PARAMETERS: ReasonCode = 3;
/// A generic platform failure occurred.
pub const REASON_GENERIC_ERROR: ReasonCode = 4;

/// Opaque key/value bundle attached to session callbacks.
///
/// The platform treats this as pass-through data; it is stored and exposed
/// as a JSON object without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamsBundle(pub Map<String, Value>);

impl ParamsBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bundle from an iterator of key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// An asynchronous ranging session callback.
#[derive(Clone)]
pub enum SessionCallback {
    /// The session opened; carries the live native session reference.
    Opened(Arc<dyn NativeSession>),
    /// Opening the session failed.
    OpenFailed(ReasonCode, ParamsBundle),
    /// Ranging started; carries the session-info bundle.
    Started(ParamsBundle),
    /// Starting ranging failed.
    StartFailed(ReasonCode, ParamsBundle),
    /// The session was reconfigured.
    Reconfigured(ParamsBundle),
    /// Reconfiguring failed.
    ReconfigureFailed(ReasonCode, ParamsBundle),
    /// Ranging stopped.
    Stopped(ReasonCode, ParamsBundle),
    /// Stopping failed.
    StopFailed(ReasonCode, ParamsBundle),
    /// The session closed.
    Closed(ReasonCode, ParamsBundle),
    /// Closing failed.
    CloseFailed(ReasonCode, ParamsBundle),
    /// A ranging report arrived.
    ReportReceived(RangingReport),
}

impl SessionCallback {
    /// The event kind this callback maps to.
    pub fn kind(&self) -> EventKind {
        match self {
            SessionCallback::Opened(_) => EventKind::Opened,
            SessionCallback::OpenFailed(..) => EventKind::OpenFailed,
            SessionCallback::Started(_) => EventKind::Started,
            SessionCallback::StartFailed(..) => EventKind::StartFailed,
            SessionCallback::Reconfigured(_) => EventKind::Reconfigured,
            SessionCallback::ReconfigureFailed(..) => EventKind::ReconfigureFailed,
            SessionCallback::Stopped(..) => EventKind::Stopped,
            SessionCallback::StopFailed(..) => EventKind::StopFailed,
            SessionCallback::Closed(..) => EventKind::Closed,
            SessionCallback::CloseFailed(..) => EventKind::CloseFailed,
            SessionCallback::ReportReceived(_) => EventKind::ReportReceived,
        }
    }
}

impl fmt::Debug for SessionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionCallback::Opened(_) => f.write_str("Opened(<native session>)"),
            SessionCallback::ReportReceived(report) => {
                write!(f, "ReportReceived({} measurements)", report.measurements.len())
            }
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_bundle_from_pairs() {
        let bundle = ParamsBundle::from_pairs([("reason", json!(3)), ("note", json!("rejected"))]);
        assert!(!bundle.is_empty());
        assert_eq!(bundle.get("reason"), Some(&json!(3)));
        assert_eq!(bundle.get("note"), Some(&json!("rejected")));
        assert_eq!(bundle.get("missing"), None);
    }

    #[test]
    fn test_params_bundle_serde() {
        let bundle = ParamsBundle::from_pairs([("channel", json!(9))]);
        let text = serde_json::to_string(&bundle).unwrap();
        assert_eq!(text, r#"{"channel":9}"#);

        let back: ParamsBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_callback_kind_mapping() {
        use crate::session::EventKind;

        let cases = [
            (
                SessionCallback::OpenFailed(REASON_BAD_PARAMETERS, ParamsBundle::new()),
                EventKind::OpenFailed,
            ),
            (
                SessionCallback::Started(ParamsBundle::new()),
                EventKind::Started,
            ),
            (
                SessionCallback::Stopped(REASON_LOCAL_REQUEST, ParamsBundle::new()),
                EventKind::Stopped,
            ),
            (
                SessionCallback::ReportReceived(RangingReport::new(vec![])),
                EventKind::ReportReceived,
            ),
        ];
        for (callback, expected) in cases {
            assert_eq!(callback.kind(), expected);
        }
    }

    #[test]
    fn test_callback_debug_is_compact() {
        let cb = SessionCallback::ReportReceived(RangingReport::new(vec![]));
        assert_eq!(format!("{:?}", cb), "ReportReceived(0 measurements)");

        let cb = SessionCallback::Closed(REASON_UNKNOWN, ParamsBundle::new());
        assert_eq!(format!("{:?}", cb), "Closed");
    }
}

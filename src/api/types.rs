//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::ranging::{Measurement, ParamsBundle, ReasonCode, SessionConfig};
use crate::session::{SessionHandle, SessionRecord};

/// Request to open a new ranging session.
///
/// The body is the open-session parameter object itself, matching the JSON
/// shape automation scripts already use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(flatten)]
    pub config: SessionConfig,
}

/// Response for session open.
#[derive(Debug, Clone, Serialize)]
pub struct OpenSessionResponse {
    /// The assigned session handle.
    pub handle: SessionHandle,
}

/// Response for session status query.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    /// Session handle.
    pub handle: SessionHandle,
    /// Whether the Opened callback has arrived.
    pub opened: bool,
    /// Event names currently subscribed.
    pub subscribed_events: Vec<String>,
    /// Whether a ranging report has been received.
    pub has_report: bool,
    /// Reason code from the latest terminal/failure callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reason: Option<ReasonCode>,
    /// Session-info bundle from the latest Started/Reconfigured callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<ParamsBundle>,
    /// Bundle from the latest terminal/failure callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_params: Option<ParamsBundle>,
}

impl SessionStatusResponse {
    pub fn from_record(handle: SessionHandle, record: &SessionRecord) -> Self {
        Self {
            handle,
            opened: record.native().is_some(),
            subscribed_events: record
                .mask()
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
            has_report: record.report().is_some(),
            last_reason: record.last_reason(),
            session_info: record.session_info().cloned(),
            last_params: record.last_params().cloned(),
        }
    }
}

/// List sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of sessions.
    pub count: usize,
    /// Session summaries.
    pub sessions: Vec<SessionSummary>,
}

/// Brief session summary for listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub handle: SessionHandle,
    pub opened: bool,
    pub has_report: bool,
}

/// Request to subscribe or unsubscribe an event.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    /// Canonical event name, e.g. "ReportReceived".
    pub event: String,
}

/// Boolean outcome of subscribe/unsubscribe.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub ok: bool,
}

/// Response for a peer measurement lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PeerResponse {
    /// Whether a successful measurement for the peer exists.
    pub found: bool,
    /// The matched measurement, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Measurement>,
}

/// A distance reading.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceResponse {
    pub meters: f64,
}

/// An angle-of-arrival reading.
#[derive(Debug, Clone, Serialize)]
pub struct AngleResponse {
    pub radians: f64,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "UNKNOWN_HANDLE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unknown_handle(handle: &str) -> Self {
        Self::new("UNKNOWN_HANDLE", format!("session '{}' not found", handle))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

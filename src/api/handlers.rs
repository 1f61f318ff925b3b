//! REST API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::types::{
    AngleResponse, DistanceResponse, ErrorResponse, ListSessionsResponse, OpenSessionRequest,
    OpenSessionResponse, PeerResponse, SessionStatusResponse, SessionSummary, SubscribeRequest,
    SubscribeResponse,
};
use crate::error::UwbBridgeError;
use crate::events::{BroadcastSink, EventSink};
use crate::ranging::{PeerAddress, RangingBackend, SimBackend};
use crate::service::RangingService;
use crate::session::{SessionHandle, SessionRegistry};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RangingService>,
    pub events: Arc<BroadcastSink>,
}

impl AppState {
    /// Build state around an existing service and event sink.
    pub fn new(service: Arc<RangingService>, events: Arc<BroadcastSink>) -> Self {
        Self { service, events }
    }

    /// Build state wired to the given backend.
    pub fn with_backend(backend: Arc<dyn RangingBackend>) -> Self {
        let events = Arc::new(BroadcastSink::default());
        let registry = Arc::new(SessionRegistry::new(
            Arc::clone(&events) as Arc<dyn EventSink>
        ));
        let service = Arc::new(RangingService::new(registry, backend));
        Self { service, events }
    }

    /// Build state backed by an empty simulated backend.
    pub fn with_sim_backend() -> Self {
        Self::with_backend(Arc::new(SimBackend::new(
            vec![],
            Duration::from_millis(100),
        )))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_sim_backend()
    }
}

fn map_error(err: UwbBridgeError) -> ApiError {
    let (status, code) = match &err {
        UwbBridgeError::UnknownHandle(_) => (StatusCode::NOT_FOUND, "UNKNOWN_HANDLE"),
        UwbBridgeError::MeasurementUnavailable(_) => {
            (StatusCode::NOT_FOUND, "MEASUREMENT_UNAVAILABLE")
        }
        UwbBridgeError::NotOpened(_) => (StatusCode::CONFLICT, "NOT_OPENED"),
        UwbBridgeError::InvalidEventName(_) => (StatusCode::BAD_REQUEST, "INVALID_EVENT_NAME"),
        UwbBridgeError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, err.to_string())))
}

fn parse_handle(raw: &str) -> Result<SessionHandle, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::unknown_handle(raw)),
        )
    })
}

fn parse_peer(raw: &str) -> Result<PeerAddress, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "invalid peer address '{}'",
                raw
            ))),
        )
    })
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "uwb-bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// List all sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let registry = state.service.registry();
    let mut sessions = Vec::new();
    for handle in registry.list_handles() {
        if let Ok(summary) = registry.with_record(handle, |r| SessionSummary {
            handle,
            opened: r.native().is_some(),
            has_report: r.report().is_some(),
        }) {
            sessions.push(summary);
        }
    }

    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

/// Open a new ranging session.
pub async fn open_session(
    State(state): State<AppState>,
    Json(req): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<OpenSessionResponse>), ApiError> {
    let handle = state
        .service
        .open_session(&req.config)
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(OpenSessionResponse { handle })))
}

/// Get session status.
pub async fn get_session(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let handle = parse_handle(&handle)?;
    let status = state
        .service
        .registry()
        .with_record(handle, |r| SessionStatusResponse::from_record(handle, r))
        .map_err(map_error)?;
    Ok(Json(status))
}

/// Close a session.
pub async fn close_session(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, ApiError> {
    let handle = parse_handle(&handle)?;
    state.service.close_session(handle).map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start ranging on a session.
pub async fn start_session(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, ApiError> {
    let handle = parse_handle(&handle)?;
    state.service.start_session(handle).map_err(map_error)?;
    // Fire-and-forget: the outcome arrives as a Started/StartFailed event
    Ok(StatusCode::ACCEPTED)
}

/// Stop ranging on a session.
pub async fn stop_session(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, ApiError> {
    let handle = parse_handle(&handle)?;
    state.service.stop_session(handle).map_err(map_error)?;
    Ok(StatusCode::ACCEPTED)
}

/// Subscribe an event kind.
///
/// Failure (unknown handle or unrecognized name) is reported as `ok: false`,
/// matching the boolean contract of the scripted callers.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(req): Json<SubscribeRequest>,
) -> Json<SubscribeResponse> {
    let ok = handle
        .parse()
        .map(|h| state.service.registry().subscribe(h, &req.event))
        .unwrap_or(false);
    Json(SubscribeResponse { ok })
}

/// Unsubscribe an event kind.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(req): Json<SubscribeRequest>,
) -> Json<SubscribeResponse> {
    let ok = handle
        .parse()
        .map(|h| state.service.registry().unsubscribe(h, &req.event))
        .unwrap_or(false);
    Json(SubscribeResponse { ok })
}

/// Look up the latest successful measurement for a peer.
pub async fn get_peer(
    State(state): State<AppState>,
    Path((handle, peer)): Path<(String, String)>,
) -> Result<Json<PeerResponse>, ApiError> {
    let handle = parse_handle(&handle)?;
    let peer = parse_peer(&peer)?;

    let measurement = state.service.registry().find_measurement(handle, &peer);
    Ok(Json(PeerResponse {
        found: measurement.is_some(),
        measurement,
    }))
}

/// Get the distance to a peer in meters.
pub async fn get_distance(
    State(state): State<AppState>,
    Path((handle, peer)): Path<(String, String)>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let handle = parse_handle(&handle)?;
    let peer = parse_peer(&peer)?;

    let meters = state
        .service
        .registry()
        .distance(handle, &peer)
        .map_err(map_error)?;
    Ok(Json(DistanceResponse { meters }))
}

/// Get the angle-of-arrival azimuth to a peer in radians.
pub async fn get_azimuth(
    State(state): State<AppState>,
    Path((handle, peer)): Path<(String, String)>,
) -> Result<Json<AngleResponse>, ApiError> {
    let handle = parse_handle(&handle)?;
    let peer = parse_peer(&peer)?;

    let radians = state
        .service
        .registry()
        .azimuth(handle, &peer)
        .map_err(map_error)?;
    Ok(Json(AngleResponse { radians }))
}

/// Get the angle-of-arrival altitude to a peer in radians.
pub async fn get_altitude(
    State(state): State<AppState>,
    Path((handle, peer)): Path<(String, String)>,
) -> Result<Json<AngleResponse>, ApiError> {
    let handle = parse_handle(&handle)?;
    let peer = parse_peer(&peer)?;

    let radians = state
        .service
        .registry()
        .altitude(handle, &peer)
        .map_err(map_error)?;
    Ok(Json(AngleResponse { radians }))
}

//! HTTP API layer.
//!
//! REST endpoints for the session lifecycle, subscription, and measurement
//! queries, plus a WebSocket stream of republished session events.

mod handlers;
mod router;
mod types;
mod websocket;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{
    AngleResponse, DistanceResponse, ErrorResponse, ListSessionsResponse, OpenSessionRequest,
    OpenSessionResponse, PeerResponse, SessionStatusResponse, SessionSummary, SubscribeRequest,
    SubscribeResponse,
};

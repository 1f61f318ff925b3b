//! API router configuration.

use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_info, close_session, get_altitude, get_azimuth, get_distance, get_peer, get_session,
    health, list_sessions, open_session, start_session, stop_session, subscribe, unsubscribe,
    AppState,
};
use super::websocket::events_ws_handler;

/// Create the API router with default (simulated backend) state.
pub fn create_router() -> Router {
    create_router_with_state(AppState::with_sim_backend())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    // Session routes
    let session_routes = Router::new()
        .route("/", get(list_sessions).post(open_session))
        .route("/{handle}", get(get_session).delete(close_session))
        .route("/{handle}/start", post(start_session))
        .route("/{handle}/stop", post(stop_session))
        .route("/{handle}/subscribe", post(subscribe))
        .route("/{handle}/unsubscribe", post(unsubscribe))
        .route("/{handle}/peers/{peer}", get(get_peer))
        .route("/{handle}/peers/{peer}/distance", get(get_distance))
        .route("/{handle}/peers/{peer}/azimuth", get(get_azimuth))
        .route("/{handle}/peers/{peer}/altitude", get(get_altitude));

    // API v1 routes
    let api_v1 = Router::new()
        .route("/", get(api_info))
        .route("/events/ws", any(events_ws_handler))
        .nest("/sessions", session_routes);

    // Build main router
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Start the API server with custom state.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting uwb-bridge API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::UwbBridgeError::Io)?;

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::error::UwbBridgeError::Io(std::io::Error::other(e.to_string())))?;

    Ok(())
}

/// Start the API server with default state.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    serve_with_state(config, AppState::with_sim_backend()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_config_custom() {
        let config = ServerConfig::new("0.0.0.0", 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_creation() {
        let _router = create_router();
        // Router created successfully
    }
}

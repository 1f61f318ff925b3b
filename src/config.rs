//! Configuration management for uwb-bridge.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::ranging::{SimBackend, SimPeer};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Logging configuration.
    pub logging: LoggingSection,
    /// Simulated backend configuration.
    pub sim: SimSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Simulated backend configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSection {
    /// Peers the simulated backend ranges against.
    pub peers: Vec<SimPeerSection>,
    /// Ranging report interval in milliseconds.
    pub report_interval_ms: u64,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            report_interval_ms: 200,
        }
    }
}

/// One simulated peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimPeerSection {
    /// Peer address as colon-separated hex, e.g. "01:02".
    pub address: String,
    /// Reported distance in meters.
    pub distance_m: f64,
    /// Reported azimuth in radians.
    pub azimuth_rad: Option<f64>,
    /// Reported altitude in radians.
    pub altitude_rad: Option<f64>,
    /// Whether the peer answers ranging rounds.
    pub responsive: bool,
}

impl Default for SimPeerSection {
    fn default() -> Self {
        Self {
            address: String::new(),
            distance_m: 1.0,
            azimuth_rad: None,
            altitude_rad: None,
            responsive: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("UWB_BRIDGE_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("UWB_BRIDGE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(level) = std::env::var("UWB_BRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        self.server.host = args.host.to_string();
        self.server.port = args.port;

        if let Some(interval) = args.report_interval_ms {
            self.sim.report_interval_ms = interval;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Build the simulated backend from the sim section.
    pub fn to_sim_backend(&self) -> Result<SimBackend, ConfigError> {
        let mut peers = Vec::with_capacity(self.sim.peers.len());
        for section in &self.sim.peers {
            let address = section
                .address
                .parse()
                .map_err(|_| ConfigError::InvalidPeerAddress(section.address.clone()))?;
            peers.push(SimPeer {
                address,
                distance_m: section.distance_m,
                aoa_azimuth_rad: section.azimuth_rad,
                aoa_altitude_rad: section.altitude_rad,
                responsive: section.responsive,
            });
        }

        Ok(SimBackend::new(
            peers,
            Duration::from_millis(self.sim.report_interval_ms),
        ))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// Invalid peer address in the sim section.
    InvalidPeerAddress(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidPeerAddress(addr) => write!(f, "invalid peer address: {}", addr),
        }
    }
}

impl std::error::Error for ConfigError {}

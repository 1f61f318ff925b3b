//! Error types for uwb-bridge.

use thiserror::Error;

/// Main error type for uwb-bridge operations.
///
/// Platform-level ranging failures (open/start/stop/close failures) are not
/// errors at this layer: they arrive as ordinary callbacks and are delivered
/// through the event subscription path. This enum only covers conditions the
/// caller itself can correct or must handle.
#[derive(Error, Debug)]
pub enum UwbBridgeError {
    /// Operation referenced a closed or never-created session handle.
    #[error("unknown session handle: {0}")]
    UnknownHandle(String),

    /// Subscribe/unsubscribe was given an unrecognized event name.
    #[error("invalid event name: {0}")]
    InvalidEventName(String),

    /// A measurement query could not be satisfied: peer not found, no report
    /// received yet, or the matched measurement lacks the requested reading.
    ///
    /// A zero distance is a valid reading; absence is always reported through
    /// this error, never as a default value.
    #[error("measurement unavailable: {0}")]
    MeasurementUnavailable(&'static str),

    /// Start/stop was requested before the session's Opened callback arrived.
    #[error("session not opened yet: {0}")]
    NotOpened(String),

    /// The ranging backend rejected a request outright.
    #[error("backend error: {0}")]
    Backend(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for uwb-bridge operations.
pub type Result<T> = std::result::Result<T, UwbBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_handle_display() {
        let err = UwbBridgeError::UnknownHandle("rs-00000001".into());
        assert!(err.to_string().contains("rs-00000001"));
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_invalid_event_name_display() {
        let err = UwbBridgeError::InvalidEventName("opened".into());
        assert!(err.to_string().contains("opened"));
        assert!(err.to_string().contains("invalid event name"));
    }

    #[test]
    fn test_measurement_unavailable_display() {
        let err = UwbBridgeError::MeasurementUnavailable("no altitude reading");
        assert!(err.to_string().contains("measurement unavailable"));
        assert!(err.to_string().contains("no altitude reading"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: UwbBridgeError = io_err.into();
        assert!(matches!(err, UwbBridgeError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_opened_display() {
        let err = UwbBridgeError::NotOpened("rs-000000ff".into());
        assert!(err.to_string().contains("not opened"));
        assert!(err.to_string().contains("rs-000000ff"));
    }
}

//! Ranging report and measurement value types.
//!
//! A report is an ordered collection of per-peer measurements as delivered
//! by the platform ranging layer. Reports are immutable once delivered;
//! delivery order is owned by the platform and is never re-sorted here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A UWB device address.
///
/// In practice 2 (short) or 8 (extended) bytes; equality is byte equality.
/// Displayed as colon-separated hex, e.g. `01:02`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress(Vec<u8>);

impl PeerAddress {
    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for PeerAddress {
    type Err = crate::error::UwbBridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(crate::error::UwbBridgeError::Backend(format!(
                "invalid peer address: '{}'",
                s
            )));
        }
        s.split(':')
            .map(|part| u8::from_str_radix(part, 16).ok())
            .collect::<Option<Vec<u8>>>()
            .map(PeerAddress)
            .ok_or_else(|| {
                crate::error::UwbBridgeError::Backend(format!("invalid peer address: '{}'", s))
            })
    }
}

/// Outcome of ranging against a single peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementStatus {
    /// Ranging succeeded; readings are meaningful.
    Success,
    /// The peer did not respond in time.
    Failure,
}

impl MeasurementStatus {
    pub fn is_success(self) -> bool {
        matches!(self, MeasurementStatus::Success)
    }
}

/// One peer's ranging result within a report.
///
/// Distance and angle-of-arrival readings are optional: a successful
/// measurement may carry any subset of them depending on device capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Address of the remote device.
    pub peer: PeerAddress,
    /// Ranging status for this peer.
    pub status: MeasurementStatus,
    /// Distance to the peer in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Angle-of-arrival azimuth in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aoa_azimuth_rad: Option<f64>,
    /// Angle-of-arrival altitude in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aoa_altitude_rad: Option<f64>,
}

impl Measurement {
    /// A successful measurement carrying only a distance reading.
    pub fn with_distance(peer: PeerAddress, distance_m: f64) -> Self {
        Self {
            peer,
            status: MeasurementStatus::Success,
            distance_m: Some(distance_m),
            aoa_azimuth_rad: None,
            aoa_altitude_rad: None,
        }
    }

    /// A failed measurement (no readings).
    pub fn failed(peer: PeerAddress) -> Self {
        Self {
            peer,
            status: MeasurementStatus::Failure,
            distance_m: None,
            aoa_azimuth_rad: None,
            aoa_altitude_rad: None,
        }
    }
}

/// A ranging report: the per-peer measurements from one ranging round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangingReport {
    /// Measurements in platform delivery order.
    pub measurements: Vec<Measurement>,
}

impl RangingReport {
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_address_display() {
        let addr = PeerAddress::from_bytes([0x01, 0x02]);
        assert_eq!(addr.to_string(), "01:02");

        let ext = PeerAddress::from_bytes([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01, 0x02, 0x03]);
        assert_eq!(ext.to_string(), "de:ad:be:ef:00:01:02:03");
    }

    #[test]
    fn test_peer_address_parse() {
        let addr: PeerAddress = "01:02".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0x01, 0x02]);

        let upper: PeerAddress = "DE:AD".parse().unwrap();
        assert_eq!(upper.as_bytes(), &[0xde, 0xad]);
    }

    #[test]
    fn test_peer_address_parse_invalid() {
        assert!("".parse::<PeerAddress>().is_err());
        assert!("zz:01".parse::<PeerAddress>().is_err());
        assert!("01:".parse::<PeerAddress>().is_err());
    }

    #[test]
    fn test_peer_address_roundtrip() {
        let addr = PeerAddress::from_bytes([0x0a, 0xff]);
        let parsed: PeerAddress = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_peer_address_equality_is_byte_equality() {
        let a = PeerAddress::from_bytes([0x01, 0x02]);
        let b = PeerAddress::from_bytes([0x01, 0x02]);
        let c = PeerAddress::from_bytes([0x01, 0x02, 0x00]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_measurement_constructors() {
        let peer = PeerAddress::from_bytes([0x01, 0x02]);

        let ok = Measurement::with_distance(peer.clone(), 1.5);
        assert!(ok.status.is_success());
        assert_eq!(ok.distance_m, Some(1.5));
        assert!(ok.aoa_azimuth_rad.is_none());

        let bad = Measurement::failed(peer);
        assert!(!bad.status.is_success());
        assert!(bad.distance_m.is_none());
    }

    #[test]
    fn test_report_preserves_order() {
        let report = RangingReport::new(vec![
            Measurement::with_distance(PeerAddress::from_bytes([0x02]), 2.0),
            Measurement::with_distance(PeerAddress::from_bytes([0x01]), 1.0),
        ]);
        assert_eq!(report.measurements[0].peer.as_bytes(), &[0x02]);
        assert_eq!(report.measurements[1].peer.as_bytes(), &[0x01]);
    }

    #[test]
    fn test_measurement_serialization_skips_absent_readings() {
        let m = Measurement::with_distance(PeerAddress::from_bytes([0x01]), 0.0);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("distance_m"));
        assert!(!json.contains("aoa_azimuth_rad"));
        assert!(!json.contains("aoa_altitude_rad"));
    }
}

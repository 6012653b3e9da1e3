//! # Position Fix
//!
//! A single GPS position report pushed by the location service.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position report from the location service.
///
/// Fixes arrive at an irregular cadence and may be arbitrarily noisy. The field names follow the
/// platform location API (`latitude`, `longitude`, `accuracy`, `speed`, `heading`, `timestamp`
/// in milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Units: degrees
    #[serde(rename = "latitude", alias = "lat")]
    pub lat_deg: f64,

    /// Units: degrees
    #[serde(rename = "longitude", alias = "lng", alias = "lon")]
    pub lon_deg: f64,

    /// Horizontal accuracy radius reported by the receiver.
    ///
    /// Units: meters
    #[serde(rename = "accuracy", default)]
    pub accuracy_m: f64,

    /// Instantaneous ground speed. `None` or a non-positive value means the speed is unknown.
    ///
    /// Units: meters/second
    #[serde(rename = "speed", default)]
    pub speed_ms: Option<f64>,

    /// Course over ground, if known.
    ///
    /// Units: degrees
    #[serde(rename = "heading", default)]
    pub heading_deg: Option<f64>,

    /// Time at which the fix was acquired
    #[serde(with = "ts_milliseconds", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PositionFix {
    /// Create a fix at the given position with no speed, heading or accuracy information,
    /// timestamped now.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            accuracy_m: 0.0,
            speed_ms: None,
            heading_deg: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the speed of the fix.
    pub fn with_speed(mut self, speed_ms: f64) -> Self {
        self.speed_ms = Some(speed_ms);
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat_deg, self.lon_deg)
    }

    /// Returns true if the fix's position is finite and within range.
    pub fn is_valid(&self) -> bool {
        self.coordinate().is_valid()
    }

    /// The speed of the fix if it is known, i.e. finite and strictly positive.
    pub fn known_speed_ms(&self) -> Option<f64> {
        self.speed_ms.filter(|s| s.is_finite() && *s > 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fix_from_location_json() {
        let fix: PositionFix = serde_json::from_str(
            r#"{
                "latitude": 43.7853,
                "longitude": -79.1884,
                "accuracy": 4.5,
                "speed": -1.0,
                "heading": null,
                "timestamp": 1700000000000
            }"#,
        )
        .unwrap();

        assert_eq!(fix.coordinate(), Coordinate::new(43.7853, -79.1884));
        assert_eq!(fix.accuracy_m, 4.5);
        assert_eq!(fix.known_speed_ms(), None);
        assert_eq!(fix.heading_deg, None);
        assert_eq!(fix.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_fix_known_speed() {
        assert_eq!(PositionFix::new(0.0, 0.0).known_speed_ms(), None);
        assert_eq!(PositionFix::new(0.0, 0.0).with_speed(0.0).known_speed_ms(), None);
        assert_eq!(
            PositionFix::new(0.0, 0.0).with_speed(f64::NAN).known_speed_ms(),
            None
        );
        assert_eq!(
            PositionFix::new(0.0, 0.0).with_speed(1.2).known_speed_ms(),
            Some(1.2)
        );
    }

    #[test]
    fn test_fix_validity() {
        assert!(PositionFix::new(10.0, 20.0).is_valid());
        assert!(!PositionFix::new(f64::NAN, 20.0).is_valid());
        assert!(!PositionFix::new(10.0, 200.0).is_valid());
    }
}

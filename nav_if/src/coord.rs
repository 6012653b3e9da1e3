//! # Coordinate
//!
//! WGS-84 latitude/longitude pair used throughout the navigation software. Altitude is not
//! tracked.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A geographic position in degrees.
///
/// Serialised as `{"lat": .., "lng": ..}` to match the directions service, `latitude` and
/// `longitude` are accepted when deserialising.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, positive north.
    ///
    /// Units: degrees
    #[serde(rename = "lat", alias = "latitude")]
    pub lat_deg: f64,

    /// Longitude, positive east.
    ///
    /// Units: degrees
    #[serde(rename = "lng", alias = "longitude", alias = "lon")]
    pub lon_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Coordinate {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Returns true if both components are finite and inside the valid latitude/longitude
    /// ranges.
    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && self.lat_deg.abs() <= 90.0
            && self.lon_deg.abs() <= 180.0
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat_deg, self.lon_deg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(43.78, -79.18).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_coordinate_aliases() {
        let a: Coordinate = serde_json::from_str(r#"{"lat": 1.5, "lng": -2.0}"#).unwrap();
        let b: Coordinate =
            serde_json::from_str(r#"{"latitude": 1.5, "longitude": -2.0}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Coordinate::new(1.5, -2.0));
    }
}

//! # Progress and arrival estimation
//!
//! Converts a projection onto the route into distance traveled and remaining, and estimates the
//! time of arrival from the user's speed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{geodesy, route::RouteGeometry};
use nav_if::Coordinate;
use util::{maths::clamp, time::seconds_to_duration};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Formatted ETA when no usable speed is available
pub const UNKNOWN_ETA: &str = "--";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Progress of a position along a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RouteProgress {
    /// Units: meters
    pub distance_traveled_m: f64,

    /// Units: meters
    pub total_distance_m: f64,

    /// Percentage of the route completed, in [0, 100]
    pub progress_percentage: f64,

    /// Units: meters
    pub remaining_distance_m: f64,

    /// Index of the segment the position projects onto
    pub segment_index: usize,

    /// Distance from the position to the route centerline
    ///
    /// Units: meters
    pub distance_to_route_m: f64,
}

/// Estimated time of arrival.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eta {
    /// Time remaining until arrival. Infinite if no speed is available.
    ///
    /// Units: seconds
    pub eta_s: f64,

    /// Human readable time remaining, such as `"11m"` or `"1h 5m"`
    pub formatted: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Eta {
    fn default() -> Self {
        Self {
            eta_s: f64::INFINITY,
            formatted: UNKNOWN_ETA.into(),
        }
    }
}

impl Eta {
    /// The absolute time of arrival if leaving at `now`, or `None` if the ETA is unknown.
    pub fn arrival_time(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.eta_s.is_finite() {
            return None;
        }

        now.checked_add_signed(seconds_to_duration(self.eta_s))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the progress of `position` along the route.
///
/// Geometries with fewer than 2 points give the default (all zero) progress.
pub fn compute_progress(position: &Coordinate, route: &RouteGeometry) -> RouteProgress {
    let (proj, total_distance_m) = match (route.project(position), route.get_length()) {
        (Some(p), Some(l)) => (p, l),
        _ => return RouteProgress::default(),
    };

    // Length of all complete segments, plus the part of the current segment covered so far
    let seg_start_m = route.get_length_to(proj.segment_index).unwrap_or(0.0);
    let along_seg_m = match route.get_segment(proj.segment_index) {
        Some(seg) => geodesy::distance(&seg.start, &proj.projected_point),
        None => 0.0,
    };
    let distance_traveled_m = seg_start_m + along_seg_m;

    let progress_percentage = if total_distance_m > 0.0 {
        clamp(distance_traveled_m / total_distance_m * 100.0, 0.0, 100.0)
    } else {
        0.0
    };

    RouteProgress {
        distance_traveled_m,
        total_distance_m,
        progress_percentage,
        remaining_distance_m: (total_distance_m - distance_traveled_m).max(0.0),
        segment_index: proj.segment_index,
        distance_to_route_m: proj.distance_to_route_m,
    }
}

/// Estimate the time to cover `remaining_m`.
///
/// `current_speed_ms` is used if it is positive, otherwise `fallback_speed_ms`. If neither is
/// usable the ETA is unknown.
pub fn compute_eta(remaining_m: f64, current_speed_ms: f64, fallback_speed_ms: f64) -> Eta {
    let speed_ms = if current_speed_ms.is_finite() && current_speed_ms > 0.0 {
        current_speed_ms
    } else if fallback_speed_ms.is_finite() && fallback_speed_ms > 0.0 {
        fallback_speed_ms
    } else {
        return Eta::default();
    };

    let eta_s = remaining_m.max(0.0) / speed_ms;

    Eta {
        eta_s,
        formatted: format_eta(eta_s),
    }
}

/// Format a number of seconds as hours and minutes, rounding down.
pub fn format_eta(eta_s: f64) -> String {
    if !eta_s.is_finite() {
        return UNKNOWN_ETA.into();
    }

    let hours = (eta_s / 3600.0).floor() as u64;
    let minutes = ((eta_s % 3600.0) / 60.0).floor() as u64;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        "<1m".into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn straight_route() -> RouteGeometry {
        RouteGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0005, 0.0),
            Coordinate::new(0.001, 0.0),
        ])
    }

    #[test]
    fn test_progress_midpoint() {
        let route = straight_route();
        let p = compute_progress(&Coordinate::new(0.0005, 0.0), &route);

        assert!((p.progress_percentage - 50.0).abs() < 1e-6);
        assert!((p.distance_traveled_m + p.remaining_distance_m - p.total_distance_m).abs() < 1e-6);
        assert!(p.distance_to_route_m < 1e-6);
    }

    #[test]
    fn test_progress_monotonic() {
        let route = straight_route();
        let mut last = -1.0;

        for i in 0..=20 {
            let pos = Coordinate::new(0.001 * i as f64 / 20.0, 0.00001);
            let p = compute_progress(&pos, &route);
            assert!(
                p.progress_percentage >= last,
                "progress went backwards at step {}: {} < {}",
                i,
                p.progress_percentage,
                last
            );
            last = p.progress_percentage;
        }

        assert!((last - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_progress_bounds() {
        let route = straight_route();

        for pos in &[
            Coordinate::new(-0.01, 0.0),
            Coordinate::new(0.02, 0.0),
            Coordinate::new(0.0005, 0.5),
            Coordinate::new(-89.0, 179.0),
        ] {
            let p = compute_progress(pos, &route);
            assert!(p.progress_percentage >= 0.0 && p.progress_percentage <= 100.0);
            assert!(p.remaining_distance_m >= 0.0);
        }
    }

    #[test]
    fn test_progress_empty_route() {
        let empty = RouteGeometry::new_empty();
        let p = compute_progress(&Coordinate::new(1.0, 1.0), &empty);
        assert_eq!(p, RouteProgress::default());
        assert_eq!(p.progress_percentage, 0.0);

        let single = RouteGeometry::new(vec![Coordinate::new(1.0, 1.0)]);
        assert_eq!(compute_progress(&Coordinate::new(1.0, 1.0), &single), RouteProgress::default());
    }

    #[test]
    fn test_progress_zero_length_route() {
        let route = RouteGeometry::new(vec![Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)]);
        let p = compute_progress(&Coordinate::new(1.0, 1.001), &route);
        assert_eq!(p.progress_percentage, 0.0);
        assert_eq!(p.remaining_distance_m, 0.0);
    }

    #[test]
    fn test_eta() {
        // Stationary user falls back to walking speed
        let eta = compute_eta(1000.0, 0.0, 1.4);
        assert!((eta.eta_s - 714.2857).abs() < 1e-3);
        assert_eq!(eta.formatted, "11m");

        // Known speed is preferred
        let eta = compute_eta(1000.0, 2.0, 1.4);
        assert_eq!(eta.eta_s, 500.0);
        assert_eq!(eta.formatted, "8m");

        // No usable speed at all
        let eta = compute_eta(1000.0, -1.0, 0.0);
        assert!(eta.eta_s.is_infinite());
        assert_eq!(eta.formatted, "--");
        assert!(eta.arrival_time(Utc::now()).is_none());
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.0), "<1m");
        assert_eq!(format_eta(59.9), "<1m");
        assert_eq!(format_eta(60.0), "1m");
        assert_eq!(format_eta(3599.0), "59m");
        assert_eq!(format_eta(3600.0), "1h 0m");
        assert_eq!(format_eta(3900.0), "1h 5m");
        assert_eq!(format_eta(f64::INFINITY), "--");
    }

    #[test]
    fn test_arrival_time() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let eta = compute_eta(150.0, 1.5, 1.4);
        assert_eq!(
            eta.arrival_time(now),
            Some(Utc.timestamp_opt(1_700_000_100, 0).unwrap())
        );
    }
}

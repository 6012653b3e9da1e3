//! # Route geometry
//!
//! This module defines the decoded route geometry used by the tracking core, and projection of
//! the user's position onto it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::geodesy;
use nav_if::{Coordinate, RouteData, RouteError};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The geometry of a route, as an ordered sequence of points joined by straight segments.
#[derive(Clone, Serialize, Debug, Default)]
pub struct RouteGeometry {
    points: Vec<Coordinate>,

    /// Cumulative length of the route at each point, so `cumulative_m[0] == 0` and the last
    /// element is the total length.
    ///
    /// Units: meters
    cumulative_m: Vec<f64>,
}

/// A segment between two route points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// The start point of the segment
    pub start: Coordinate,

    /// The end point of the segment
    pub end: Coordinate,

    /// The length of the segment
    ///
    /// Units: meters
    pub length_m: f64,

    /// The bearing from the start to the end of the segment
    ///
    /// Units: degrees
    pub bearing_deg: f64,
}

/// The closest point on the route to a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Index of the segment (and its start point) containing the closest point
    pub segment_index: usize,

    /// Distance from the position to the route centerline
    ///
    /// Units: meters
    pub distance_to_route_m: f64,

    /// The closest point on the route
    pub projected_point: Coordinate,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl RouteGeometry {
    /// Create a new empty geometry
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Build the geometry from a sequence of points, precomputing the segment lengths.
    pub fn new(points: Vec<Coordinate>) -> Self {
        let mut cumulative_m = Vec::with_capacity(points.len());
        let mut total_m = 0f64;

        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                total_m += geodesy::distance(&points[i - 1], p);
            }
            cumulative_m.push(total_m);
        }

        Self {
            points,
            cumulative_m,
        }
    }

    /// Decode and validate the geometry of a route.
    ///
    /// Fails if the route has no steps, invalid step coordinates, an undecodable polyline, or
    /// fewer than 2 points.
    pub fn from_route(route: &RouteData) -> Result<Self, RouteError> {
        Ok(Self::new(route.validate()?))
    }

    /// Find the closest point on the route to `position`.
    ///
    /// All segments are checked, and if several are equally close the first is used. If the
    /// geometry is invalid (not enough points) `None` is returned.
    pub fn project(&self, position: &Coordinate) -> Option<Projection> {
        if self.points.len() < 2 {
            return None;
        }

        let mut best: Option<Projection> = None;

        for (i, pair) in self.points.windows(2).enumerate() {
            let projected_point = geodesy::project_onto_segment(position, &pair[0], &pair[1]);
            let distance_to_route_m = geodesy::distance(position, &projected_point);

            let closer = match best {
                Some(ref b) => distance_to_route_m < b.distance_to_route_m,
                None => true,
            };

            if closer {
                best = Some(Projection {
                    segment_index: i,
                    distance_to_route_m,
                    projected_point,
                });
            }
        }

        best
    }

    /// Returns the segment starting at the given point index.
    ///
    /// If no segment exists (the index is the last point or beyond) then `None` is returned.
    pub fn get_segment(&self, index: usize) -> Option<RouteSegment> {
        let start = *self.points.get(index)?;
        let end = *self.points.get(index + 1)?;

        Some(RouteSegment {
            start,
            end,
            length_m: self.cumulative_m[index + 1] - self.cumulative_m[index],
            bearing_deg: geodesy::bearing(&start, &end),
        })
    }

    /// Length of the route up to the given point index.
    ///
    /// Units: meters
    pub fn get_length_to(&self, index: usize) -> Option<f64> {
        self.cumulative_m.get(index).copied()
    }

    /// Return the length of the route in meters.
    ///
    /// If the geometry is invalid (not enough points) then `None` is returned.
    pub fn get_length(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }

        self.cumulative_m.last().copied()
    }

    /// Get the points of the route
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Get the number of points in the route
    pub fn get_num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn l_route() -> RouteGeometry {
        RouteGeometry::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.001, 0.0),
            Coordinate::new(0.001, 0.001),
        ])
    }

    #[test]
    fn test_geometry_lengths() {
        let route = l_route();

        assert_eq!(route.get_num_points(), 3);
        assert!(!route.is_empty());

        let seg_0 = route.get_segment(0).unwrap();
        let seg_1 = route.get_segment(1).unwrap();
        assert!(route.get_segment(2).is_none());

        assert!((seg_0.bearing_deg - 0.0).abs() < 1e-6);
        assert!((seg_1.bearing_deg - 90.0).abs() < 1e-3);

        let total = route.get_length().unwrap();
        assert!((total - (seg_0.length_m + seg_1.length_m)).abs() < 1e-9);
        assert_eq!(route.get_length_to(0), Some(0.0));
        assert_eq!(route.get_length_to(2), Some(total));
    }

    #[test]
    fn test_project() {
        let route = l_route();

        // Beside the first leg
        let p = route.project(&Coordinate::new(0.0005, -0.0002)).unwrap();
        assert_eq!(p.segment_index, 0);
        assert!((p.projected_point.lat_deg - 0.0005).abs() < 1e-12);
        assert!(p.distance_to_route_m > 20.0 && p.distance_to_route_m < 25.0);

        // Beyond the end of the second leg
        let p = route.project(&Coordinate::new(0.001, 0.002)).unwrap();
        assert_eq!(p.segment_index, 1);
        assert_eq!(p.projected_point, Coordinate::new(0.001, 0.001));

        // The shared corner is equally close to both legs, the first wins
        let p = route.project(&Coordinate::new(0.001, 0.0)).unwrap();
        assert_eq!(p.segment_index, 0);
        assert_eq!(p.distance_to_route_m, 0.0);
    }

    #[test]
    fn test_degenerate_geometry() {
        let empty = RouteGeometry::new_empty();
        assert!(empty.is_empty());
        assert!(empty.project(&Coordinate::new(0.0, 0.0)).is_none());
        assert!(empty.get_length().is_none());
        assert!(empty.get_segment(0).is_none());

        let single = RouteGeometry::new(vec![Coordinate::new(1.0, 1.0)]);
        assert!(single.project(&Coordinate::new(0.0, 0.0)).is_none());
        assert!(single.get_length().is_none());
    }
}

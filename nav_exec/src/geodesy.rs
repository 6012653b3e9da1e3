//! # Geodesy primitives
//!
//! Distances and bearings between geographic coordinates, and projection of a point onto a route
//! segment.
//!
//! Distances use the haversine formula on a spherical earth. Projection onto a segment treats
//! latitude and longitude as a local cartesian plane, which is accurate enough over the length of
//! a single walking route segment. The distance to the projected point is then measured with
//! haversine, so results are always in meters.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;

use nav_if::Coordinate;
use util::maths::wrap_360;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Mean radius of the earth.
///
/// Units: meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Great circle distance between two coordinates using the haversine formula.
///
/// Units: meters
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi_1 = a.lat_deg.to_radians();
    let phi_2 = b.lat_deg.to_radians();
    let d_phi = (b.lat_deg - a.lat_deg).to_radians();
    let d_lambda = (b.lon_deg - a.lon_deg).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_1.cos() * phi_2.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push h fractionally above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from `a` to `b`.
///
/// Returns a value in [0, 360), measured clockwise from true north. Identical points give 0.
///
/// Units: degrees
pub fn bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let phi_1 = a.lat_deg.to_radians();
    let phi_2 = b.lat_deg.to_radians();
    let d_lambda = (b.lon_deg - a.lon_deg).to_radians();

    let y = d_lambda.sin() * phi_2.cos();
    let x = phi_1.cos() * phi_2.sin() - phi_1.sin() * phi_2.cos() * d_lambda.cos();

    wrap_360(y.atan2(x).to_degrees())
}

/// Project `point` onto the segment from `start` to `end`.
///
/// The parametric position along the segment is clamped to [0, 1], so points beyond either end
/// project onto that end. A degenerate segment (`start == end`) projects onto `start`.
pub fn project_onto_segment(point: &Coordinate, start: &Coordinate, end: &Coordinate) -> Coordinate {
    let a = to_vec(start);
    let ab = to_vec(end) - a;
    let ap = to_vec(point) - a;

    let ab_sq = ab.norm_squared();

    if ab_sq == 0.0 {
        return *start;
    }

    let t = util::maths::clamp(ap.dot(&ab) / ab_sq, 0.0, 1.0);

    from_vec(&(a + ab * t))
}

/// Distance from `point` to the closest point on the segment from `start` to `end`.
///
/// Units: meters
pub fn point_to_segment_distance(point: &Coordinate, start: &Coordinate, end: &Coordinate) -> f64 {
    distance(point, &project_onto_segment(point, start, end))
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn to_vec(c: &Coordinate) -> Vector2<f64> {
    Vector2::new(c.lat_deg, c.lon_deg)
}

fn from_vec(v: &Vector2<f64>) -> Coordinate {
    Coordinate::new(v[0], v[1])
}

#[cfg(test)]
mod test {
    use super::*;

    /// Length of one degree of arc at the mean earth radius
    const ONE_DEG_M: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

    #[test]
    fn test_distance() {
        let a = Coordinate::new(43.7853, -79.1884);
        let b = Coordinate::new(43.7841, -79.1870);

        // Symmetric and zero on identical points
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &a), 0.0);
        assert!(distance(&a, &b) > 0.0);

        // One degree of latitude along a meridian
        let d = distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(1.0, 0.0));
        assert!((d - ONE_DEG_M).abs() < 1e-6);

        // Antipodal points are half the circumference apart
        let d = distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 180.0));
        assert!((d - 180.0 * ONE_DEG_M).abs() < 1e-3);
    }

    #[test]
    fn test_bearing() {
        let origin = Coordinate::new(0.0, 0.0);

        assert!((bearing(&origin, &Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(&origin, &Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
        assert_eq!(bearing(&origin, &origin), 0.0);

        // Always in range
        let b = bearing(&Coordinate::new(10.0, 10.0), &Coordinate::new(9.0, 9.99999));
        assert!(b >= 0.0 && b < 360.0);
    }

    #[test]
    fn test_project_onto_segment() {
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.0, 0.001);

        // Perpendicular foot lies inside the segment
        let p = project_onto_segment(&Coordinate::new(0.0005, 0.0004), &start, &end);
        assert!((p.lat_deg - 0.0).abs() < 1e-12);
        assert!((p.lon_deg - 0.0004).abs() < 1e-12);

        // Beyond either end clamps to that end
        assert_eq!(project_onto_segment(&Coordinate::new(0.0, -0.01), &start, &end), start);
        assert_eq!(project_onto_segment(&Coordinate::new(0.0, 0.01), &start, &end), end);

        // Degenerate segments project onto the start
        let p = Coordinate::new(0.001, 0.001);
        assert_eq!(project_onto_segment(&p, &start, &start), start);
    }

    #[test]
    fn test_point_to_segment_distance() {
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.001, 0.0);
        let p = Coordinate::new(0.0005, 0.0009);

        // A degenerate segment is the distance to its start
        assert_eq!(point_to_segment_distance(&p, &start, &start), distance(&p, &start));

        // Perpendicular distance from a meridian segment at the equator
        let d = point_to_segment_distance(&p, &start, &end);
        assert!((d - 0.0009 * ONE_DEG_M).abs() < 1e-3);

        // Points on the segment are on the route
        let on = Coordinate::new(0.0004, 0.0);
        assert!(point_to_segment_distance(&on, &start, &end) < 1e-6);
    }
}

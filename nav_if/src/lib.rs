//! # Navigation interface crate.
//!
//! Provides the data types exchanged between the route-tracking core and its
//! collaborators: the directions service which produces [`route::RouteData`] and the location
//! service which pushes [`fix::PositionFix`]es.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Geographic coordinates
pub mod coord;

/// Position fixes from the location service
pub mod fix;

/// Translation of vendor maneuver strings into turn sides
pub mod maneuver;

/// Encoded polyline decoding
pub mod polyline;

/// Route documents produced by the directions service
pub mod route;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use coord::Coordinate;
pub use fix::PositionFix;
pub use maneuver::TurnSide;
pub use route::{Polyline, RouteData, RouteError, RouteStep, RouteSummary};

//! # Navigation library.
//!
//! This library contains the real-time route tracking core, and allows other crates in the
//! workspace to access items defined inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Clock sources - provides the current time to the controller
pub mod clock;

/// Geodesy primitives - distances, bearings and segment projection on the earth's surface
pub mod geodesy;

/// Navigation control module - orchestrates the tracking core for each position fix
pub mod nav_ctrl;

/// Off-route detection and the reroute cooldown gate
pub mod off_route;

/// Progress along the route and arrival time estimation
pub mod progress;

/// Route geometry - the decoded route and projection onto it
pub mod route;

/// GPS smoothing - moving average filter over recent fixes
pub mod smoothing;

/// Step tracking - which maneuver is next and when to announce it
pub mod steps;

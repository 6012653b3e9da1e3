//! # Off-route detection
//!
//! The user is off-route when they are further than a threshold from the route centerline. When
//! that happens a reroute may be requested, at most once per cooldown period.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};
use log::info;
use thiserror::Error;

use nav_if::{Coordinate, RouteData};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can calculate a new route from the user's position to the destination.
pub trait Rerouter {
    fn request_reroute(&mut self, from: &Coordinate, route: &RouteData) -> Result<(), RerouteError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Limits how often reroutes can be requested.
#[derive(Debug, Clone)]
pub struct RerouteGate {
    cooldown: Duration,
    last: Option<DateTime<Utc>>,
}

/// A rerouter which only logs the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRerouter;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RerouteError {
    #[error("The directions service could not be reached: {0}")]
    ServiceUnavailable(String),

    #[error("No route could be found from {0}")]
    NoRouteFound(Coordinate),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if the distance to the route is strictly greater than the threshold.
pub fn is_off_route(distance_to_route_m: f64, threshold_m: f64) -> bool {
    distance_to_route_m > threshold_m
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RerouteGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Attempt to trigger a reroute at `now`.
    ///
    /// Returns true if no reroute has been triggered yet, or if strictly more than the cooldown
    /// has passed since the last one. Attempts inside the cooldown are dropped.
    pub fn try_trigger(&mut self, now: DateTime<Utc>) -> bool {
        let open = match self.last {
            Some(last) => now - last > self.cooldown,
            None => true,
        };

        if open {
            self.last = Some(now);
        }

        open
    }

    /// Forget the last trigger time.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_triggered(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

impl Rerouter for LogRerouter {
    fn request_reroute(&mut self, from: &Coordinate, route: &RouteData) -> Result<(), RerouteError> {
        info!(
            "Reroute requested from {} to {}",
            from, route.summary.destination_name
        );
        Ok(())
    }
}

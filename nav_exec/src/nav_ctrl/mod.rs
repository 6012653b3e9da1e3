//! # Navigation control module
//!
//! Navigation control runs the tracking core for a single navigation session. On each position
//! fix it:
//!
//! - Validates the fix, dropping it if the position is invalid
//! - Smooths the position with a moving average
//! - Projects the smoothed position onto the route to find progress and ETA
//! - Checks whether the user is off the route, requesting a reroute if so
//! - Updates the step state machine
//! - Publishes the new state, then any events, to subscribers
//!
//! Sessions are explicitly started with a route and end either when `stop` is called, the stop
//! handle is raised, or the destination is reached.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod events;
mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use events::*;
pub use params::*;
pub use state::*;

use nav_if::RouteError;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("The route cannot be navigated: {0}")]
    Route(RouteError),

    #[error("Invalid navigation parameters: {0}")]
    Params(ParamsError),
}

//! Navigation events and subscriber management

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
};

use log::warn;
use serde::Serialize;

use nav_if::{Coordinate, TurnSide};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Identifies a subscription so that it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ListenerId(pub(crate) u64);

/// A set of subscribers to values of type `T`.
pub(crate) struct Listeners<T> {
    entries: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Notifications raised during a navigation session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NavEvent {
    /// A session has started towards the destination
    NavigationStarted { destination: String },

    /// The user reached a step's trigger point
    StepReached {
        step_index: usize,
        side: TurnSide,
        instruction: String,

        /// Bearing from the user to the end of the step
        bearing_deg: f64,
    },

    /// The user is approaching a turn
    PrepareToTurn {
        step_index: usize,
        side: TurnSide,
        distance_m: f64,
        instruction: String,
    },

    /// The user has just left the route
    OffRoute { distance_m: f64 },

    /// The user has returned to the route
    BackOnRoute,

    /// A new route should be calculated from the given position
    RerouteNeeded { from: Coordinate },

    /// The request for a new route failed, tracking continues on the current route
    RerouteFailed { reason: String },

    /// The final step was reached
    DestinationReached { destination: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Listeners<T> {
    pub(crate) fn add(&mut self, id: ListenerId, listener: Box<dyn FnMut(&T)>) {
        self.entries.push((id, listener));
    }

    /// Remove the listener, returning true if it was present.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        self.entries.len() != len
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Call every listener with the value, in subscription order.
    ///
    /// A listener which panics is logged and skipped, the remaining listeners are still called.
    pub(crate) fn notify(&mut self, value: &T) {
        for (id, listener) in self.entries.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| listener(value))).is_err() {
                warn!("Listener {:?} panicked while being notified", id);
            }
        }
    }
}

impl fmt::Display for NavEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavEvent::NavigationStarted { destination } => {
                write!(f, "Navigation started to {}", destination)
            }
            NavEvent::StepReached {
                step_index,
                side,
                instruction,
                bearing_deg,
            } => {
                if side.is_turn() {
                    write!(
                        f,
                        "Step {}: Turn {}, {} (Bearing: {:.0}°)",
                        step_index, side, instruction, bearing_deg
                    )
                } else {
                    write!(f, "Step {}: {}", step_index, instruction)
                }
            }
            NavEvent::PrepareToTurn {
                side,
                distance_m,
                instruction,
                ..
            } => write!(
                f,
                "Prepare to turn {}: In {:.0}m, {}",
                side, distance_m, instruction
            ),
            NavEvent::OffRoute { distance_m } => {
                write!(f, "Off route by {:.0}m", distance_m)
            }
            NavEvent::BackOnRoute => write!(f, "Back on route"),
            NavEvent::RerouteNeeded { from } => write!(f, "Rerouting from {}", from),
            NavEvent::RerouteFailed { reason } => write!(f, "Rerouting failed: {}", reason),
            NavEvent::DestinationReached { destination } => {
                write!(f, "You have arrived at {}", destination)
            }
        }
    }
}

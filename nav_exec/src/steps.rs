//! # Step tracking
//!
//! Tracks which step of the route the user is on. A step is reached when the user comes within
//! the proximity threshold of its trigger point, at which point the tracker advances to the next
//! step. Each step can only be reached once.
//!
//! Independently of advancing, the step after the current one is checked on every update so that
//! the user can be warned of an upcoming turn before they reach it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::{geodesy, nav_ctrl::NavParams};
use nav_if::{Coordinate, RouteStep};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Step state machine.
#[derive(Debug, Clone, Default)]
pub struct StepTracker {
    current_step_index: usize,
    completed: HashSet<usize>,
}

/// The result of one tracker update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepUpdate {
    /// The step reached during this update, if any
    pub reached: Option<ReachedStep>,

    /// The step after the one current at the start of the update, if there is one
    pub next_step: Option<NextStep>,

    /// True if the user should be warned about the next step's turn
    pub prepare_to_turn: bool,

    /// True if every step has been reached
    pub arrived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReachedStep {
    pub step_index: usize,

    /// Bearing from the user to the end of the reached step
    ///
    /// Units: degrees
    pub bearing_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NextStep {
    pub step_index: usize,

    /// Distance from the user to the step's trigger point
    ///
    /// Units: meters
    pub distance_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the step the user is currently on. Equal to the number of steps once the
    /// destination has been reached.
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn is_completed(&self, step_index: usize) -> bool {
        self.completed.contains(&step_index)
    }

    /// Update the tracker with a new position.
    pub fn update(
        &mut self,
        position: &Coordinate,
        steps: &[RouteStep],
        params: &NavParams,
    ) -> StepUpdate {
        let mut update = StepUpdate::default();

        let index = self.current_step_index;

        let current = match steps.get(index) {
            Some(s) => s,
            None => {
                update.arrived = true;
                return update;
            }
        };

        // ---- ADVANCEMENT ----

        let distance_to_trigger_m = geodesy::distance(position, &current.trigger_at);

        if distance_to_trigger_m <= params.proximity_threshold_m && self.completed.insert(index) {
            self.current_step_index += 1;

            debug!(
                "Reached step {} ({:.1} m from trigger), now on step {}",
                index, distance_to_trigger_m, self.current_step_index
            );

            update.reached = Some(ReachedStep {
                step_index: index,
                bearing_deg: geodesy::bearing(position, &current.end),
            });
        }

        // ---- LOOKAHEAD ----

        // Uses the step which was current when the update began
        if let Some(next) = steps.get(index + 1) {
            let distance_m = geodesy::distance(position, &next.trigger_at);

            update.next_step = Some(NextStep {
                step_index: index + 1,
                distance_m,
            });

            update.prepare_to_turn = distance_m <= params.turn_warning_distance_m
                && distance_m > params.proximity_threshold_m
                && next.side.is_turn();
        }

        update.arrived = self.current_step_index >= steps.len();

        update
    }

    /// Return to the first step and forget all completed steps.
    pub fn reset(&mut self) {
        self.current_step_index = 0;
        self.completed.clear();
    }
}

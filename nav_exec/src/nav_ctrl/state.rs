//! Implementations for the NavCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError},
        Arc,
    },
    time::Duration,
};

use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{events::Listeners, ListenerId, NavCtrlError, NavEvent, NavParams};
use crate::{
    clock::{Clock, SystemClock},
    off_route::{is_off_route, LogRerouter, RerouteGate, Rerouter},
    progress::{compute_eta, compute_progress, Eta},
    route::RouteGeometry,
    smoothing::GpsSmoother,
    steps::StepTracker,
};
use nav_if::{Coordinate, PositionFix, RouteData, RouteStep};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// How often `run` checks the stop handle while waiting for a fix.
const RUN_POLL_PERIOD: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Navigation control module state
pub struct NavCtrl {
    params: NavParams,

    clock: Box<dyn Clock>,
    rerouter: Box<dyn Rerouter>,

    route: Option<RouteData>,
    geometry: RouteGeometry,

    state: NavigationState,

    smoother: GpsSmoother,
    step_tracker: StepTracker,
    reroute_gate: RerouteGate,

    stop_handle: StopHandle,

    state_listeners: Listeners<NavigationState>,
    event_listeners: Listeners<NavEvent>,
    next_listener_id: u64,
}

/// The state of a navigation session, published to subscribers after every fix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavigationState {
    /// The most recent accepted fix
    pub last_fix: Option<PositionFix>,

    /// The position after smoothing
    pub smoothed_position: Option<Coordinate>,

    /// Index of the current step, equal to the number of steps on arrival
    pub current_step_index: usize,

    /// Fraction of the route completed, in [0, 1]
    pub route_progress: f64,

    pub is_navigating: bool,

    /// The step after the current one, if there is one
    pub next_turn: Option<RouteStep>,

    /// Units: meters
    pub distance_to_next_turn_m: f64,

    /// Units: meters
    pub distance_to_route_m: f64,

    pub is_off_route: bool,

    /// Units: meters/second
    pub current_speed_ms: f64,

    pub eta: Eta,

    /// Units: meters
    pub remaining_distance_m: f64,
}

/// Summary of the processing of one fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// True if the fix was used to update the state
    pub processed: bool,

    /// True if the fix was dropped because its position was invalid
    pub fix_invalid: bool,

    pub off_route: bool,

    /// True if a reroute was requested on this fix
    pub reroute_triggered: bool,

    /// True if a step was reached on this fix
    pub step_reached: bool,

    pub arrived: bool,

    /// Number of events dispatched
    pub num_events: usize,
}

/// A handle which stops a navigation session when raised.
///
/// Handles can be cloned and sent to other threads, or captured by subscribers.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl StopHandle {
    /// Request that the session stops
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn lower(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl NavCtrl {
    /// Create a new controller with the given parameters.
    ///
    /// The controller uses the system clock and a rerouter which only logs requests, these can
    /// be replaced with `with_clock` and `with_rerouter`.
    pub fn new(params: NavParams) -> Result<Self, NavCtrlError> {
        params.validate().map_err(NavCtrlError::Params)?;

        Ok(Self {
            smoother: GpsSmoother::new(params.smoothing_window),
            reroute_gate: RerouteGate::new(params.reroute_cooldown()),
            params,
            clock: Box::new(SystemClock),
            rerouter: Box::new(LogRerouter),
            route: None,
            geometry: RouteGeometry::new_empty(),
            state: NavigationState::default(),
            step_tracker: StepTracker::new(),
            stop_handle: StopHandle::default(),
            state_listeners: Listeners::default(),
            event_listeners: Listeners::default(),
            next_listener_id: 0,
        })
    }

    /// Use the given clock for reroute cooldowns.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use the given rerouter when the user goes off route.
    pub fn with_rerouter<R: Rerouter + 'static>(mut self, rerouter: R) -> Self {
        self.rerouter = Box::new(rerouter);
        self
    }

    // ---- ACCESSORS ----

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn params(&self) -> &NavParams {
        &self.params
    }

    pub fn route(&self) -> Option<&RouteData> {
        self.route.as_ref()
    }

    pub fn geometry(&self) -> &RouteGeometry {
        &self.geometry
    }

    pub fn is_navigating(&self) -> bool {
        self.state.is_navigating
    }

    /// Get a handle which can be used to stop the session from elsewhere, including from inside
    /// a subscriber.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    // ---- SUBSCRIPTIONS ----

    /// Subscribe to the state, which is published after every processed fix.
    pub fn subscribe_state<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&NavigationState) + 'static,
    {
        let id = self.new_listener_id();
        self.state_listeners.add(id, Box::new(listener));
        id
    }

    /// Subscribe to navigation events.
    pub fn subscribe_events<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&NavEvent) + 'static,
    {
        let id = self.new_listener_id();
        self.event_listeners.add(id, Box::new(listener));
        id
    }

    /// Remove a subscription, returning true if it existed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.state_listeners.remove(id) || self.event_listeners.remove(id)
    }

    // ---- SESSION ----

    /// Start navigating the given route.
    ///
    /// Any session in progress is replaced. If the route cannot be navigated an error is
    /// returned and no session is started.
    pub fn start(&mut self, route: RouteData) -> Result<(), NavCtrlError> {
        let geometry = RouteGeometry::from_route(&route).map_err(NavCtrlError::Route)?;

        if self.state.is_navigating {
            info!("Replacing the navigation session in progress");
        }

        // Reset everything from any previous session
        self.smoother = GpsSmoother::new(self.params.smoothing_window);
        self.step_tracker.reset();
        self.reroute_gate.reset();
        self.stop_handle.lower();

        let total_m = geometry.get_length().unwrap_or(0.0);

        self.state = NavigationState {
            is_navigating: true,
            remaining_distance_m: total_m,
            eta: compute_eta(total_m, 0.0, self.params.fallback_speed_ms),
            next_turn: route.steps.get(1).cloned(),
            ..Default::default()
        };

        info!(
            "Navigation started from {} to {} ({:.0} m, {} steps, {} route points)",
            route.summary.origin_name,
            route.summary.destination_name,
            total_m,
            route.steps.len(),
            geometry.get_num_points()
        );

        let event = NavEvent::NavigationStarted {
            destination: route.summary.destination_name.clone(),
        };

        self.geometry = geometry;
        self.route = Some(route);

        self.state_listeners.notify(&self.state);
        self.event_listeners.notify(&event);

        Ok(())
    }

    /// Process a new position fix.
    pub fn on_fix(&mut self, fix: &PositionFix) -> StatusReport {
        let mut report = StatusReport::default();

        if self.stop_handle.is_raised() {
            self.stop();
            return report;
        }

        if !self.state.is_navigating {
            return report;
        }

        if !fix.is_valid() {
            warn!(
                "Dropping invalid fix ({}, {})",
                fix.lat_deg, fix.lon_deg
            );
            report.fix_invalid = true;
            return report;
        }

        let route = match self.route {
            Some(ref r) => r,
            None => return report,
        };

        let mut events: Vec<NavEvent> = Vec::new();

        // ---- SMOOTHING ----

        let position = self.smoother.smooth(fix);

        self.state.last_fix = Some(fix.clone());
        self.state.smoothed_position = Some(position);
        self.state.current_speed_ms = fix.known_speed_ms().unwrap_or(0.0);

        // ---- PROGRESS ----

        let progress = compute_progress(&position, &self.geometry);

        self.state.route_progress = progress.progress_percentage / 100.0;
        self.state.remaining_distance_m = progress.remaining_distance_m;
        self.state.distance_to_route_m = progress.distance_to_route_m;
        self.state.eta = compute_eta(
            progress.remaining_distance_m,
            self.state.current_speed_ms,
            self.params.fallback_speed_ms,
        );

        trace!(
            "Fix {} smoothed to {}: segment {}, {:.1} m from route, {:.1}% complete, {:.0} m \
            remaining, ETA {}",
            fix.coordinate(),
            position,
            progress.segment_index,
            progress.distance_to_route_m,
            progress.progress_percentage,
            progress.remaining_distance_m,
            self.state.eta.formatted
        );

        // ---- OFF ROUTE ----

        let off_route = is_off_route(
            progress.distance_to_route_m,
            self.params.off_route_threshold_m,
        );

        if off_route && !self.state.is_off_route {
            warn!(
                "Off route, {:.1} m from the route",
                progress.distance_to_route_m
            );
            events.push(NavEvent::OffRoute {
                distance_m: progress.distance_to_route_m,
            });
        } else if !off_route && self.state.is_off_route {
            info!("Back on route");
            events.push(NavEvent::BackOnRoute);
        }

        self.state.is_off_route = off_route;
        report.off_route = off_route;

        if off_route && self.reroute_gate.try_trigger(self.clock.now()) {
            report.reroute_triggered = true;
            events.push(NavEvent::RerouteNeeded { from: position });

            if let Err(e) = self.rerouter.request_reroute(&position, route) {
                warn!("Reroute failed, continuing on the current route: {}", e);
                events.push(NavEvent::RerouteFailed {
                    reason: e.to_string(),
                });
            }
        }

        // A stop raised during processing takes effect before the steps can change
        if self.stop_handle.is_raised() {
            report.num_events = events.len();
            self.dispatch(&events);
            self.stop();
            return report;
        }

        // ---- STEPS ----

        let update = self
            .step_tracker
            .update(&position, &route.steps, &self.params);

        self.state.current_step_index = self.step_tracker.current_step_index();

        if let Some(reached) = update.reached {
            report.step_reached = true;

            if let Some(step) = route.steps.get(reached.step_index) {
                events.push(NavEvent::StepReached {
                    step_index: reached.step_index,
                    side: step.side,
                    instruction: step.instruction_text(),
                    bearing_deg: reached.bearing_deg,
                });
            }
        }

        match update.next_step {
            Some(next) => {
                self.state.next_turn = route.steps.get(next.step_index).cloned();
                self.state.distance_to_next_turn_m = next.distance_m;

                if update.prepare_to_turn {
                    if let Some(step) = route.steps.get(next.step_index) {
                        events.push(NavEvent::PrepareToTurn {
                            step_index: next.step_index,
                            side: step.side,
                            distance_m: next.distance_m,
                            instruction: step.instruction_text(),
                        });
                    }
                }
            }
            None => {
                self.state.next_turn = None;
                self.state.distance_to_next_turn_m = 0.0;
            }
        }

        if update.arrived {
            info!("Destination reached");

            self.state.route_progress = 1.0;
            self.state.remaining_distance_m = 0.0;
            self.state.eta = compute_eta(
                0.0,
                self.state.current_speed_ms,
                self.params.fallback_speed_ms,
            );

            events.push(NavEvent::DestinationReached {
                destination: route.summary.destination_name.clone(),
            });
            report.arrived = true;
        }

        // ---- PUBLISH ----

        report.processed = true;
        report.num_events = events.len();

        self.state_listeners.notify(&self.state);
        self.dispatch(&events);

        if report.arrived {
            self.stop();
        }

        report
    }

    /// Stop the session.
    ///
    /// Stopping a session which isn't navigating has no effect.
    pub fn stop(&mut self) {
        if !self.state.is_navigating {
            return;
        }

        self.smoother.clear();
        self.step_tracker.reset();
        self.reroute_gate.reset();

        self.state.is_navigating = false;
        self.state.is_off_route = false;
        self.state.distance_to_route_m = 0.0;

        info!("Navigation stopped");

        self.state_listeners.notify(&self.state);
    }

    /// Process fixes from the receiver until the session stops or the sender is dropped.
    ///
    /// Returns the number of fixes which were processed.
    pub fn run(&mut self, fixes: &Receiver<PositionFix>) -> usize {
        let mut num_processed = 0;

        loop {
            if self.stop_handle.is_raised() {
                self.stop();
            }

            if !self.state.is_navigating {
                break;
            }

            match fixes.recv_timeout(RUN_POLL_PERIOD) {
                Ok(fix) => {
                    if self.on_fix(&fix).processed {
                        num_processed += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Fix stream closed");
                    break;
                }
            }
        }

        num_processed
    }

    // ---- PRIVATE ----

    fn new_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        id
    }

    fn dispatch(&mut self, events: &[NavEvent]) {
        for e in events {
            self.event_listeners.notify(e);
        }
    }
}

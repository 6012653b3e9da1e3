//! Navigation replay executable entry point.
//!
//! # Architecture
//!
//! The executable replays a script of position fixes against a route, exercising the tracking
//! core exactly as a live location stream would:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the route and save a copy into the session
//!     - Start navigation control
//!     - Replay loop:
//!         - Acquire the fixes which are due from the script
//!         - Move the script clock to the fix time
//!         - Process each fix in navigation control
//!         - Archive the published state
//!     - Stop navigation and exit the session
//!
//! Fixes are replayed as fast as possible unless `--realtime` is given, in which case they are
//! paced by the script timestamps.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::{path::PathBuf, thread, time::Duration};
use structopt::StructOpt;

// Internal
use nav_if::RouteData;
use nav_lib::{
    clock::{Clock, ManualClock},
    nav_ctrl::{NavCtrl, NavEvent, NavParams, NavigationState},
};
use util::{
    archive::Archiver,
    fix_script::{FixScript, PendingFixes},
    logger::{logger_init, LevelFilter},
    session::{self, Session},
    time::{duration_to_seconds, seconds_to_duration},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Sleep between checks for pending fixes in realtime mode.
const REALTIME_POLL_PERIOD: Duration = Duration::from_millis(10);

/// Log target of the per-fix processing in the navigation controller.
const FIX_LOG_TARGET: &str = "nav_lib::nav_ctrl::state";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Replay a script of position fixes against a route.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opts {
    /// Path to the route document (JSON)
    #[structopt(parse(from_os_str))]
    route: PathBuf,

    /// Path to the fix script
    #[structopt(parse(from_os_str))]
    fixes: PathBuf,

    /// Parameter file relative to `$NAV_SW_ROOT/params`. Defaults are used if not given.
    #[structopt(short, long)]
    params: Option<String>,

    /// Pace the replay by the script timestamps instead of replaying as fast as possible
    #[structopt(long)]
    realtime: bool,

    /// Minimum log level, one of `info`, `debug` or `trace`
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Log level of the per-fix processing in the navigation controller, capped by `log_level`
    #[structopt(long, default_value = "debug")]
    fix_log_level: LevelFilter,
}

/// Flattened navigation state for the CSV archive.
#[derive(Debug, Serialize)]
struct NavStateRecord {
    time_s: f64,
    fix_lat_deg: Option<f64>,
    fix_lon_deg: Option<f64>,
    smoothed_lat_deg: Option<f64>,
    smoothed_lon_deg: Option<f64>,
    current_step_index: usize,
    route_progress: f64,
    is_navigating: bool,
    is_off_route: bool,
    distance_to_route_m: f64,
    distance_to_next_turn_m: f64,
    remaining_distance_m: f64,
    current_speed_ms: f64,
    eta_s: f64,
    eta: String,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        opts.log_level,
        &[(FIX_LOG_TARGET, opts.fix_log_level)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Replay Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params = match opts.params {
        Some(ref p) => NavParams::load(p).wrap_err("Could not load the NavCtrl params")?,
        None => NavParams::default()
            .with_env_overrides()
            .wrap_err("Could not apply the NavCtrl param overrides")?,
    };

    info!("Parameters loaded: {:?}", params);

    // ---- LOAD ROUTE AND SCRIPT ----

    let route = RouteData::load_json(&opts.route)
        .wrap_err_with(|| format!("Failed to load the route from {:?}", opts.route))?;

    info!(
        "Loaded route {:?} from {} to {} with {} steps",
        route.route_id,
        route.summary.origin_name,
        route.summary.destination_name,
        route.steps.len()
    );

    session.save("route/current_route.json", route.clone());

    let mut script = FixScript::new(&opts.fixes).wrap_err("Failed to load the fix script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} fixes\n",
        script.get_duration(),
        script.get_num_fixes()
    );

    // ---- INITIALISE NAVIGATION ----

    let replay_start = Utc::now();
    let clock = ManualClock::new(replay_start);

    let mut nav_ctrl = NavCtrl::new(params)
        .wrap_err("Failed to initialise NavCtrl")?
        .with_clock(clock.clone());

    let mut arch_state = Archiver::from_path(&session, "nav_ctrl/state.csv")
        .wrap_err("Failed to create the NavCtrl state archive")?;
    let arch_clock = clock.clone();
    nav_ctrl.subscribe_state(move |state| {
        let time_s = script_time_s(arch_clock.now(), replay_start);
        if let Err(e) = arch_state.serialise(NavStateRecord::from_state(state, time_s)) {
            warn!("Could not archive the NavCtrl state: {}", e);
        }
    });

    nav_ctrl.subscribe_events(|event| match event {
        NavEvent::OffRoute { .. } | NavEvent::RerouteFailed { .. } => warn!("{}", event),
        _ => info!("{}", event),
    });

    nav_ctrl
        .start(route)
        .wrap_err("Failed to start navigation")?;

    // ---- REPLAY ----

    info!("Beginning replay\n");

    let mut num_fixes = 0usize;

    if opts.realtime {
        let start_s = session::get_elapsed_seconds();

        loop {
            let time_s = session::get_elapsed_seconds() - start_s;

            match script.get_pending_fixes(time_s) {
                PendingFixes::None => thread::sleep(REALTIME_POLL_PERIOD),
                PendingFixes::Some(fixes) => {
                    clock.set(replay_start + seconds_to_duration(time_s));
                    for fix in fixes.iter() {
                        nav_ctrl.on_fix(fix);
                        num_fixes += 1;
                    }
                }
                PendingFixes::EndOfScript => {
                    info!("End of fix script reached");
                    break;
                }
            }

            if !nav_ctrl.is_navigating() {
                break;
            }
        }
    } else {
        while let Some(scripted) = script.next_fix() {
            clock.set(replay_start + seconds_to_duration(scripted.exec_time_s));
            nav_ctrl.on_fix(&scripted.fix);
            num_fixes += 1;

            if !nav_ctrl.is_navigating() {
                break;
            }
        }
    }

    // ---- SHUTDOWN ----

    if nav_ctrl.is_navigating() {
        info!("Script finished before the destination was reached");
        nav_ctrl.stop();
    }

    let state = nav_ctrl.state();
    info!(
        "Replayed {} fixes, finished on step {} at {:.1}% progress",
        num_fixes,
        state.current_step_index,
        state.route_progress * 100.0
    );

    session.save("nav_ctrl/final_state.json", state.clone());

    session.exit();

    info!("End of execution");

    Ok(())
}

/// Time since the start of the replay on the script clock.
fn script_time_s(now: DateTime<Utc>, start: DateTime<Utc>) -> f64 {
    duration_to_seconds(now - start).unwrap_or(f64::NAN)
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl NavStateRecord {
    fn from_state(state: &NavigationState, time_s: f64) -> Self {
        Self {
            time_s,
            fix_lat_deg: state.last_fix.as_ref().map(|f| f.lat_deg),
            fix_lon_deg: state.last_fix.as_ref().map(|f| f.lon_deg),
            smoothed_lat_deg: state.smoothed_position.map(|p| p.lat_deg),
            smoothed_lon_deg: state.smoothed_position.map(|p| p.lon_deg),
            current_step_index: state.current_step_index,
            route_progress: state.route_progress,
            is_navigating: state.is_navigating,
            is_off_route: state.is_off_route,
            distance_to_route_m: state.distance_to_route_m,
            distance_to_next_turn_m: state.distance_to_next_turn_m,
            remaining_distance_m: state.remaining_distance_m,
            current_speed_ms: state.current_speed_ms,
            eta_s: state.eta.eta_s,
            eta: state.eta.formatted.clone(),
        }
    }
}

//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::fmt;

use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Stdout gets colored level tags, the session log file gets plain ones.
/// Each `(target, level)` in `target_levels` caps the level of that target
/// and everything below it, it can never raise it above `min_level`.
///
/// # Notes
///
/// - `min_level` must be `Info` or more verbose, position fix processing is
///   only visible at `Debug` and `Trace`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    target_levels: &[(&'static str, LevelFilter)],
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                render(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message,
                    true
                )
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                render(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message,
                    false
                )
            ))
        })
        .chain(log_file);

    let mut dispatch = fern::Dispatch::new().level(min_level);

    for (target, level) in target_levels {
        dispatch = dispatch.level_for(*target, (*level).min(min_level));
    }

    dispatch
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in target_levels {
        info!("    {} log level: {:?}", target, (*level).min(min_level));
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Render a single log line.
///
/// Debug and trace lines include the target, other levels don't.
fn render(
    elapsed_s: f64,
    level: log::Level,
    target: &str,
    message: &fmt::Arguments,
    colour: bool
) -> String {
    let tag = if colour {
        level_to_str(level)
    }
    else {
        level_tag(level).normal()
    };

    if level > log::Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, tag, target, message)
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, tag, message)
    }
}

/// Get the plain three letter tag of a log level
fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Get the colored representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info  => tag.normal(),
        log::Level::Warn  => tag.yellow(),
        log::Level::Error => tag.red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_plain() {
        assert_eq!(
            render(1.5, log::Level::Info, "nav_lib::nav_ctrl::state", &format_args!("Navigation stopped"), false),
            "[  1.500000 INF] Navigation stopped"
        );
        assert_eq!(
            render(0.25, log::Level::Trace, "nav_lib::nav_ctrl::state", &format_args!("Fix {}", 3), false),
            "[  0.250000 TRC] nav_lib::nav_ctrl::state: Fix 3"
        );
    }

    #[test]
    fn test_level_tags() {
        assert_eq!(level_tag(log::Level::Warn), "WRN");
        assert!(level_to_str(log::Level::Error).to_string().contains("ERR"));
    }
}

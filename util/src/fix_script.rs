//! # Position fix script interpreter
//!
//! This module provides an interpreter for fix scripts, allowing a recorded
//! or hand-written walk to be replayed into a navigation session.
//!
//! A script is a sequence of entries of the form
//!
//! ```text
//! <time_s>: <PositionFix JSON>;
//! ```
//!
//! where `time_s` is the offset from the start of the replay. Anything which
//! doesn't match this form (such as `#` comment lines) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use nav_if::PositionFix;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fix which is scripted to arrive at a specific time.
#[derive(Debug, Clone)]
pub struct ScriptedFix {
    /// The time the fix is supposed to arrive at
    pub exec_time_s: f64,

    /// The fix to deliver
    pub fix: PositionFix
}

/// A fix script interpreter.
///
/// After loading use `.get_pending_fixes` to acquire the fixes that are due
/// in realtime replays, or `.next_fix` to step through the script as fast as
/// possible.
pub struct FixScript {
    script_path: Option<PathBuf>,
    fixes: VecDeque<ScriptedFix>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    TimestampOutOfOrder(f64, f64),

    #[error("Script contains an invalid fix at {0} s: {1}")]
    InvalidFix(f64, serde_json::Error),

    #[error("Could not build the script pattern: {0}")]
    PatternError(regex::Error)
}

pub enum PendingFixes {
    None,
    Some(Vec<PositionFix>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FixScript {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::parse(&script)?;
        interp.script_path = Some(path);

        Ok(interp)
    }

    /// Parse a script held in memory.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of fixes
        let mut fix_queue: VecDeque<ScriptedFix> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::PatternError)?;

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = fix_queue.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::TimestampOutOfOrder(
                        prev.exec_time_s, exec_time_s
                    ))
                }
            }

            // Parse the fix from the payload. The scripts contain JSON only.
            let fix: PositionFix = serde_json::from_str(payload)
                .map_err(|e| ScriptError::InvalidFix(exec_time_s, e))?;

            fix_queue.push_back(ScriptedFix {
                exec_time_s,
                fix
            });
        }

        if fix_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(FixScript {
            script_path: None,
            fixes: fix_queue
        })
    }

    /// Return the fixes which are due at `current_time_s`, or `None` if no
    /// fixes are due yet.
    pub fn get_pending_fixes(&mut self, current_time_s: f64) -> PendingFixes {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.fixes.is_empty() {
            return PendingFixes::EndOfScript
        }

        let mut fix_vec: Vec<PositionFix> = vec![];

        // Pop items from the queue while the head's exec time has passed
        while let Some(head) = self.fixes.front() {
            if head.exec_time_s > current_time_s {
                break;
            }
            if let Some(f) = self.fixes.pop_front() {
                fix_vec.push(f.fix);
            }
        }

        if fix_vec.is_empty() {
            PendingFixes::None
        }
        else {
            PendingFixes::Some(fix_vec)
        }
    }

    /// Pop the next fix in the script regardless of its time.
    pub fn next_fix(&mut self) -> Option<ScriptedFix> {
        self.fixes.pop_front()
    }

    /// Get the number of fixes remaining in the script
    pub fn get_num_fixes(&self) -> usize {
        self.fixes.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.fixes.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    /// The path the script was loaded from, if it was loaded from a file
    pub fn get_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
# Walk north along the test route
0.0: {"latitude": 0.0, "longitude": 0.0, "accuracy": 5.0};
1.0: {"latitude": 0.0001, "longitude": 0.0, "speed": 1.4};
  2.5 : {"lat": 0.0002, "lng": 0.0};
"#;

    #[test]
    fn test_parse_script() {
        let mut script = FixScript::parse(SCRIPT).unwrap();

        assert_eq!(script.get_num_fixes(), 3);
        assert_eq!(script.get_duration(), 2.5);
        assert!(script.get_path().is_none());

        let first = script.next_fix().unwrap();
        assert_eq!(first.exec_time_s, 0.0);
        assert_eq!(first.fix.accuracy_m, 5.0);

        let second = script.next_fix().unwrap();
        assert_eq!(second.fix.known_speed_ms(), Some(1.4));
    }

    #[test]
    fn test_pending_fixes() {
        let mut script = FixScript::parse(SCRIPT).unwrap();

        match script.get_pending_fixes(1.2) {
            PendingFixes::Some(f) => assert_eq!(f.len(), 2),
            _ => panic!("Expected two pending fixes")
        }
        assert!(matches!(script.get_pending_fixes(2.0), PendingFixes::None));
        match script.get_pending_fixes(3.0) {
            PendingFixes::Some(f) => assert_eq!(f[0].lat_deg, 0.0002),
            _ => panic!("Expected the final fix")
        }
        assert!(matches!(script.get_pending_fixes(4.0), PendingFixes::EndOfScript));
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            FixScript::parse("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            FixScript::parse("1.0: {\"latitude\": 1.0};"),
            Err(ScriptError::InvalidFix(_, _))
        ));
        assert!(matches!(
            FixScript::parse(
                "2.0: {\"latitude\": 0, \"longitude\": 0};\n\
                 1.0: {\"latitude\": 0, \"longitude\": 0};"
            ),
            Err(ScriptError::TimestampOutOfOrder(_, _))
        ));
        assert!(matches!(
            FixScript::new("/definitely/not/a/script.fixes"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}

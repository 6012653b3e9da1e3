//! # Clock sources
//!
//! The controller reads wall-clock time through the [`Clock`] trait so that cooldowns can be
//! driven by a replay script or a test instead of the system clock.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::Cell, rc::Rc};

use chrono::{DateTime, Duration, Utc};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The system's real time clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

/// A clock which only moves when told to.
///
/// Clones share the same time, so a handle can be kept to advance a clock that has been given to
/// the controller.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Set the current time
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Move the clock forward by the given duration
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

//! Countdown to the next automatic scan
//!
//! Holds the last known next-scan instant and derives the remaining time from
//! the clock on every tick. Polls that report the same instant (or one within
//! `tolerance`) leave the countdown alone, so the tick source is only replaced
//! when the backend has actually scheduled a new scan.

use chrono::{DateTime, Duration, Utc};

use crate::render::format_countdown;

pub const NOT_SCHEDULED: &str = "not scheduled";

/// What an observed next-scan value did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownChange {
    Unchanged,
    /// New target installed; the tick source must be replaced
    Replaced,
    /// Backend no longer reports a next scan
    Cleared,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    target: Option<DateTime<Utc>>,
    running: bool,
    tolerance: Duration,
}

impl Countdown {
    pub fn new(tolerance: Duration) -> Self {
        Self {
            target: None,
            running: false,
            tolerance,
        }
    }

    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.target
    }

    /// Whether the countdown still needs a tick source
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed in the next-scan value of a freshly applied snapshot
    pub fn observe(&mut self, next_scan: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CountdownChange {
        match (self.target, next_scan) {
            (Some(current), Some(new)) if (new - current).abs() <= self.tolerance => {
                CountdownChange::Unchanged
            }
            (_, Some(new)) => {
                self.target = Some(new);
                self.running = remaining_secs(new, now) > 0;
                CountdownChange::Replaced
            }
            (Some(_), None) => {
                self.target = None;
                self.running = false;
                CountdownChange::Cleared
            }
            (None, None) => CountdownChange::Unchanged,
        }
    }

    /// One tick of the tick source; stops the countdown once it reaches zero
    pub fn tick(&mut self, now: DateTime<Utc>) -> String {
        if let Some(target) = self.target {
            if remaining_secs(target, now) <= 0 {
                self.running = false;
            }
        }
        self.display(now)
    }

    pub fn display(&self, now: DateTime<Utc>) -> String {
        match self.target {
            Some(target) => format_countdown(remaining_secs(target, now)),
            None => NOT_SCHEDULED.to_string(),
        }
    }
}

/// Whole seconds left, rounded up so a fresh countdown shows its full value
fn remaining_secs(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + 999) / 1000
    }
}

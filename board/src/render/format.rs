//! Timestamp and duration formatting

use chrono::{DateTime, Local, Utc};

pub const DUE_NOW: &str = "due now";
pub const JUST_NOW: &str = "just now";

/// How timestamps in the table are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeMode {
    #[default]
    Relative,
    Absolute,
}

impl std::fmt::Display for TimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeMode::Relative => write!(f, "relative"),
            TimeMode::Absolute => write!(f, "absolute"),
        }
    }
}

impl std::str::FromStr for TimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relative" | "rel" => Ok(TimeMode::Relative),
            "absolute" | "abs" => Ok(TimeMode::Absolute),
            _ => Err(format!("Unknown time mode: {} (valid: relative, absolute)", s)),
        }
    }
}

fn unit(count: i64, name: &str) -> String {
    format!("{} {}{}", count, name, if count == 1 { "" } else { "s" })
}

/// Larger unit plus the remainder in the next smaller unit, dropping a zero remainder
fn with_remainder(count: i64, name: &str, rest: i64, rest_name: &str) -> String {
    if rest == 0 {
        unit(count, name)
    } else {
        format!("{} {}", unit(count, name), unit(rest, rest_name))
    }
}

/// Local date-time
pub fn format_absolute(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Elapsed time since `instant`, bucketed from "just now" up to a calendar
/// date beyond 30 days
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - instant).num_seconds();
    if secs < 60 {
        return JUST_NOW.to_string();
    }

    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let elapsed = if minutes < 10 {
        with_remainder(minutes, "minute", secs % 60, "second")
    } else if minutes < 60 {
        unit(minutes, "minute")
    } else if hours < 10 {
        with_remainder(hours, "hour", minutes % 60, "minute")
    } else if hours < 24 {
        unit(hours, "hour")
    } else if days < 10 {
        with_remainder(days, "day", hours % 24, "hour")
    } else if days < 30 {
        unit(days, "day")
    } else {
        return instant.with_timezone(&Local).format("%Y-%m-%d").to_string();
    };

    format!("{} ago", elapsed)
}

/// Format an optional timestamp, using `missing` when absent
pub fn format_timestamp(
    instant: Option<DateTime<Utc>>,
    mode: TimeMode,
    now: DateTime<Utc>,
    missing: &str,
) -> String {
    match (instant, mode) {
        (None, _) => missing.to_string(),
        (Some(instant), TimeMode::Relative) => format_relative(instant, now),
        (Some(instant), TimeMode::Absolute) => format_absolute(instant),
    }
}

/// Remaining time until the next scan, e.g. "1 minute 30 seconds"
pub fn format_countdown(remaining_secs: i64) -> String {
    if remaining_secs <= 0 {
        return DUE_NOW.to_string();
    }

    let hours = remaining_secs / 3600;
    let minutes = (remaining_secs % 3600) / 60;
    let seconds = remaining_secs % 60;

    if hours > 0 {
        with_remainder(hours, "hour", minutes, "minute")
    } else if minutes > 0 {
        with_remainder(minutes, "minute", seconds, "second")
    } else {
        unit(seconds, "second")
    }
}

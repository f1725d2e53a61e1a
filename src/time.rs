//! Conversions between `HH:MM` clock strings and minutes since midnight,
//! plus the interval and pixel geometry helpers built on them.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;
pub const DEFAULT_GRID_MINUTES: u32 = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("malformed time '{0}', expected HH:MM")]
    Malformed(String),
    #[error("time '{0}' is outside 00:00..=24:00")]
    OutOfRange(String),
}

/// Parses `H:MM` or `HH:MM` into minutes since midnight.
///
/// `24:00` is accepted so that an entry can end at the close of the day.
pub fn minutes_from_midnight(value: &str) -> Result<u32, TimeError> {
    let malformed = || TimeError::Malformed(value.to_string());

    let (hours_raw, minutes_raw) = value.split_once(':').ok_or_else(malformed)?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(hours_raw) || hours_raw.len() > 2 {
        return Err(malformed());
    }
    if !is_digits(minutes_raw) || minutes_raw.len() != 2 {
        return Err(malformed());
    }

    let hours: u32 = hours_raw.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes_raw.parse().map_err(|_| malformed())?;

    if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(TimeError::OutOfRange(value.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Zero-padded inverse of [`minutes_from_midnight`].
pub fn time_from_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Strict open-interval overlap: touching endpoints do not overlap.
pub fn overlaps(start_a: u32, end_a: u32, start_b: u32, end_b: u32) -> bool {
    start_a < end_b && start_b < end_a
}

/// Rounds to the nearest multiple of `grid_size`, halves rounding up.
/// A zero grid leaves the value untouched.
pub fn snap_to_grid(minutes: u32, grid_size: u32) -> u32 {
    if grid_size == 0 {
        return minutes;
    }
    (minutes + grid_size / 2) / grid_size * grid_size
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub top: f64,
    pub height: f64,
}

pub fn position(
    start_time: &str,
    duration_minutes: u32,
    day_start_hour: u32,
    pixels_per_minute: f64,
) -> Result<Position, TimeError> {
    let start = minutes_from_midnight(start_time)? as f64;
    let day_start = (day_start_hour * 60) as f64;

    Ok(Position {
        top: (start - day_start) * pixels_per_minute,
        height: duration_minutes as f64 * pixels_per_minute,
    })
}

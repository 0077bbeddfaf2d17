use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::LookbackBand;

const SECONDS_PER_HOUR: i64 = 3600;

/// A one-hour query window, `[start, start + 1h]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + TimeDelta::hours(1),
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start: {}, end: {}", self.start, self.end)
    }
}

/// Plans the hourly windows to search, anchored to the top of the current
/// hour.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowPlanner {
    band: LookbackBand,
}

impl WindowPlanner {
    pub fn new(band: LookbackBand) -> Self {
        Self { band }
    }

    /// The windows of the lookback band, newest first. With the default
    /// band and `now` within hour H these start at H-14 through H-23.
    pub fn windows(&self, now: DateTime<Utc>) -> Vec<Window> {
        let top_of_hour = now.timestamp().div_euclid(SECONDS_PER_HOUR) * SECONDS_PER_HOUR;

        (self.band.newest_hours_ago..=self.band.oldest_hours_ago)
            .filter_map(|hours_ago| {
                let start = top_of_hour - i64::from(hours_ago) * SECONDS_PER_HOUR;
                DateTime::from_timestamp(start, 0).map(Window::starting_at)
            })
            .collect()
    }
}

//! The divergence detector: check that a histogram's `_count` aggregate and
//! its `+Inf` bucket aggregate agree.
//!
//! Both aggregates count every observation, so under correct bucketing the
//! two are equal at every timestamp. The detector searches the hourly
//! windows of the lookback band, newest first, and reports the first
//! timestamp at which they are not.

mod fetch;
mod search;
mod window;

use std::fmt;

use chrono::{DateTime, Utc};
use histaudit_core::{ReadClient, Result};
use serde::Serialize;
use tracing::{debug, info};

pub use fetch::{count_query, inf_bucket_query, AggregateFetcher, TimestampValueMap};
pub use search::{find_divergence, Divergence};
pub use window::{Window, WindowPlanner};

use crate::metrics::{DIVERGENCES, WINDOWS_SEARCHED};
use crate::LookbackBand;

/// The first divergence found for a histogram base.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DivergenceReport {
    pub base: String,
    pub window: Window,
    pub timestamp_ms: i64,
    /// Value of the `_count` aggregate at the timestamp.
    pub count: f64,
    /// Value of the `+Inf` bucket aggregate at the timestamp.
    pub inf_bucket: f64,
}

impl DivergenceReport {
    /// The divergent timestamp, if it is representable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp() {
            Some(ts) => writeln!(f, "Found! {} at {}", self.base, ts)?,
            None => writeln!(f, "Found! {} at {}ms", self.base, self.timestamp_ms)?,
        }
        writeln!(
            f,
            "count = {}, +Inf bucket = {}",
            self.count, self.inf_bucket
        )?;
        writeln!(
            f,
            r#"sum({{__aggregation__="{}_bucket:sum:counter",le="+Inf"}})"#,
            self.base
        )?;
        writeln!(
            f,
            r#"sum({{__aggregation__="{}_count:sum:counter"}})"#,
            self.base
        )?;
        write!(f, "Start: {}, End: {}", self.window.start, self.window.end)
    }
}

/// Searches the lookback band for divergent histogram aggregates.
pub struct DivergenceDetector<'a, C: ?Sized> {
    fetcher: AggregateFetcher<'a, C>,
    planner: WindowPlanner,
}

impl<'a, C: ReadClient + ?Sized> DivergenceDetector<'a, C> {
    pub fn new(client: &'a C, band: LookbackBand) -> Self {
        Self {
            fetcher: AggregateFetcher::new(client),
            planner: WindowPlanner::new(band),
        }
    }

    /// Ask the read client to stream responses.
    pub fn streamed(mut self, streamed: bool) -> Self {
        self.fetcher = self.fetcher.streamed(streamed);
        self
    }

    /// Checks one histogram base. Windows are searched newest first and the
    /// search stops at the first window with a divergence; the earliest
    /// divergent timestamp within that window is reported.
    pub fn check(&self, base: &str, now: DateTime<Utc>) -> Result<Option<DivergenceReport>> {
        for window in self.planner.windows(now) {
            WINDOWS_SEARCHED.increment();

            let (count, inf_bucket) = self.fetcher.fetch_pair(base, &window)?;

            match find_divergence(&count, &inf_bucket) {
                Some(divergence) => {
                    DIVERGENCES.increment();
                    let report = DivergenceReport {
                        base: base.to_string(),
                        window,
                        timestamp_ms: divergence.timestamp,
                        count: divergence.left,
                        inf_bucket: divergence.right,
                    };
                    info!(
                        base,
                        timestamp_ms = report.timestamp_ms,
                        count = report.count,
                        inf_bucket = report.inf_bucket,
                        "found divergent histogram aggregates"
                    );
                    return Ok(Some(report));
                }
                None => {
                    debug!(
                        base,
                        start = %window.start,
                        samples = count.len().max(inf_bucket.len()),
                        "no divergence"
                    );
                }
            }
        }

        Ok(None)
    }

    /// Checks every base in turn, returning the reports for those that
    /// diverge. The first failure aborts the run.
    pub fn check_all<I, S>(&self, bases: I, now: DateTime<Utc>) -> Result<Vec<DivergenceReport>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reports = Vec::new();
        for base in bases {
            if let Some(report) = self.check(base.as_ref(), now)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}

use std::collections::BTreeMap;

use histaudit_core::{Error, Query, ReadClient, Result, ValueKind};

use crate::metrics::{QUERIES, SAMPLES_MERGED};
use crate::Window;

const AGGREGATION_LABEL: &str = "__aggregation__";
const BUCKET_LABEL: &str = "le";
const INF_BUCKET: &str = "+Inf";

/// Per-timestamp totals of one query's result, summed over every series it
/// returned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimestampValueMap {
    inner: BTreeMap<i64, f64>,
}

impl TimestampValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sample value to the total at its timestamp.
    pub fn add(&mut self, timestamp: i64, value: f64) {
        *self.inner.entry(timestamp).or_insert(0.0) += value;
    }

    /// The total at the timestamp, or zero if nothing was recorded there.
    pub fn get(&self, timestamp: i64) -> f64 {
        self.inner.get(&timestamp).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.inner.contains_key(&timestamp)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Timestamps in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.inner.keys().copied()
    }

    /// `(timestamp, total)` pairs in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.inner.iter().map(|(ts, v)| (*ts, *v))
    }
}

impl FromIterator<(i64, f64)> for TimestampValueMap {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (timestamp, value) in iter {
            map.add(timestamp, value);
        }
        map
    }
}

/// The query for `<base>_count` summed across series.
pub fn count_query(base: &str, window: &Window) -> Query {
    Query::new(window.start_ms(), window.end_ms())
        .matcher(AGGREGATION_LABEL, format!("{base}_count:sum:counter"))
}

/// The query for the `+Inf` bucket of `<base>_bucket` summed across series.
pub fn inf_bucket_query(base: &str, window: &Window) -> Query {
    Query::new(window.start_ms(), window.end_ms())
        .matcher(AGGREGATION_LABEL, format!("{base}_bucket:sum:counter"))
        .matcher(BUCKET_LABEL, INF_BUCKET)
}

/// Runs aggregate queries and folds their results into
/// [`TimestampValueMap`]s.
pub struct AggregateFetcher<'a, C: ?Sized> {
    client: &'a C,
    streamed: bool,
}

impl<'a, C: ReadClient + ?Sized> AggregateFetcher<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            streamed: false,
        }
    }

    /// Ask the client to stream responses instead of buffering them.
    pub fn streamed(mut self, streamed: bool) -> Self {
        self.streamed = streamed;
        self
    }

    /// Executes the query and sums every returned series by timestamp.
    ///
    /// The queries issued here are scalar aggregates, so a sample of any
    /// kind other than float is a contract violation. Every failure is
    /// tagged with the query.
    pub fn fetch(&self, query: &Query) -> Result<TimestampValueMap> {
        QUERIES.increment();
        let series_set = self
            .client
            .read(query, self.streamed)
            .map_err(|e| e.in_query(query))?;

        let mut merged = TimestampValueMap::new();

        for series in series_set {
            let series = series.map_err(|e| e.in_query(query))?;

            for sample in series.samples() {
                let sample = sample.map_err(|e| e.in_query(query))?;

                if sample.kind != ValueKind::Float {
                    return Err(Error::UnexpectedValueKind {
                        query: query.to_string(),
                        kind: sample.kind,
                    });
                }

                merged.add(sample.timestamp, sample.value);
                SAMPLES_MERGED.increment();
            }
        }

        Ok(merged)
    }

    /// Fetches the `_count` and `+Inf` bucket totals of a histogram base
    /// over the window, in that order.
    pub fn fetch_pair(
        &self,
        base: &str,
        window: &Window,
    ) -> Result<(TimestampValueMap, TimestampValueMap)> {
        let count = self.fetch(&count_query(base, window))?;
        let inf_bucket = self.fetch(&inf_bucket_query(base, window))?;
        Ok((count, inf_bucket))
    }
}

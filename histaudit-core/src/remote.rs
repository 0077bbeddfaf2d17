use std::fmt;

use crate::{LabelMatcher, Labels, Result};

/// A range query: a closed millisecond interval and a set of exact-match
/// label constraints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub start_ms: i64,
    pub end_ms: i64,
    pub matchers: Vec<LabelMatcher>,
}

impl Query {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self {
            start_ms,
            end_ms,
            matchers: Vec::new(),
        }
    }

    pub fn matcher(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.matchers.push(LabelMatcher::equal(name, value));
        self
    }

    /// Returns true if the timestamp falls within the query range.
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start_ms <= timestamp && timestamp <= self.end_ms
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, m) in self.matchers.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{m}")?;
        }
        write!(f, "}}[{}, {}]", self.start_ms, self.end_ms)
    }
}

/// The kind of value a sample carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Float,
    Histogram,
    FloatHistogram,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Float => "float",
            Self::Histogram => "histogram",
            Self::FloatHistogram => "floathistogram",
        };
        f.write_str(s)
    }
}

/// One sample of a series. `value` is only meaningful for
/// [`ValueKind::Float`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
    pub kind: ValueKind,
}

impl Sample {
    pub fn float(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            kind: ValueKind::Float,
        }
    }
}

/// Samples of one series, in non-decreasing timestamp order.
pub type SampleIter<'a> = Box<dyn Iterator<Item = Result<Sample>> + 'a>;

/// One series of a query result.
pub trait Series {
    fn labels(&self) -> &Labels;

    fn samples(&self) -> SampleIter<'_>;
}

/// The lazily produced series of a query result.
pub type SeriesSet<'a> = Box<dyn Iterator<Item = Result<Box<dyn Series + 'a>>> + 'a>;

/// A remote read endpoint.
pub trait ReadClient {
    /// Executes the query. With `streamed` set the client may consume the
    /// response incrementally instead of buffering it whole.
    fn read(&self, query: &Query, streamed: bool) -> Result<SeriesSet<'_>>;
}

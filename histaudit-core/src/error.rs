//! Error and Result types shared by every histaudit crate.

use std::io;

use thiserror::Error;

use crate::{ChunkRef, SeriesRef, ValueKind};

/// A convenience `Result` type for histaudit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for histaudit operations.
///
/// Nothing here is retried. Provider and I/O failures abort the enclosing
/// run, and so do the contract violations, which indicate that the data or
/// the engine speaks a different version than the one the pipelines expect.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A storage or query provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// A failure while walking the named block.
    #[error("problem walking block {block}: {source}")]
    Block {
        /// Id of the block being walked.
        block: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A failure while executing or consuming the named query.
    #[error("query {query} failed: {source}")]
    Query {
        /// Rendered form of the query.
        query: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A chunk carried an encoding tag outside the known set.
    #[error("unrecognized chunk encoding: {0}")]
    UnknownEncoding(u8),

    /// A scalar aggregate query produced a non-float sample.
    #[error("expected float result for query {query}, got {kind}")]
    UnexpectedValueKind {
        /// Rendered form of the query.
        query: String,
        /// The value kind that was reported.
        kind: ValueKind,
    },

    /// A series is missing a label every series is expected to carry.
    #[error("series {series} has no {label} label")]
    MissingLabel {
        /// The offending series.
        series: SeriesRef,
        /// Name of the missing label.
        label: &'static str,
    },

    /// The index has no series for the given reference.
    #[error("series not found: {0}")]
    SeriesNotFound(SeriesRef),

    /// The chunk reader has no chunk for the given reference.
    #[error("chunk not found: {0}")]
    ChunkNotFound(ChunkRef),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wraps this error with the id of the block being walked.
    pub fn in_block(self, block: impl Into<String>) -> Self {
        Error::Block {
            block: block.into(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the query that produced it.
    pub fn in_query(self, query: impl ToString) -> Self {
        Error::Query {
            query: query.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns true if this error (or the error it wraps) signals a mismatch
    /// between the data and what the pipelines assume about it, rather than a
    /// failed read.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Error::UnknownEncoding(_)
            | Error::UnexpectedValueKind { .. }
            | Error::MissingLabel { .. } => true,
            Error::Block { source, .. } | Error::Query { source, .. } => {
                source.is_contract_violation()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered() {
        let err = Error::UnknownEncoding(9).in_block("01HXYZ");
        assert_eq!(
            err.to_string(),
            "problem walking block 01HXYZ: unrecognized chunk encoding: 9"
        );
    }

    #[test]
    fn contract_violations_are_seen_through_context() {
        assert!(Error::UnknownEncoding(7).in_block("b").is_contract_violation());
        assert!(Error::UnexpectedValueKind {
            query: "q".into(),
            kind: ValueKind::Histogram,
        }
        .in_query("q")
        .is_contract_violation());
        assert!(!Error::Provider("gone".into())
            .in_block("b")
            .is_contract_violation());
        assert!(!Error::SeriesNotFound(SeriesRef(1)).is_contract_violation());
    }
}

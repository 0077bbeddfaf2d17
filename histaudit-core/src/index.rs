use std::fmt;

use crate::{ChunkMeta, Labels, Result};

/// Storage-internal reference to a series within a block's index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesRef(pub u64);

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Series references in the order the index produces them.
pub type Postings<'a> = Box<dyn Iterator<Item = Result<SeriesRef>> + 'a>;

/// Read access to a block's inverted index.
///
/// A reader holds the index open for as long as it lives and releases it
/// when dropped.
pub trait IndexReader {
    /// All distinct values of the named label.
    fn label_values(&self, name: &str) -> Result<Vec<String>>;

    /// The union of the postings for `name=value`, over every given value.
    fn postings(&self, name: &str, values: &[String]) -> Result<Postings<'_>>;

    /// Resolves a series' label set and chunk metadata in one lookup.
    fn series(&self, series: SeriesRef) -> Result<(Labels, Vec<ChunkMeta>)>;
}

use std::fmt;

use crate::{Error, Result};

/// Storage-internal reference to a chunk within a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkRef(pub u64);

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Chunk metadata as resolved from the index: the time range a chunk covers
/// and where to find its bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMeta {
    pub chunk_ref: ChunkRef,
    pub min_time: i64,
    pub max_time: i64,
}

/// How a chunk's bytes represent its sample values.
///
/// The set is closed. A tag that maps to none of these means the chunk was
/// written by a storage format version this crate does not know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    /// Placeholder encoding carried by empty chunks.
    None = 0,
    /// Gorilla XOR float samples.
    Xor = 1,
    /// Native histograms with integer counts.
    Histogram = 2,
    /// Native histograms with float counts.
    FloatHistogram = 3,
}

impl Encoding {
    /// Creates an Encoding from its on-disk tag.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Xor),
            2 => Some(Self::Histogram),
            3 => Some(Self::FloatHistogram),
            _ => None,
        }
    }

    /// Returns the on-disk tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for the two native histogram encodings.
    pub fn is_histogram(self) -> bool {
        matches!(self, Self::Histogram | Self::FloatHistogram)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Xor => "XOR",
            Self::Histogram => "histogram",
            Self::FloatHistogram => "floathistogram",
        };
        f.write_str(s)
    }
}

/// An encoded, immutable run of one series' samples.
pub trait Chunk {
    /// The raw encoding tag stored alongside the chunk.
    fn encoding_tag(&self) -> u8;

    /// The encoded chunk bytes.
    fn bytes(&self) -> &[u8];

    /// Number of samples the chunk reports holding.
    fn num_samples(&self) -> usize;

    /// The decoded encoding, or [`Error::UnknownEncoding`] for a tag outside
    /// the known set.
    fn encoding(&self) -> Result<Encoding> {
        let tag = self.encoding_tag();
        Encoding::from_u8(tag).ok_or(Error::UnknownEncoding(tag))
    }
}

/// Retrieves chunk bytes for a block.
///
/// A reader holds whatever the block needs to serve chunks and releases it
/// when dropped.
pub trait ChunkReader {
    fn chunk(&self, meta: &ChunkMeta) -> Result<Box<dyn Chunk + '_>>;
}

use crate::{ChunkReader, IndexReader, Result};

/// Identifying metadata of a storage block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMeta {
    /// Unique id of the block (a ULID for Prometheus-style blocks).
    pub id: String,
    pub min_time: i64,
    pub max_time: i64,
}

/// An immutable, time-bounded collection of series data.
pub trait Block {
    fn meta(&self) -> BlockMeta;

    fn index(&self) -> Result<Box<dyn IndexReader + '_>>;

    fn chunks(&self) -> Result<Box<dyn ChunkReader + '_>>;
}

/// Something that can enumerate storage blocks, such as a read-only view of
/// a block directory.
pub trait BlockSource {
    type Block: Block;

    /// The blocks in the order they should be walked.
    fn blocks(&self) -> Result<Vec<Self::Block>>;
}

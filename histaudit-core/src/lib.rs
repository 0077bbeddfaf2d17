//! Collaborator interfaces for the histaudit pipelines.
//!
//! The block auditor and the divergence detector only ever read data. They do
//! so through the traits in this crate, which describe the slice of a
//! time-series engine they depend on:
//!
//! - [`BlockSource`], [`Block`], [`IndexReader`] and [`ChunkReader`] for
//!   walking immutable storage blocks.
//! - [`ReadClient`] and [`Series`] for issuing matcher-based range queries.
//!
//! The [`mem`] module implements every trait over plain in-memory data, which
//! is what the tests (and offline replays of captured data) run against.

mod block;
mod chunk;
mod error;
mod index;
mod labels;
pub mod mem;
mod remote;

pub use block::{Block, BlockMeta, BlockSource};
pub use chunk::{Chunk, ChunkMeta, ChunkReader, ChunkRef, Encoding};
pub use error::{Error, Result};
pub use index::{IndexReader, Postings, SeriesRef};
pub use labels::{Label, LabelMatcher, Labels, LabelsBuilder, METRIC_NAME};
pub use remote::{Query, ReadClient, Sample, SampleIter, Series, SeriesSet, ValueKind};

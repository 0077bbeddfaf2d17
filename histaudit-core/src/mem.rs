//! In-memory implementations of the collaborator traits.
//!
//! Blocks are assembled with [`MemBlockBuilder`]; series references are
//! handed out in insertion order and the index serves postings in that
//! order. [`MemReadClient`] evaluates queries against a fixed set of series
//! and records every query it receives.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::*;

/// A chunk held in memory.
#[derive(Clone, Debug)]
pub struct MemChunk {
    encoding: u8,
    bytes: Bytes,
    num_samples: usize,
}

impl MemChunk {
    pub fn new(encoding: Encoding, bytes: impl Into<Bytes>, num_samples: usize) -> Self {
        Self::with_tag(encoding.as_u8(), bytes, num_samples)
    }

    /// Creates a chunk with an arbitrary encoding tag, known or not.
    pub fn with_tag(encoding: u8, bytes: impl Into<Bytes>, num_samples: usize) -> Self {
        Self {
            encoding,
            bytes: bytes.into(),
            num_samples,
        }
    }
}

impl Chunk for MemChunk {
    fn encoding_tag(&self) -> u8 {
        self.encoding
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn num_samples(&self) -> usize {
        self.num_samples
    }
}

#[derive(Clone, Debug)]
struct MemSeriesEntry {
    labels: Labels,
    chunks: Vec<ChunkMeta>,
}

/// An immutable block held in memory.
#[derive(Clone, Debug)]
pub struct MemBlock {
    meta: BlockMeta,
    series: BTreeMap<SeriesRef, MemSeriesEntry>,
    chunks: HashMap<ChunkRef, MemChunk>,
    open_readers: Arc<AtomicUsize>,
}

impl MemBlock {
    pub fn builder(id: impl Into<String>) -> MemBlockBuilder {
        MemBlockBuilder {
            meta: BlockMeta {
                id: id.into(),
                min_time: i64::MAX,
                max_time: i64::MIN,
            },
            series: BTreeMap::new(),
            chunks: HashMap::new(),
            next_chunk: 0,
        }
    }

    /// Number of index and chunk readers currently open on this block (or
    /// any clone of it).
    pub fn open_readers(&self) -> usize {
        self.open_readers.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> ReaderGuard {
        self.open_readers.fetch_add(1, Ordering::SeqCst);
        ReaderGuard {
            open_readers: self.open_readers.clone(),
        }
    }
}

impl Block for MemBlock {
    fn meta(&self) -> BlockMeta {
        self.meta.clone()
    }

    fn index(&self) -> Result<Box<dyn IndexReader + '_>> {
        Ok(Box::new(MemIndexReader {
            block: self,
            _guard: self.acquire(),
        }))
    }

    fn chunks(&self) -> Result<Box<dyn ChunkReader + '_>> {
        Ok(Box::new(MemChunkReader {
            block: self,
            _guard: self.acquire(),
        }))
    }
}

/// Used to build a [`MemBlock`].
pub struct MemBlockBuilder {
    meta: BlockMeta,
    series: BTreeMap<SeriesRef, MemSeriesEntry>,
    chunks: HashMap<ChunkRef, MemChunk>,
    next_chunk: u64,
}

impl MemBlockBuilder {
    /// Adds a series whose chunks split the first two hours of the block
    /// evenly between them.
    pub fn series(mut self, labels: Labels, chunks: Vec<MemChunk>) -> Self {
        let chunk_span = 7_200_000 / chunks.len().max(1) as i64;
        let mut metas = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.into_iter().enumerate() {
            let meta = ChunkMeta {
                chunk_ref: ChunkRef(self.next_chunk),
                min_time: idx as i64 * chunk_span,
                max_time: (idx as i64 + 1) * chunk_span - 1,
            };
            self.next_chunk += 1;
            self.chunks.insert(meta.chunk_ref, chunk);
            metas.push(meta);
        }

        self.push_series(labels, metas);
        self
    }

    /// Adds a series whose only chunk reference points at nothing, so that
    /// reading it fails.
    pub fn dangling_series(mut self, labels: Labels) -> Self {
        let meta = ChunkMeta {
            chunk_ref: ChunkRef(u64::MAX - self.series.len() as u64),
            min_time: 0,
            max_time: 0,
        };
        self.push_series(labels, vec![meta]);
        self
    }

    fn push_series(&mut self, labels: Labels, chunks: Vec<ChunkMeta>) {
        for meta in &chunks {
            self.meta.min_time = self.meta.min_time.min(meta.min_time);
            self.meta.max_time = self.meta.max_time.max(meta.max_time);
        }
        let series = SeriesRef(self.series.len() as u64);
        self.series.insert(series, MemSeriesEntry { labels, chunks });
    }

    pub fn build(mut self) -> MemBlock {
        if self.meta.min_time > self.meta.max_time {
            self.meta.min_time = 0;
            self.meta.max_time = 0;
        }

        MemBlock {
            meta: self.meta,
            series: self.series,
            chunks: self.chunks,
            open_readers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct ReaderGuard {
    open_readers: Arc<AtomicUsize>,
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.open_readers.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MemIndexReader<'a> {
    block: &'a MemBlock,
    _guard: ReaderGuard,
}

impl IndexReader for MemIndexReader<'_> {
    fn label_values(&self, name: &str) -> Result<Vec<String>> {
        let values: BTreeSet<&str> = self
            .block
            .series
            .values()
            .filter_map(|s| s.labels.get(name))
            .collect();

        Ok(values.into_iter().map(str::to_owned).collect())
    }

    fn postings(&self, name: &str, values: &[String]) -> Result<Postings<'_>> {
        let wanted: BTreeSet<String> = values.iter().cloned().collect();
        let name = name.to_owned();

        Ok(Box::new(
            self.block
                .series
                .iter()
                .filter(move |(_, s)| {
                    s.labels
                        .get(&name)
                        .is_some_and(|value| wanted.contains(value))
                })
                .map(|(series, _)| Ok::<_, Error>(*series)),
        ))
    }

    fn series(&self, series: SeriesRef) -> Result<(Labels, Vec<ChunkMeta>)> {
        self.block
            .series
            .get(&series)
            .map(|s| (s.labels.clone(), s.chunks.clone()))
            .ok_or(Error::SeriesNotFound(series))
    }
}

struct MemChunkReader<'a> {
    block: &'a MemBlock,
    _guard: ReaderGuard,
}

impl ChunkReader for MemChunkReader<'_> {
    fn chunk(&self, meta: &ChunkMeta) -> Result<Box<dyn Chunk + '_>> {
        self.block
            .chunks
            .get(&meta.chunk_ref)
            .map(|chunk| Box::new(chunk.clone()) as Box<dyn Chunk + '_>)
            .ok_or(Error::ChunkNotFound(meta.chunk_ref))
    }
}

/// A block source over a fixed list of in-memory blocks.
#[derive(Clone, Debug, Default)]
pub struct MemBlockSource {
    blocks: Vec<MemBlock>,
}

impl MemBlockSource {
    pub fn new(blocks: Vec<MemBlock>) -> Self {
        Self { blocks }
    }
}

impl BlockSource for MemBlockSource {
    type Block = MemBlock;

    fn blocks(&self) -> Result<Vec<MemBlock>> {
        Ok(self.blocks.clone())
    }
}

/// A query result series held in memory.
#[derive(Clone, Debug)]
pub struct MemSeries {
    labels: Labels,
    samples: Vec<Sample>,
}

impl MemSeries {
    pub fn new(labels: Labels, samples: Vec<Sample>) -> Self {
        Self { labels, samples }
    }
}

impl Series for MemSeries {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn samples(&self) -> SampleIter<'_> {
        Box::new(self.samples.iter().copied().map(Ok::<_, Error>))
    }
}

/// A read client that answers queries from a fixed set of series.
#[derive(Default)]
pub struct MemReadClient {
    series: Vec<MemSeries>,
    failure: Option<String>,
    queries: Mutex<Vec<(Query, bool)>>,
}

impl MemReadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series. Samples are trimmed to each query's range when read.
    pub fn series(mut self, labels: Labels, samples: Vec<Sample>) -> Self {
        self.series.push(MemSeries::new(labels, samples));
        self
    }

    /// Makes every subsequent read fail with a provider error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Every query received so far, along with its `streamed` flag.
    pub fn queries(&self) -> Vec<(Query, bool)> {
        self.queries.lock().clone()
    }
}

impl ReadClient for MemReadClient {
    fn read(&self, query: &Query, streamed: bool) -> Result<SeriesSet<'_>> {
        self.queries.lock().push((query.clone(), streamed));

        if let Some(message) = &self.failure {
            return Err(Error::Provider(message.clone()));
        }

        let matchers = query.matchers.clone();
        let range = query.clone();
        Ok(Box::new(
            self.series
                .iter()
                .filter(move |s| s.labels.matches(&matchers))
                .map(move |s| {
                    let samples = s
                        .samples
                        .iter()
                        .filter(|sample| range.contains(sample.timestamp))
                        .copied()
                        .collect();
                    let series: Box<dyn Series + '_> =
                        Box::new(MemSeries::new(s.labels.clone(), samples));
                    Ok::<_, Error>(series)
                }),
        ))
    }
}

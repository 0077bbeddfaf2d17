//! The block auditor: walk every series of every block and report the
//! native histogram chunks found.

mod classifier;
mod decoder;
mod walker;

pub use classifier::classify;
pub use decoder::{HistogramShape, SampleDecoder, SampleResult};
pub use walker::walk_block;

use histaudit_core::{Block, BlockSource, Encoding, Result};
use tracing::{debug, info};

use crate::metrics::{BLOCKS_WALKED, CHUNK_RESULTS};
use crate::{ChunkResult, ReportSink};

/// Everything found in a single block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockAudit {
    /// One entry per histogram chunk, in walk order.
    pub chunks: Vec<ChunkResult>,
    /// Decoded per-sample statistics. Empty unless a decoder is configured.
    pub samples: Vec<SampleResult>,
}

/// Totals for a completed audit run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub blocks: usize,
    pub int_histogram_chunks: usize,
    pub float_histogram_chunks: usize,
    pub samples: usize,
}

impl AuditSummary {
    pub fn chunks(&self) -> usize {
        self.int_histogram_chunks + self.float_histogram_chunks
    }
}

/// Walks blocks and reports their native histogram chunks.
pub struct BlockAuditor {
    progress_interval: usize,
    decoder: Option<Box<dyn SampleDecoder>>,
}

impl Default for BlockAuditor {
    fn default() -> Self {
        Self {
            progress_interval: 100,
            decoder: None,
        }
    }
}

impl BlockAuditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a progress line every `interval` blocks. Zero disables progress
    /// lines.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Decode every histogram chunk's samples with the given decoder.
    pub fn sample_decoder(mut self, decoder: impl SampleDecoder + 'static) -> Self {
        self.decoder = Some(Box::new(decoder));
        self
    }

    /// Audits a single block. The block's readers are released before this
    /// returns.
    pub fn audit_block<B: Block + ?Sized>(&self, block: &B) -> Result<BlockAudit> {
        let mut audit = BlockAudit::default();

        walk_block(block, |metric_name, chunk| {
            let Some(result) = classify(metric_name, chunk)? else {
                return Ok(());
            };

            if let Some(decoder) = &self.decoder {
                for shape in decoder.decode(result.encoding, chunk.bytes())? {
                    audit.samples.push(SampleResult::new(metric_name, shape));
                }
            }

            audit.chunks.push(result);
            Ok(())
        })?;

        Ok(audit)
    }

    /// Audits every block of the source in order, writing and flushing each
    /// block's results to the sink as soon as the block has been walked.
    ///
    /// The first failure aborts the run. Failures while walking are tagged
    /// with the id of the block. Results of earlier blocks have already been
    /// written by then and are left in place.
    pub fn audit<S, R>(&self, source: &S, mut sink: R) -> Result<AuditSummary>
    where
        S: BlockSource + ?Sized,
        R: ReportSink,
    {
        let mut summary = AuditSummary::default();

        for (count, block) in source.blocks()?.iter().enumerate() {
            let id = block.meta().id;
            if self.progress_interval > 0 && count % self.progress_interval == 0 {
                info!("walking block {id} (count: {count})...");
            }

            let audit = self.audit_block(block).map_err(|e| e.in_block(&id))?;
            debug!(
                block = %id,
                chunks = audit.chunks.len(),
                samples = audit.samples.len(),
                "walked block"
            );

            for result in &audit.chunks {
                match result.encoding {
                    Encoding::Histogram => summary.int_histogram_chunks += 1,
                    Encoding::FloatHistogram => summary.float_histogram_chunks += 1,
                    Encoding::None | Encoding::Xor => continue,
                }
                sink.write(result)?;
                CHUNK_RESULTS.increment();
            }

            for sample in &audit.samples {
                sink.record_sample(sample)?;
            }

            sink.flush()?;

            summary.samples += audit.samples.len();
            summary.blocks += 1;
            BLOCKS_WALKED.increment();
        }

        Ok(summary)
    }
}

use histaudit::audit::BlockAudit;
use histaudit::*;
use histaudit_core::mem::{MemBlock, MemBlockSource, MemChunk};
use histaudit_core::{Encoding, Labels, METRIC_NAME};

fn series(name: &str, instance: &str) -> Labels {
    [(METRIC_NAME, name), ("instance", instance)]
        .into_iter()
        .collect()
}

fn chunk(encoding: Encoding, size: usize, samples: usize) -> MemChunk {
    MemChunk::new(encoding, vec![0xAB; size], samples)
}

fn mixed_block(id: &str) -> MemBlock {
    MemBlock::builder(id)
        .series(
            series("rpc_latency_seconds", "a"),
            vec![
                chunk(Encoding::Histogram, 310, 120),
                chunk(Encoding::Histogram, 128, 40),
            ],
        )
        .series(series("up", "a"), vec![chunk(Encoding::Xor, 64, 120)])
        .series(
            series("queue_wait_seconds", "a"),
            vec![
                chunk(Encoding::FloatHistogram, 512, 120),
                chunk(Encoding::None, 0, 0),
            ],
        )
        .series(series("up", "b"), vec![chunk(Encoding::Xor, 70, 120)])
        .build()
}

#[test]
fn reports_only_histogram_chunks() {
    let source = MemBlockSource::new(vec![mixed_block("01A"), mixed_block("01B")]);

    let mut results: Vec<ChunkResult> = Vec::new();
    let summary = BlockAuditor::new().audit(&source, &mut results).unwrap();

    assert_eq!(summary.blocks, 2);
    assert_eq!(summary.int_histogram_chunks, 4);
    assert_eq!(summary.float_histogram_chunks, 2);
    assert_eq!(summary.chunks(), results.len());
    assert_eq!(summary.samples, 0);

    assert!(results.iter().all(|r| r.encoding.is_histogram()));
    assert!(results.iter().all(|r| r.metric_name != "up"));

    let first_block: Vec<(&str, Encoding, usize, usize)> = results[..3]
        .iter()
        .map(|r| (r.metric_name.as_str(), r.encoding, r.size_bytes, r.num_samples))
        .collect();
    assert_eq!(
        first_block,
        vec![
            ("rpc_latency_seconds", Encoding::Histogram, 310, 120),
            ("rpc_latency_seconds", Encoding::Histogram, 128, 40),
            ("queue_wait_seconds", Encoding::FloatHistogram, 512, 120),
        ]
    );
}

#[test]
fn auditing_twice_is_identical() {
    let block = mixed_block("01A");
    let auditor = BlockAuditor::new();

    let first = auditor.audit_block(&block).unwrap();
    let second = auditor.audit_block(&block).unwrap();

    assert_eq!(first, second);
    assert_eq!(block.open_readers(), 0);
}

#[test]
fn block_without_histograms_is_not_an_error() {
    let block = MemBlock::builder("floats")
        .series(series("up", "a"), vec![chunk(Encoding::Xor, 64, 120)])
        .build();

    assert_eq!(
        BlockAuditor::new().audit_block(&block).unwrap(),
        BlockAudit::default()
    );
}

#[test]
fn failure_names_the_block_and_keeps_earlier_output() {
    let broken = MemBlock::builder("01BROKEN")
        .series(
            series("rpc_latency_seconds", "a"),
            vec![chunk(Encoding::Histogram, 10, 1)],
        )
        .dangling_series(series("rpc_latency_seconds", "b"))
        .build();
    let source = MemBlockSource::new(vec![mixed_block("01A"), broken, mixed_block("01C")]);

    let mut results: Vec<ChunkResult> = Vec::new();
    let err = BlockAuditor::new()
        .progress_interval(1)
        .audit(&source, &mut results)
        .unwrap_err();

    match &err {
        Error::Block { block, source } => {
            assert_eq!(block, "01BROKEN");
            assert!(matches!(**source, Error::ChunkNotFound(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    // only the first block was written; nothing of the broken block leaks
    assert_eq!(results.len(), 3);
}

#[test]
fn unknown_encoding_aborts_the_audit() {
    let block = MemBlock::builder("01FUTURE")
        .series(
            series("rpc_latency_seconds", "a"),
            vec![MemChunk::with_tag(5, vec![0u8; 10], 1)],
        )
        .build();
    let source = MemBlockSource::new(vec![block]);

    let err = BlockAuditor::new()
        .audit(&source, Vec::<ChunkResult>::new())
        .unwrap_err();

    assert!(err.is_contract_violation());
    assert!(err.to_string().contains("01FUTURE"));
}

#[test]
fn series_without_metric_name_are_not_walked() {
    let block = MemBlock::builder("01NONAME")
        .series(
            [("instance", "a")].into_iter().collect(),
            vec![chunk(Encoding::Histogram, 10, 1)],
        )
        .build();

    // series without a metric name never show up in `__name__` postings
    assert_eq!(
        BlockAuditor::new().audit_block(&block).unwrap(),
        BlockAudit::default()
    );
}

struct FixedDecoder;

impl SampleDecoder for FixedDecoder {
    fn decode(&self, encoding: Encoding, bytes: &[u8]) -> Result<Vec<HistogramShape>> {
        let spans = match encoding {
            Encoding::FloatHistogram => 2,
            _ => 1,
        };
        Ok(vec![
            HistogramShape {
                observations: bytes.len() as u64,
                spans,
                buckets: 4,
            };
            2
        ])
    }
}

#[derive(Default)]
struct RecordingSink {
    chunks: Vec<ChunkResult>,
    samples: Vec<SampleResult>,
    flushes: usize,
}

impl ReportSink for RecordingSink {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        self.chunks.push(result.clone());
        Ok(())
    }

    fn record_sample(&mut self, sample: &SampleResult) -> Result<()> {
        self.samples.push(sample.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[test]
fn sink_is_flushed_after_every_block() {
    let broken = MemBlock::builder("01BROKEN")
        .dangling_series(series("rpc_latency_seconds", "b"))
        .build();
    let source = MemBlockSource::new(vec![mixed_block("01A"), mixed_block("01B"), broken]);

    let mut sink = RecordingSink::default();
    BlockAuditor::new().audit(&source, &mut sink).unwrap_err();

    assert_eq!(sink.flushes, 2);
    assert_eq!(sink.chunks.len(), 6);
}

#[test]
fn sample_decoder_runs_per_histogram_chunk() {
    let source = MemBlockSource::new(vec![mixed_block("01A")]);

    let mut sink = RecordingSink::default();
    let summary = BlockAuditor::new()
        .sample_decoder(FixedDecoder)
        .audit(&source, &mut sink)
        .unwrap();

    assert_eq!(sink.flushes, 1);
    assert_eq!(sink.chunks.len(), 3);
    assert_eq!(summary.samples, 6);
    assert_eq!(sink.samples.len(), 6);
    assert_eq!(
        sink.samples[0],
        SampleResult {
            metric_name: "rpc_latency_seconds".to_string(),
            num_observations: 310,
            num_spans: 1,
            num_buckets: 4,
        }
    );
    assert_eq!(sink.samples[5].metric_name, "queue_wait_seconds");
    assert_eq!(sink.samples[5].num_spans, 2);
}

struct FailingSink;

impl ReportSink for FailingSink {
    fn write(&mut self, _result: &ChunkResult) -> Result<()> {
        Err(std::io::Error::other("disk full").into())
    }
}

#[test]
fn write_failures_are_fatal() {
    let source = MemBlockSource::new(vec![mixed_block("01A")]);
    let err = BlockAuditor::new().audit(&source, FailingSink).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

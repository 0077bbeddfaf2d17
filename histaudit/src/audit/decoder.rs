use histaudit_core::{Encoding, Result};
use serde::Serialize;

/// The shape of one decoded histogram sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistogramShape {
    /// Total observation count. Float histogram counts are truncated.
    pub observations: u64,
    /// Positive plus negative spans.
    pub spans: usize,
    /// Positive plus negative buckets.
    pub buckets: usize,
}

/// Decodes the samples of a native histogram chunk.
///
/// The chunk format belongs to the storage engine, so decoding is supplied
/// from outside. An auditor configured with a decoder calls it once per
/// histogram chunk, after the chunk itself has been measured.
pub trait SampleDecoder {
    fn decode(&self, encoding: Encoding, bytes: &[u8]) -> Result<Vec<HistogramShape>>;
}

/// Per-sample statistics of a histogram chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleResult {
    pub metric_name: String,
    pub num_observations: u64,
    pub num_spans: usize,
    pub num_buckets: usize,
}

impl SampleResult {
    pub fn new(metric_name: &str, shape: HistogramShape) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            num_observations: shape.observations,
            num_spans: shape.spans,
            num_buckets: shape.buckets,
        }
    }
}

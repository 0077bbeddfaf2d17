use histaudit_core::Encoding;
use serde::Serialize;

use crate::audit::SampleResult;
use crate::Result;

/// Size and sample count of one native histogram chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkResult {
    pub metric_name: String,
    #[serde(serialize_with = "serialize_encoding")]
    pub encoding: Encoding,
    pub size_bytes: usize,
    pub num_samples: usize,
}

fn serialize_encoding<S: serde::Serializer>(
    encoding: &Encoding,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(encoding)
}

/// Append-only destination for audit results.
///
/// Results arrive in walk order and are never revisited. Any error returned
/// here aborts the audit; whatever was written before stays written.
pub trait ReportSink {
    fn write(&mut self, result: &ChunkResult) -> Result<()>;

    /// Receives decoded per-sample statistics when the auditor runs with a
    /// [`SampleDecoder`](crate::SampleDecoder). Ignored by default.
    fn record_sample(&mut self, _sample: &SampleResult) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        (**self).write(result)
    }

    fn record_sample(&mut self, sample: &SampleResult) -> Result<()> {
        (**self).record_sample(sample)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Collects results in memory.
impl ReportSink for Vec<ChunkResult> {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        self.push(result.clone());
        Ok(())
    }
}

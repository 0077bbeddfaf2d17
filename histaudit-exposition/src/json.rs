use std::io::Write;

use histaudit::{ChunkResult, DivergenceReport, ReportSink, SampleResult};
use histaudit_core::Result;
use serde::Serialize;

use crate::util::io_error;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Chunk(&'a ChunkResult),
    Sample(&'a SampleResult),
    Divergence(&'a DivergenceReport),
}

/// Writes results as newline-delimited JSON, each object tagged with a
/// `type` of `chunk`, `sample` or `divergence`.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_divergence(&mut self, report: &DivergenceReport) -> Result<()> {
        self.write_record(&Record::Divergence(report))
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_record(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io_error)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonLinesWriter<W> {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        self.write_record(&Record::Chunk(result))
    }

    fn record_sample(&mut self, sample: &SampleResult) -> Result<()> {
        self.write_record(&Record::Sample(sample))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

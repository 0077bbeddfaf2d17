use std::fs::File;
use std::io::{BufWriter, Write};

use histaudit::{ChunkResult, OutputPaths, ReportSink};
use histaudit_core::Result;

use crate::util::route;

/// Header line written at the top of each report.
pub const TSV_HEADER: &str = "metric\tsizeBytes\tnumSamples\n";

/// Writes chunk results as tab-separated lines, integer histogram chunks to
/// one destination and float histogram chunks to the other.
///
/// Each line is `<metric>\t<sizeBytes>\t<numSamples>`. Lines are appended
/// in the order results arrive.
pub struct TsvReportWriter<W: Write> {
    int_histogram: W,
    float_histogram: W,
}

impl TsvReportWriter<BufWriter<File>> {
    /// Creates (or truncates) both report files.
    pub fn create(paths: &OutputPaths) -> Result<Self> {
        Self::new(
            BufWriter::new(File::create(&paths.int_histogram)?),
            BufWriter::new(File::create(&paths.float_histogram)?),
        )
    }
}

impl<W: Write> TsvReportWriter<W> {
    /// Wraps two destinations, writing the header to each.
    pub fn new(mut int_histogram: W, mut float_histogram: W) -> Result<Self> {
        int_histogram.write_all(TSV_HEADER.as_bytes())?;
        float_histogram.write_all(TSV_HEADER.as_bytes())?;

        Ok(Self {
            int_histogram,
            float_histogram,
        })
    }

    /// Flushes and returns the integer and float histogram destinations.
    pub fn into_inner(mut self) -> Result<(W, W)> {
        self.flush()?;
        Ok((self.int_histogram, self.float_histogram))
    }
}

impl<W: Write> ReportSink for TsvReportWriter<W> {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        let out = route(
            result.encoding,
            &mut self.int_histogram,
            &mut self.float_histogram,
        )?;

        writeln!(
            out,
            "{}\t{}\t{}",
            result.metric_name, result.size_bytes, result.num_samples
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.int_histogram.flush()?;
        self.float_histogram.flush()?;
        Ok(())
    }
}

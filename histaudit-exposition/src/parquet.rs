use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::*;
use histaudit::{ChunkResult, OutputPaths, ReportSink};
use histaudit_core::{Encoding, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;

use crate::util::{io_error, route};

/// Rows buffered per report before they are handed to the `ArrowWriter` as
/// a `RecordBatch`. Chunk reports are narrow, so this also bounds the row
/// group size.
const DEFAULT_MAX_BATCH_SIZE: usize = 50_000;

#[derive(Clone, Debug)]
pub struct ParquetCompression {
    inner: Compression,
}

impl ParquetCompression {
    /// No compression.
    pub fn none() -> Self {
        Self {
            inner: Compression::UNCOMPRESSED,
        }
    }

    /// Zstd at the given level. Returns an error if the level is not a valid
    /// zstd compression level.
    pub fn zstd(level: i32) -> std::result::Result<Self, ParquetError> {
        Ok(Self {
            inner: Compression::ZSTD(ZstdLevel::try_new(level)?),
        })
    }
}

impl Default for ParquetCompression {
    fn default() -> Self {
        Self {
            inner: Compression::ZSTD(ZstdLevel::try_new(3).unwrap_or_default()),
        }
    }
}

/// Options for `ParquetReportWriter` controlling the output parquet files.
#[derive(Clone, Debug)]
pub struct ParquetOptions {
    compression: ParquetCompression,
    max_batch_size: usize,
}

impl ParquetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression for both files. The default is zstd level 3.
    pub fn compression(mut self, compression: ParquetCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the number of rows buffered before being written out as a
    /// `RecordBatch`.
    pub fn max_batch_size(mut self, batch_size: usize) -> Self {
        self.max_batch_size = batch_size.max(1);
        self
    }
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: Default::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

#[derive(Default)]
struct PendingRows {
    metric: Vec<String>,
    size_bytes: Vec<u64>,
    num_samples: Vec<u64>,
}

impl PendingRows {
    fn len(&self) -> usize {
        self.metric.len()
    }

    fn push(&mut self, result: &ChunkResult) {
        self.metric.push(result.metric_name.clone());
        self.size_bytes.push(result.size_bytes as u64);
        self.num_samples.push(result.num_samples as u64);
    }
}

struct ReportFile<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: Arc<Schema>,
    pending: PendingRows,
}

impl<W: Write + Send> ReportFile<W> {
    fn try_new(writer: W, encoding: Encoding, options: &ParquetOptions) -> Result<Self> {
        let schema = Arc::new(
            Schema::new(vec![
                Field::new("metric", DataType::Utf8, false),
                Field::new("sizeBytes", DataType::UInt64, false),
                Field::new("numSamples", DataType::UInt64, false),
            ])
            .with_metadata(HashMap::from([(
                "encoding".to_string(),
                encoding.to_string(),
            )])),
        );

        let props = WriterProperties::builder()
            .set_compression(options.compression.inner)
            .set_key_value_metadata(Some(vec![KeyValue {
                key: "encoding".to_string(),
                value: Some(encoding.to_string()),
            }]))
            .set_max_row_group_size(options.max_batch_size)
            .build();
        let writer = ArrowWriter::try_new(writer, schema.clone(), Some(props)).map_err(io_error)?;

        Ok(Self {
            writer,
            schema,
            pending: PendingRows::default(),
        })
    }

    /// Converts the buffered rows into a single `RecordBatch` and hands it to
    /// the `ArrowWriter`.
    fn write_pending(&mut self) -> Result<()> {
        if self.pending.len() == 0 {
            return Ok(());
        }

        let rows = mem::take(&mut self.pending);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(rows.metric)),
            Arc::new(UInt64Array::from(rows.size_bytes)),
            Arc::new(UInt64Array::from(rows.num_samples)),
        ];

        let batch = RecordBatch::try_new(self.schema.clone(), columns).map_err(io_error)?;
        self.writer.write(&batch).map_err(io_error)
    }

    fn finalize(mut self) -> Result<i64> {
        self.write_pending()?;
        let metadata = self.writer.close().map_err(io_error)?;
        Ok(metadata.num_rows)
    }
}

/// Writes chunk results as parquet, one file per histogram encoding, with
/// the same three columns as the tab-separated reports.
///
/// Rows are buffered and written in batches, so [`finalize`] must be called
/// to write the parquet footer. A file without a footer is unreadable, so a
/// caller that wants to keep the rows of earlier blocks after a failed audit
/// must still call [`finalize`] on its error path before exiting.
///
/// [`finalize`]: ParquetReportWriter::finalize
pub struct ParquetReportWriter<W: Write + Send> {
    int_histogram: ReportFile<W>,
    float_histogram: ReportFile<W>,
    max_batch_size: usize,
}

impl ParquetReportWriter<File> {
    /// Creates (or truncates) both report files.
    pub fn create(paths: &OutputPaths, options: ParquetOptions) -> Result<Self> {
        Self::try_new(
            File::create(&paths.int_histogram)?,
            File::create(&paths.float_histogram)?,
            options,
        )
    }
}

impl<W: Write + Send> ParquetReportWriter<W> {
    pub fn try_new(int_histogram: W, float_histogram: W, options: ParquetOptions) -> Result<Self> {
        Ok(Self {
            int_histogram: ReportFile::try_new(int_histogram, Encoding::Histogram, &options)?,
            float_histogram: ReportFile::try_new(
                float_histogram,
                Encoding::FloatHistogram,
                &options,
            )?,
            max_batch_size: options.max_batch_size,
        })
    }

    /// Writes any buffered rows and both parquet footers. Returns the number
    /// of rows in the integer and float histogram files.
    pub fn finalize(self) -> Result<(i64, i64)> {
        let int_rows = self.int_histogram.finalize()?;
        let float_rows = self.float_histogram.finalize()?;
        Ok((int_rows, float_rows))
    }
}

impl<W: Write + Send> ReportSink for ParquetReportWriter<W> {
    fn write(&mut self, result: &ChunkResult) -> Result<()> {
        let file = route(
            result.encoding,
            &mut self.int_histogram,
            &mut self.float_histogram,
        )?;

        file.pending.push(result);
        if file.pending.len() >= self.max_batch_size {
            file.write_pending()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.int_histogram.write_pending()?;
        self.float_histogram.write_pending()
    }
}

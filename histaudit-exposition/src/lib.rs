//! Report writers for histaudit results.
//!
//! - [`TsvReportWriter`] writes the tab-separated chunk reports, one file per
//!   histogram encoding.
//! - [`ParquetReportWriter`] writes the same reports as parquet files.
//! - [`JsonLinesWriter`] writes chunk results, sample results and divergence
//!   reports as one JSON object per line.

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "parquet")]
mod parquet;
mod tsv;
mod util;

#[cfg(feature = "json")]
pub use json::JsonLinesWriter;
#[cfg(feature = "parquet")]
pub use parquet::{ParquetCompression, ParquetOptions, ParquetReportWriter};
pub use tsv::{TsvReportWriter, TSV_HEADER};

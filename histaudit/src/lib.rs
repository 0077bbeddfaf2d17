//! Read-side audits of native histogram data.
//!
//! Two independent pipelines, each wired from the collaborator traits in
//! [`histaudit_core`]:
//!
//! - The [`BlockAuditor`] walks storage blocks series by series and reports
//!   the size and sample count of every native histogram chunk to a
//!   [`ReportSink`].
//! - The [`DivergenceDetector`] queries a histogram's `_count` aggregate and
//!   its `+Inf` bucket aggregate over a band of hourly windows and reports
//!   the earliest timestamp at which they disagree.
//!
//! # Example
//!
//! ```ignore
//! use histaudit::{BlockAuditor, Config, DivergenceDetector};
//!
//! let config = Config::load("histaudit.yaml")?;
//!
//! let summary = BlockAuditor::new()
//!     .progress_interval(config.progress_interval)
//!     .audit(&block_source, &mut sink)?;
//!
//! let detector = DivergenceDetector::new(&read_client, config.lookback);
//! for base in histaudit::read_histogram_bases(path)? {
//!     if let Some(report) = detector.check(&base, chrono::Utc::now())? {
//!         println!("{report}");
//!     }
//! }
//! ```

pub mod audit;
mod config;
pub mod divergence;
pub mod metrics;
mod report;

pub use audit::{AuditSummary, BlockAuditor, HistogramShape, SampleDecoder, SampleResult};
pub use config::{read_histogram_bases, Config, LookbackBand, OutputPaths, RemoteReadConfig};
pub use divergence::{
    Divergence, DivergenceDetector, DivergenceReport, TimestampValueMap, Window, WindowPlanner,
};
pub use histaudit_core::{Error, Result};
pub use report::{ChunkResult, ReportSink};

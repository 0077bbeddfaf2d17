//! Counters describing the work done by both pipelines.
//!
//! These are registered with `metriken`, so any exposition layer that
//! snapshots `metriken::metrics()` picks them up.

use metriken::{metric, Counter};

#[metric(
    name = "histaudit/blocks_walked",
    description = "Number of storage blocks fully walked"
)]
pub static BLOCKS_WALKED: Counter = Counter::new();

#[metric(
    name = "histaudit/series_walked",
    description = "Number of series resolved from block indexes"
)]
pub static SERIES_WALKED: Counter = Counter::new();

#[metric(
    name = "histaudit/chunks_read",
    description = "Number of chunks fetched from block chunk readers"
)]
pub static CHUNKS_READ: Counter = Counter::new();

#[metric(
    name = "histaudit/chunk_results",
    description = "Number of histogram chunks reported"
)]
pub static CHUNK_RESULTS: Counter = Counter::new();

#[metric(
    name = "histaudit/queries",
    description = "Number of range queries issued to the read client"
)]
pub static QUERIES: Counter = Counter::new();

#[metric(
    name = "histaudit/samples_merged",
    description = "Number of query samples folded into timestamp maps"
)]
pub static SAMPLES_MERGED: Counter = Counter::new();

#[metric(
    name = "histaudit/windows_searched",
    description = "Number of hourly windows compared for divergence"
)]
pub static WINDOWS_SEARCHED: Counter = Counter::new();

#[metric(
    name = "histaudit/divergences",
    description = "Number of histogram bases found with divergent aggregates"
)]
pub static DIVERGENCES: Counter = Counter::new();

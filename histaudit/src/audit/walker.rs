use histaudit_core::{Block, Chunk, Error, Result, METRIC_NAME};

use crate::metrics::{CHUNKS_READ, SERIES_WALKED};

/// Visits every chunk of every series in a block.
///
/// Series come in postings order for `__name__` over all of its values,
/// which covers every series in the block exactly once. Chunks come in the
/// order the index lists them for their series. The callback receives the
/// series' metric name alongside each chunk.
///
/// The index and chunk readers are held only for the duration of the call
/// and are released on every return path. The first failure, whether
/// reading or in the callback, ends the walk.
pub fn walk_block<B, F>(block: &B, mut visit: F) -> Result<()>
where
    B: Block + ?Sized,
    F: FnMut(&str, &dyn Chunk) -> Result<()>,
{
    let index = block.index()?;

    let metric_names = index.label_values(METRIC_NAME)?;
    let postings = index.postings(METRIC_NAME, &metric_names)?;

    let chunks = block.chunks()?;

    for series in postings {
        let series = series?;
        let (labels, metas) = index.series(series)?;

        let metric_name = labels.metric_name().ok_or(Error::MissingLabel {
            series,
            label: METRIC_NAME,
        })?;
        SERIES_WALKED.increment();

        for meta in &metas {
            let chunk = chunks.chunk(meta)?;
            CHUNKS_READ.increment();

            visit(metric_name, chunk.as_ref())?;
        }
    }

    Ok(())
}

use histaudit_core::{Chunk, Encoding, Result};

use crate::ChunkResult;

/// Measures a chunk if it holds native histograms.
///
/// Float (XOR) chunks and empty placeholder chunks yield `None`. A chunk
/// whose encoding tag is not one of the known encodings is an error.
pub fn classify(metric_name: &str, chunk: &dyn Chunk) -> Result<Option<ChunkResult>> {
    let encoding = chunk.encoding()?;

    match encoding {
        Encoding::Histogram | Encoding::FloatHistogram => Ok(Some(ChunkResult {
            metric_name: metric_name.to_string(),
            encoding,
            size_bytes: chunk.bytes().len(),
            num_samples: chunk.num_samples(),
        })),
        Encoding::None | Encoding::Xor => Ok(None),
    }
}

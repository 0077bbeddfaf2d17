use std::io;

use histaudit_core::{Encoding, Error};

/// Wraps a writer-specific failure as an I/O error.
#[cfg(any(feature = "json", feature = "parquet"))]
pub(crate) fn io_error<E>(e: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Error::Io(io::Error::other(e))
}

/// Selects the destination for a histogram encoding. Anything else never
/// reaches a report and is rejected.
pub(crate) fn route<T>(encoding: Encoding, int_histogram: T, float_histogram: T) -> Result<T, Error> {
    match encoding {
        Encoding::Histogram => Ok(int_histogram),
        Encoding::FloatHistogram => Ok(float_histogram),
        other => Err(Error::UnknownEncoding(other.as_u8())),
    }
}

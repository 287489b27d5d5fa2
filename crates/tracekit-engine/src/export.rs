//! Writing index rows to an `IndexSink`.

use tracekit_core::errors::SinkError;
use tracekit_core::traits::IndexSink;
use tracekit_core::types::IndexRow;

use crate::index::TraceabilityIndex;

/// Rows handed to the sink per call.
pub const EXPORT_BATCH_SIZE: usize = 1024;

/// Write every row of `index` to `sink` in batches. Returns the row count.
pub fn export_index(index: &TraceabilityIndex, sink: &dyn IndexSink) -> Result<usize, SinkError> {
    export_rows(index.rows(), sink)
}

/// Write the rows of the given origins only, in the order given.
/// Origins missing from the index are skipped.
pub fn export_origins<'a>(
    index: &TraceabilityIndex,
    origins: impl IntoIterator<Item = &'a str>,
    sink: &dyn IndexSink,
) -> Result<usize, SinkError> {
    let rows = origins
        .into_iter()
        .filter_map(|origin| index.query_origin(origin).ok())
        .flatten();
    export_rows(rows, sink)
}

fn export_rows(
    rows: impl Iterator<Item = IndexRow>,
    sink: &dyn IndexSink,
) -> Result<usize, SinkError> {
    let mut written = 0usize;
    let mut batch = Vec::with_capacity(EXPORT_BATCH_SIZE);
    for row in rows {
        batch.push(row);
        if batch.len() == EXPORT_BATCH_SIZE {
            sink.write_rows(&batch)?;
            written += batch.len();
            batch.clear();
        }
    }
    if !batch.is_empty() {
        sink.write_rows(&batch)?;
        written += batch.len();
    }
    tracing::debug!(rows = written, "index rows exported");
    Ok(written)
}

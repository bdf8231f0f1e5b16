//! Candidate-row batching for scenarios that cannot reuse mirrored results.
//!
//! Rows inside a batch run in parallel; progress is reported once per batch.

use std::ops::Range;

/// Split `rows` candidate rows into at most `batches` contiguous ranges.
/// Earlier ranges take the remainder, so sizes differ by at most one.
///
/// ```
/// # use metarank::parallel::row_batches;
/// assert_eq!(row_batches(7, 3), vec![0..3, 3..5, 5..7]);
/// ```
pub fn row_batches(rows: usize, batches: usize) -> Vec<Range<usize>> {
    let batches = batches.min(rows);
    if batches == 0 {
        return Vec::new();
    }
    let (size, extra) = (rows / batches, rows % batches);
    let mut start = 0;
    (0..batches)
        .map(|i| {
            let end = start + size + usize::from(i < extra);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

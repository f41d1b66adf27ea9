//! Module splitting the source rows into the batches that become jobs.

use crate::{
    domain::{Batch, RawRow},
    error::{Error, invalid_argument},
};

/// Splits `rows` into consecutive batches of `batch_size` rows, the last one possibly shorter.
///
/// Row order is preserved and concatenating the batches gives back `rows`.
pub fn split_into_batches(rows: Vec<RawRow>, batch_size: usize) -> Result<Vec<Batch>, Error> {
    if batch_size == 0 {
        return Err(invalid_argument("batch size must be at least 1"));
    }

    let mut batches = Vec::with_capacity(rows.len().div_ceil(batch_size));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let chunk: Vec<RawRow> = rows.by_ref().take(batch_size).collect();
        batches.push(Batch::try_from(chunk)?);
    }
    Ok(batches)
}

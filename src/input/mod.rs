//! Module defining the reading logic used to turn the delimited source into raw rows the batcher can split.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::RawRow;
use crate::error::Error;


/// Parses the data provided by the reader and returns an iterator over the rows.
///
/// The first row is a header and is skipped. Fields beyond the second are ignored and rows with fewer than two fields
/// are dropped silently. Fields are decoded lossily: a row that is not valid UTF-8 is still read and left for
/// validation to reject.
pub(crate) fn parse_rows(reader: impl Read) -> impl Iterator<Item = Result<RawRow, Error>> {
    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .into_byte_records()
        .filter_map(|result| match result {
            Ok(record) if record.len() >= 2 => {
                let line = record.position().map_or(0, |p| p.line());
                Some(Ok(RawRow::new(
                    line,
                    String::from_utf8_lossy(&record[0]),
                    String::from_utf8_lossy(&record[1]),
                )))
            }
            Ok(record) => {
                debug!(fields = record.len(), "dropping row with too few fields");
                None
            }
            Err(e) => Some(Err(Error::from(e))),
        })
}

/// Reads every row of the source file. A missing file or one without data rows is an error.
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>, Error> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let rows = parse_rows(File::open(path)?).collect::<Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Err(Error::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

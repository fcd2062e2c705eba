use std::io::Read;

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};

use super::ImportError;

const DELIMITER: u8 = b';';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Single-pass reader over `;`-delimited text with a header row.
///
/// Restarting requires a new reader over the source.
pub struct CsvReader<R> {
    inner: csv::Reader<R>,
}

impl<R: Read> CsvReader<R> {
    /// Opens a reader over a source.
    pub fn new(source: R) -> Self {
        let inner = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Fields)
            .from_reader(source);

        Self { inner }
    }

    /// Returns the header row as written, without a leading byte-order mark.
    pub fn headers(&mut self) -> Result<Vec<String>, ImportError> {
        let record = self
            .inner
            .headers()
            .map_err(|error| ImportError::Format(error.to_string()))?;

        if record.is_empty() {
            return Err(ImportError::Format("missing header row".to_owned()));
        }

        Ok(record
            .iter()
            .enumerate()
            .map(|(index, cell)| match index {
                0 => cell.trim_start_matches(BYTE_ORDER_MARK).to_owned(),
                _ => cell.to_owned(),
            })
            .collect())
    }

    /// Consumes the reader into its data rows. Column counts are not checked here.
    pub fn rows(self) -> CsvRows<R> {
        CsvRows {
            records: self.inner.into_records(),
        }
    }
}

/// Lazy sequence of data rows.
pub struct CsvRows<R> {
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Vec<String>, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;

        Some(
            record
                .map(|record| record.iter().map(str::to_owned).collect())
                .map_err(|error| ImportError::Format(error.to_string())),
        )
    }
}

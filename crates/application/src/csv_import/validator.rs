use std::collections::BTreeMap;
use std::io::Read;

use super::{CsvReader, CsvRows, ImportError, RuleSet};

/// Rule failures per attribute.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// One validated data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// One-based data row number, the header row not counted.
    pub row: usize,
    /// Cell values keyed by attribute name.
    pub attributes: BTreeMap<String, String>,
    /// Rule failures keyed by attribute name.
    pub errors: FieldErrors,
}

impl RowRecord {
    /// Returns whether every rule passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns an attribute value, empty when absent.
    #[must_use]
    pub fn value(&self, attribute: &str) -> &str {
        self.attributes.get(attribute).map_or("", String::as_str)
    }
}

/// Positional attribute mapping plus rules for a delimited file.
pub struct CsvValidator {
    expected_headers: Option<Vec<String>>,
    attributes: Vec<String>,
    rules: RuleSet,
}

impl CsvValidator {
    /// Creates a validator. Attribute names map positionally onto CSV columns.
    pub fn new(attributes: Vec<String>, rules: RuleSet) -> Result<Self, ImportError> {
        if attributes.is_empty() {
            return Err(ImportError::Configuration(
                "attribute names must not be empty".to_owned(),
            ));
        }
        if rules.is_empty() {
            return Err(ImportError::Configuration(
                "validation rules must not be empty".to_owned(),
            ));
        }
        rules.ensure_attributes_known(&attributes)?;

        Ok(Self {
            expected_headers: None,
            attributes,
            rules,
        })
    }

    /// Requires the header row to equal `headers`, order included.
    #[must_use]
    pub fn with_expected_headers(mut self, headers: Vec<String>) -> Self {
        self.expected_headers = Some(headers);
        self
    }

    /// Checks the header row, then yields one record per data row in input order.
    ///
    /// A row with the wrong column count yields `ImportError::ColumnCount` and ends the
    /// sequence.
    pub fn validated_rows<R: Read>(
        &self,
        mut reader: CsvReader<R>,
    ) -> Result<ValidatedRows<'_, R>, ImportError> {
        let headers = reader.headers()?;
        if let Some(expected) = &self.expected_headers
            && *expected != headers
        {
            return Err(ImportError::HeaderMismatch {
                expected: expected.clone(),
                actual: headers,
            });
        }

        Ok(ValidatedRows {
            validator: self,
            rows: reader.rows(),
            row: 0,
            finished: false,
        })
    }

    /// Runs the rules over attribute values supplied outside a file.
    #[must_use]
    pub fn validate_attributes(&self, attributes: &BTreeMap<String, String>) -> FieldErrors {
        self.attributes
            .iter()
            .filter_map(|attribute| {
                let value = attributes.get(attribute).map_or("", String::as_str);
                let errors = self.rules.check(attribute, value);
                (!errors.is_empty()).then(|| (attribute.clone(), errors))
            })
            .collect()
    }

    fn record(&self, row: usize, cells: Vec<String>) -> RowRecord {
        let attributes = self
            .attributes
            .iter()
            .cloned()
            .zip(cells)
            .collect::<BTreeMap<_, _>>();
        let errors = self.validate_attributes(&attributes);

        RowRecord {
            row,
            attributes,
            errors,
        }
    }
}

/// Lazy, single-pass sequence of validated rows.
pub struct ValidatedRows<'a, R> {
    validator: &'a CsvValidator,
    rows: CsvRows<R>,
    row: usize,
    finished: bool,
}

impl<R: Read> Iterator for ValidatedRows<'_, R> {
    type Item = Result<RowRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let cells = match self.rows.next()? {
            Ok(cells) => cells,
            Err(error) => {
                self.finished = true;
                return Some(Err(error));
            }
        };
        self.row += 1;

        let expected = self.validator.attributes.len();
        if cells.len() != expected {
            self.finished = true;
            return Some(Err(ImportError::ColumnCount {
                row: self.row,
                expected,
                actual: cells.len(),
            }));
        }

        Some(Ok(self.validator.record(self.row, cells)))
    }
}

//! Batch payloads: structured records or delimited text.

pub mod validate;

use std::collections::HashMap;

use serde::Deserialize;

use self::validate::{FieldError, FromRow, Validate, ValidationErrors};

/// A batch as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchInput<T> {
    /// Pre-structured typed records.
    Records(Vec<T>),
    /// Raw delimited text with a header row.
    Text(String),
}

/// Splits delimited text into string-keyed rows.
pub trait RowTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<HashMap<String, String>>, FieldError>;
}

/// Delimited text with a header row; comma-separated unless configured otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CsvTokenizer {
    delimiter: u8,
}

impl CsvTokenizer {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvTokenizer {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl RowTokenizer for CsvTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<HashMap<String, String>>, FieldError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| FieldError::new(None, "csv", format!("unreadable header: {e}")))?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| FieldError::new(Some(i + 1), "csv", e.to_string()))?;
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            rows.push(
                headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect(),
            );
        }
        Ok(rows)
    }
}

/// Turn a batch payload into typed records, rejecting the whole batch on any error.
pub fn resolve_batch<T>(
    input: BatchInput<T>,
    tokenizer: &dyn RowTokenizer,
) -> Result<Vec<T>, ValidationErrors>
where
    T: FromRow + Validate,
{
    let mut errors = Vec::new();
    let records = match input {
        BatchInput::Records(records) => {
            for (i, record) in records.iter().enumerate() {
                errors.extend(record.validate(Some(i + 1)));
            }
            records
        }
        BatchInput::Text(text) => {
            let rows = tokenizer
                .tokenize(&text)
                .map_err(|e| ValidationErrors(vec![e]))?;
            let mut records = Vec::with_capacity(rows.len());
            for (i, row) in rows.iter().enumerate() {
                match T::from_row(row, Some(i + 1)) {
                    Ok(record) => records.push(record),
                    Err(row_errors) => errors.extend(row_errors),
                }
            }
            records
        }
    };

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }
    if records.is_empty() {
        return Err(ValidationErrors(vec![FieldError::new(
            None,
            "records",
            "batch is empty",
        )]));
    }
    Ok(records)
}

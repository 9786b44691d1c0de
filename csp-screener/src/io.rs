//! CSV adapters: the symbol universe in, the match artifact out.

use std::path::Path;

use thiserror::Error;

use crate::data::{MatchRecord, MATCH_COLUMNS};

/// Name of the column holding ticker symbols in the input file.
pub const SYMBOL_COLUMN: &str = "Symbol";

#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column {column:?} not found in {path}")]
    MissingColumn { column: String, path: String },
}

/// Read the `Symbol` column of a CSV file.
///
/// Other columns are ignored, blank cells skipped and values trimmed.
pub fn read_symbols(path: &Path) -> Result<Vec<String>, IoError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let index = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == SYMBOL_COLUMN)
        .ok_or_else(|| IoError::MissingColumn {
            column: SYMBOL_COLUMN.to_string(),
            path: path.display().to_string(),
        })?;

    let mut symbols = Vec::new();
    for row in rdr.records() {
        let row = row?;
        match row.get(index).map(str::trim) {
            Some(s) if !s.is_empty() => symbols.push(s.to_string()),
            _ => continue,
        }
    }

    Ok(symbols)
}

/// Write matches to `path`, header first, rows in the given order.
///
/// The header is written even when there are no matches.
pub fn write_matches(path: &Path, matches: &[MatchRecord]) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(MATCH_COLUMNS)?;
    for record in matches {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read back a match artifact written by `write_matches`.
pub fn read_matches(path: &Path) -> Result<Vec<MatchRecord>, IoError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let records = rdr.deserialize().collect::<Result<Vec<MatchRecord>, _>>()?;
    Ok(records)
}

//! Read subscription rows from a CSV file

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::{debug, warn};
use std::path::Path;

use super::{Row, RowSet};

/// Strip byte-order marks and surrounding whitespace from a header name
pub fn normalize_column_name(name: &str) -> String {
    name.trim_matches(|c: char| c == '\u{feff}' || c.is_whitespace())
        .to_string()
}

/// Read all rows that carry a subscription id
///
/// Rows whose id column is missing or empty are skipped, as are records the
/// CSV parser cannot decode. Short records are padded with empty values so
/// every kept row has a value for every header column. Records with
/// non-empty cells beyond the header are skipped: they have no column to be
/// written back to.
pub fn read_rows<P: AsRef<Path>>(path: P, id_column: &str) -> Result<RowSet> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(normalize_column_name)
        .collect();

    let mut row_set = RowSet::with_columns(headers.clone());

    for (index, record) in reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable row at line {}: {}", line, e);
                continue;
            }
        };

        if record.iter().skip(headers.len()).any(|cell| !cell.is_empty()) {
            warn!(
                "Skipping row at line {}: {} fields for {} header columns",
                line,
                record.len(),
                headers.len()
            );
            continue;
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(col_idx, header)| {
                let value = record.get(col_idx).unwrap_or("");
                (header.clone(), value.to_string())
            })
            .collect();

        if row.get(id_column).is_none_or(|id| id.is_empty()) {
            debug!("Skipping row at line {} without {}", line, id_column);
            continue;
        }

        row_set.rows.push(row);
    }

    Ok(row_set)
}

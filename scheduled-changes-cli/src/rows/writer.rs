//! Write subscription rows back to a CSV file

use anyhow::{Context, Result, bail};
use csv::Writer;
use log::info;
use std::path::Path;

use super::RowSet;

/// Overwrite `path` with the header and every row
///
/// Each row must hold exactly the header's columns. Records are validated
/// before the file is opened so a bad row never truncates the input.
pub fn write_rows<P: AsRef<Path>>(path: P, row_set: &RowSet) -> Result<()> {
    let path = path.as_ref();
    let records = build_records(row_set)?;

    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(&row_set.columns)
        .context("Failed to write CSV header")?;

    for (index, record) in records.iter().enumerate() {
        wtr.write_record(record)
            .with_context(|| format!("Failed to write row {}", index + 1))?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;

    info!("Results written to {}", path.display());
    Ok(())
}

fn build_records(row_set: &RowSet) -> Result<Vec<Vec<&str>>> {
    let mut records = Vec::with_capacity(row_set.len());

    for (index, row) in row_set.rows.iter().enumerate() {
        if let Some(extra) = row.keys().find(|k| !row_set.columns.contains(k)) {
            bail!("Row {} has a value for unknown column '{}'", index + 1, extra);
        }

        let record = row_set
            .columns
            .iter()
            .map(|column| {
                row.get(column)
                    .map(String::as_str)
                    .with_context(|| format!("Row {} is missing a value for column '{}'", index + 1, column))
            })
            .collect::<Result<Vec<_>>>()?;

        records.push(record);
    }

    Ok(records)
}

// ==============================================================================
// output.rs - Colony Import File Generation
// ==============================================================================
// Description: Writes resolved records as the colony system's tab-separated
//              import file
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited, every field quoted, one header row
// Example:
//   "id"	"line"	"mutation 1"	"genotype 1"	"mutation 2"	"genotype 2"
//   "AN0007"	"Foo-Cre"	"Foo-Cre"	"tg/wt"	"Bar"	"wt/wt"
//   "AN0008"	"C57BL/6J"	""	""	""	""
// ==============================================================================

use chrono::NaiveDateTime;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{genotype_column, mutation_column, OutputRecord};

/// File name prefix of every import file
pub const EXPORT_PREFIX: &str = "PYRAT_EXPORT";

/// Timestamp embedded in import file names
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%dT%H-%M-%S";

/// Errors that can occur while writing the import file
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Import file name for `input`, stamped with `now`
///
/// The stem is the input file name up to its first '.', so
/// `results.2026.csv` becomes `PYRAT_EXPORT_results_<timestamp>.csv`.
pub fn output_file_name(input: &Path, now: NaiveDateTime) -> String {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    format!("{}_{}_{}.csv", EXPORT_PREFIX, stem, now.format(TIMESTAMP_FORMAT))
}

/// Header for a file whose longest record has `max_mutations` mutations
pub fn header(max_mutations: usize) -> Vec<String> {
    let mut columns = vec!["id".to_string(), "line".to_string()];
    for position in 1..=max_mutations {
        columns.push(mutation_column(position));
        columns.push(genotype_column(position));
    }
    columns
}

/// Write records to any writer
///
/// Every row is padded to the widest record's column count.
///
/// # Arguments
/// * `records` - Resolved rows in output order
/// * `writer` - Destination for the tab-separated text
///
/// # Returns
/// * `Ok(usize)` - Number of data rows written (header excluded)
/// * `Err(OutputError)` - Write failure
///
/// # Examples
/// ```
/// use genotype_importer::models::{MutationCall, OutputRecord};
/// use genotype_importer::output::write_records_to;
///
/// let records = vec![OutputRecord {
///     id: "AN0007".to_string(),
///     line: "Foo-Cre".to_string(),
///     mutations: vec![MutationCall { name: "Foo-Cre".to_string(), genotype: "tg/wt".to_string() }],
/// }];
///
/// let mut buffer = Vec::new();
/// assert_eq!(write_records_to(&records, &mut buffer).unwrap(), 1);
/// assert!(String::from_utf8(buffer).unwrap().starts_with("\"id\"\t\"line\"\t\"mutation 1\""));
/// ```
pub fn write_records_to<W: Write>(records: &[OutputRecord], writer: W) -> Result<usize, OutputError> {
    let max_mutations = records.iter().map(|r| r.mutations.len()).max().unwrap_or(0);
    let width = 2 + 2 * max_mutations;

    let mut csv_writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(header(max_mutations))?;

    for record in records {
        let mut row: Vec<String> = record.columns().into_iter().map(|(_, value)| value).collect();
        // Shorter records get empty cells
        row.resize(width, String::new());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}

/// Write records to a new file at `path`
///
/// # Arguments
/// * `records` - Resolved rows in output order
/// * `path` - File to create (truncated if it exists)
///
/// # Returns
/// * `Ok(usize)` - Number of data rows written
/// * `Err(OutputError)` - File could not be created or written
pub fn write_records(records: &[OutputRecord], path: &Path) -> Result<usize, OutputError> {
    let file = File::create(path)?;
    let written = write_records_to(records, file)?;

    info!("Wrote {} records to {:?}", written, path);
    Ok(written)
}

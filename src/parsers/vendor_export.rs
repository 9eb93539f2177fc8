// ==============================================================================
// vendor_export.rs - Genotyping Vendor Export Parser
// ==============================================================================
// Description: Parser for per-animal genotyping result exports
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Comma-separated text with a header row, optionally gzip-compressed
// Example:
//   Sample,Strain,Cre,neo,Foo-wt
//   7 (litter 2),B6-Foo,+,-,+
//   8 (litter 2),B6-Foo,-,-,+
// ==============================================================================

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnimalRecord, SAMPLE_COLUMN, STRAIN_COLUMN};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Errors that can occur during export parsing
#[derive(Error, Debug)]
pub enum ExportParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Required column '{0}' not found in export header")]
    MissingHeader(String),

    #[error("Column '{0}' appears more than once in export header")]
    DuplicateHeader(String),

    #[error("Export contains no data rows")]
    EmptyFile,
}

/// Parser for vendor genotyping exports
#[derive(Debug, Clone)]
pub struct ExportParser {
    /// Columns every export must declare in its header
    pub required_columns: Vec<String>,
}

impl Default for ExportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportParser {
    /// Create a parser requiring the sample and strain columns
    pub fn new() -> Self {
        Self {
            required_columns: vec![SAMPLE_COLUMN.to_string(), STRAIN_COLUMN.to_string()],
        }
    }

    /// Parse an export file, decompressing it if the name ends in `.gz`
    ///
    /// # Arguments
    /// * `path` - Export file (`.csv` or `.csv.gz`)
    ///
    /// # Returns
    /// * `Ok(Vec<AnimalRecord>)` - Records in file order
    /// * `Err(ExportParseError)` - Parse error
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Vec<AnimalRecord>, ExportParseError> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);

        let is_gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let reader: Box<dyn Read> = if is_gzip {
            debug!("Decompressing gzip export {:?}", path);
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        self.parse_reader(reader)
    }

    /// Parse an export from any reader
    ///
    /// Header names are trimmed and stripped of a byte order mark; cell
    /// values are kept verbatim.
    ///
    /// # Arguments
    /// * `reader` - Uncompressed CSV text, header row first
    ///
    /// # Returns
    /// * `Ok(Vec<AnimalRecord>)` - Records in file order, rows numbered from 1
    /// * `Err(ExportParseError)` - Missing or duplicate header, malformed CSV, or no data rows
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<AnimalRecord>, ExportParseError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches(BYTE_ORDER_MARK).trim().to_string())
            .collect();

        // Unnamed (blank) columns are never referenced, so they may repeat
        let mut seen = HashSet::new();
        for header in headers.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(header.as_str()) {
                return Err(ExportParseError::DuplicateHeader(header.clone()));
            }
        }

        for required in &self.required_columns {
            if !headers.iter().any(|h| h == required) {
                return Err(ExportParseError::MissingHeader(required.clone()));
            }
        }

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;

            // Short rows simply lack their trailing columns
            let columns: HashMap<String, String> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect();

            records.push(AnimalRecord::new(index + 1, columns));
        }

        if records.is_empty() {
            return Err(ExportParseError::EmptyFile);
        }

        debug!("Parsed {} export rows ({} columns)", records.len(), headers.len());
        Ok(records)
    }
}

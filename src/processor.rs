// ==============================================================================
// processor.rs - Conversion Pipeline
// ==============================================================================
// Description: Converts one vendor genotyping export into one colony import
//              file
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{
    default_config_dir, load_colony_config, load_vendor_config, resolve_path, ColonyConfig,
    VendorConfig, COLONY_CONFIG_FILENAME, VENDOR_CONFIG_FILENAME,
};
use crate::models::{AnimalRecord, OutputRecord};
use crate::output::{output_file_name, write_records};
use crate::parsers::ExportParser;
use crate::resolver::resolve_record;
use crate::validator::InputValidator;

/// What to do with a record that cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first bad record; no file is written
    #[default]
    Abort,
    /// Log and leave out bad records
    Skip,
}

/// Inputs of one conversion run
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub config_dir: PathBuf,
    pub vendor_config: PathBuf,
    pub colony_config: PathBuf,
    pub error_policy: ErrorPolicy,
}

impl ConverterOptions {
    /// Options with default config file names and the abort policy
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            config_dir: config_dir.into(),
            vendor_config: PathBuf::from(VENDOR_CONFIG_FILENAME),
            colony_config: PathBuf::from(COLONY_CONFIG_FILENAME),
            error_policy: ErrorPolicy::Abort,
        }
    }

    /// Options reading the configs from `default_config_dir()`
    pub fn with_default_config(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(input, output_dir, default_config_dir())
    }
}

/// Record left out of the import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub row: usize,
    pub sample: String,
    pub reason: String,
}

/// Outcome of one conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_file: PathBuf,
    pub input_sha256: String,
    pub output_file: PathBuf,
    pub error_policy: ErrorPolicy,
    pub records_read: usize,
    pub records_written: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Colony line → number of rows written
    pub lines: BTreeMap<String, usize>,
}

impl ConversionSummary {
    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create report file {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to serialize run summary")?;
        Ok(())
    }
}

pub struct Converter {
    options: ConverterOptions,
}

impl Converter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    /// Main conversion pipeline
    ///
    /// Validates and parses the export, resolves every row and writes one
    /// timestamped import file into the output directory.
    ///
    /// # Returns
    /// * `Ok(ConversionSummary)` - Output path, counts and skipped rows
    /// * `Err` - Invalid input or config, or (under `ErrorPolicy::Abort`) the first bad record
    pub fn convert(&self) -> Result<ConversionSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting conversion {} of {:?}", run_id, self.options.input);

        // 1. Validate the export
        let validated = InputValidator::new()
            .validate(&self.options.input)
            .context("Input validation failed")?;

        // 2. Load configuration
        let (vendor, colony) = self.load_config()?;

        // 3. Parse the export
        let records = ExportParser::new()
            .parse(&validated.path)
            .with_context(|| format!("Failed to parse export {:?}", validated.path))?;
        info!("Read {} animal records", records.len());

        // 4. Resolve genotypes
        let (resolved, skipped) = self.resolve_all(&records, &vendor, &colony)?;

        // 5. Write the import file
        let output_file = self
            .options
            .output_dir
            .join(output_file_name(&validated.path, chrono::Local::now().naive_local()));
        let records_written = write_records(&resolved, &output_file)
            .with_context(|| format!("Failed to write import file {:?}", output_file))?;

        let mut lines: BTreeMap<String, usize> = BTreeMap::new();
        for record in &resolved {
            *lines.entry(record.line.clone()).or_insert(0) += 1;
        }

        info!(
            "Conversion complete: {} of {} records written ({} skipped)",
            records_written,
            records.len(),
            skipped.len()
        );

        Ok(ConversionSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            input_file: validated.path,
            input_sha256: validated.hash_sha256,
            output_file,
            error_policy: self.options.error_policy,
            records_read: records.len(),
            records_written,
            skipped,
            lines,
        })
    }

    /// Load vendor and colony configuration, relative to the config directory
    pub fn load_config(&self) -> Result<(VendorConfig, ColonyConfig)> {
        let vendor_path = resolve_path(&self.options.vendor_config, &self.options.config_dir);
        let colony_path = resolve_path(&self.options.colony_config, &self.options.config_dir);

        info!("Loading vendor config: {:?}", vendor_path);
        let vendor = load_vendor_config(&vendor_path)?;

        info!("Loading colony config: {:?}", colony_path);
        let colony = load_colony_config(&colony_path)?;

        Ok((vendor, colony))
    }

    fn resolve_all(
        &self,
        records: &[AnimalRecord],
        vendor: &VendorConfig,
        colony: &ColonyConfig,
    ) -> Result<(Vec<OutputRecord>, Vec<SkippedRecord>)> {
        let mut resolved = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for record in records {
            match resolve_record(record, vendor, &colony.animals) {
                Ok(output) => {
                    debug!("Row {} → {} ({})", record.row, output.id, output.line);
                    resolved.push(output);
                }
                Err(e) => match self.options.error_policy {
                    ErrorPolicy::Abort => {
                        return Err(e).context("Conversion aborted, no import file written");
                    }
                    ErrorPolicy::Skip => {
                        warn!("Skipping record: {}", e);
                        skipped.push(SkippedRecord {
                            row: e.row(),
                            sample: record.sample().unwrap_or_default().to_string(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        if resolved.is_empty() && !skipped.is_empty() {
            anyhow::bail!("None of the {} records could be resolved", records.len());
        }

        Ok((resolved, skipped))
    }
}

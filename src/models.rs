// ==============================================================================
// models.rs - Animal and Import Row Models
// ==============================================================================
// Description: Data structures for vendor export rows and colony import rows
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vendor column holding the sample label (e.g., "7 (litter 2)")
pub const SAMPLE_COLUMN: &str = "Sample";

/// Vendor column holding the strain name
pub const STRAIN_COLUMN: &str = "Strain";

/// One row of the vendor export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimalRecord {
    /// 1-based data row number in the export (header excluded)
    pub row: usize,

    /// Column name → raw cell value
    pub columns: HashMap<String, String>,
}

impl AnimalRecord {
    pub fn new(row: usize, columns: HashMap<String, String>) -> Self {
        Self { row, columns }
    }

    /// Build a record from (column, value) pairs
    pub fn from_pairs<K, V, I>(row: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            row,
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    pub fn sample(&self) -> Option<&str> {
        self.get(SAMPLE_COLUMN)
    }

    pub fn strain(&self) -> Option<&str> {
        self.get(STRAIN_COLUMN)
    }
}

/// Genotype call for one mutation of one animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCall {
    /// Mutation label
    pub name: String,

    /// Rendered genotype (e.g., "mut/wt")
    pub genotype: String,
}

/// One row of the colony import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Prefixed, zero-padded animal identifier (e.g., "AN0007")
    pub id: String,

    /// Colony line (strain display name)
    pub line: String,

    /// Calls in configured mutation order; position N is "mutation N+1"
    pub mutations: Vec<MutationCall>,
}

impl OutputRecord {
    /// Flatten into (column, value) pairs: id, line, mutation 1, genotype 1, ...
    pub fn columns(&self) -> Vec<(String, String)> {
        let mut columns = Vec::with_capacity(2 + 2 * self.mutations.len());
        columns.push(("id".to_string(), self.id.clone()));
        columns.push(("line".to_string(), self.line.clone()));

        for (index, call) in self.mutations.iter().enumerate() {
            columns.push((mutation_column(index + 1), call.name.clone()));
            columns.push((genotype_column(index + 1), call.genotype.clone()));
        }

        columns
    }
}

/// Header of the Nth (1-based) mutation name column
pub fn mutation_column(position: usize) -> String {
    format!("mutation {}", position)
}

/// Header of the Nth (1-based) genotype column
pub fn genotype_column(position: usize) -> String {
    format!("genotype {}", position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animal_record_lookup() {
        let record = AnimalRecord::from_pairs(
            3,
            vec![("Sample", "7 (litter 2)"), ("Strain", "B6-Foo"), ("Cre", "+")],
        );

        assert_eq!(record.row, 3);
        assert_eq!(record.sample(), Some("7 (litter 2)"));
        assert_eq!(record.strain(), Some("B6-Foo"));
        assert_eq!(record.get("Cre"), Some("+"));
        assert_eq!(record.get("neo"), None);
    }

    #[test]
    fn test_output_record_columns() {
        let record = OutputRecord {
            id: "AN0007".to_string(),
            line: "Foo-Cre".to_string(),
            mutations: vec![
                MutationCall {
                    name: "Foo-Cre".to_string(),
                    genotype: "tg/wt".to_string(),
                },
                MutationCall {
                    name: "Bar".to_string(),
                    genotype: "wt/wt".to_string(),
                },
            ],
        };

        let columns = record.columns();
        let names: Vec<&str> = columns.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "line", "mutation 1", "genotype 1", "mutation 2", "genotype 2"]
        );
        assert_eq!(columns[3].1, "tg/wt");
        assert_eq!(columns[4].1, "Bar");
    }

    #[test]
    fn test_output_record_without_mutations() {
        let record = OutputRecord {
            id: "AN0001".to_string(),
            line: "C57BL/6J".to_string(),
            mutations: Vec::new(),
        };
        assert_eq!(record.columns().len(), 2);
    }
}
